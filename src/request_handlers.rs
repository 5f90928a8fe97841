// src/request_handlers.rs

use crate::auth::{self, AppState, AuthSession};
use crate::error::{PortalError, PortalResult};
use crate::modal::{Modal, ModalKind, PostedAnswer};
use crate::notifications::{NewNotification, NotificationKind};
use crate::request_form::{HoursStep, RequestForm, RequestFormInput, CANCEL_CONFIRM_MESSAGE};
use crate::requests::{self, RequestRecord};
use crate::selection::{MasterOption, RowId, ADD_DISABLED_TITLE, REMOVE_CONFIRM_MESSAGE};
use crate::store::StoreError;
use crate::submission::{SubmissionPayload, SubmitOutcome};
use crate::users::ROLE_GESTOR;
use crate::views::{self, request_form::{request_form_content, PAGE_PATH}};
use axum::{
    debug_handler,
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::Local;
use futures_util::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_cookies::Cookies;

type Fields = HashMap<String, String>;

async fn render_form(state: &AppState, session: &AuthSession, form: &RequestForm, dialog: Option<String>) -> Response {
    views::render_shell(state, session, "Nova Solicitação", PAGE_PATH, request_form_content(form), dialog)
        .await
        .into_response()
}

#[debug_handler]
pub async fn request_form_page(State(state): State<AppState>, cookies: Cookies) -> impl IntoResponse {
    let Some((session_id, session)) = auth::current_session(&state, &cookies).await else {
        return Redirect::to("/").into_response();
    };
    let handle = state.form_for(&session_id);
    let form = handle.lock().await;
    render_form(&state, &session, &form, None).await
}

/// Funcionários escolhidos, no mesmo formato do campo escondido.
#[debug_handler]
pub async fn selected_employees_handler(State(state): State<AppState>, cookies: Cookies) -> impl IntoResponse {
    let Some((session_id, _)) = auth::current_session(&state, &cookies).await else {
        return Redirect::to("/").into_response();
    };
    let handle = state.form_for(&session_id);
    let employees: Vec<MasterOption> = handle.lock().await.manager().selected_employees();
    Json(employees).into_response()
}

#[debug_handler]
pub async fn add_employee_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(fields): Form<Fields>,
) -> impl IntoResponse {
    let Some((session_id, session)) = auth::current_session(&state, &cookies).await else {
        return Redirect::to("/").into_response();
    };
    let handle = state.form_for(&session_id);
    let mut form = handle.lock().await;
    form.remember(&RequestFormInput::from_fields(&fields));
    match form.manager_mut().add_row() {
        Ok(_) => Redirect::to(PAGE_PATH).into_response(),
        Err(e) => {
            tracing::debug!(error = %e, "linha não adicionada");
            let modal = Modal::alert("Atenção", format!("<p>{ADD_DISABLED_TITLE}</p>"), ModalKind::Warning);
            let dialog = views::dialog(&state.config, &modal, None, &[]);
            render_form(&state, &session, &form, Some(dialog)).await
        }
    }
}

/// Mudança num seletor: os valores enviados já trazem a escolha nova.
#[debug_handler]
pub async fn select_employee_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(fields): Form<Fields>,
) -> impl IntoResponse {
    let Some((session_id, _)) = auth::current_session(&state, &cookies).await else {
        return Redirect::to("/").into_response();
    };
    let handle = state.form_for(&session_id);
    handle.lock().await.remember(&RequestFormInput::from_fields(&fields));
    Redirect::to(PAGE_PATH).into_response()
}

#[debug_handler]
pub async fn remove_employee_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(fields): Form<Fields>,
) -> PortalResult<Response> {
    let Some((session_id, session)) = auth::current_session(&state, &cookies).await else {
        return Ok(Redirect::to("/").into_response());
    };
    let row_id = fields
        .get("row_id")
        .and_then(|v| v.trim().parse::<u32>().ok())
        .map(RowId)
        .ok_or_else(|| PortalError::BadRequest("Linha inválida.".to_string()))?;
    let answer = PostedAnswer::new(fields.get("resposta").map(String::as_str));

    let handle = state.form_for(&session_id);
    let mut form = handle.lock().await;
    form.remember(&RequestFormInput::from_fields(&fields));

    if form.manager().needs_confirmation(row_id)? && !answer.is_answered() {
        let modal = Modal::confirm("Confirmação", REMOVE_CONFIRM_MESSAGE);
        let id = row_id.0.to_string();
        let dialog = views::dialog(&state.config, &modal, Some("/solicitacao/funcionarios/remover"), &[("row_id", &id)]);
        return Ok(render_form(&state, &session, &form, Some(dialog)).await);
    }

    let confirm = answer.as_confirm(state.config.rich_dialogs, "Confirmação");
    form.manager_mut().remove_row(row_id, &confirm).await?;
    Ok(Redirect::to(PAGE_PATH).into_response())
}

#[debug_handler]
pub async fn hours_step_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(fields): Form<Fields>,
) -> impl IntoResponse {
    let Some((session_id, _)) = auth::current_session(&state, &cookies).await else {
        return Redirect::to("/").into_response();
    };
    let handle = state.form_for(&session_id);
    let mut form = handle.lock().await;
    form.remember(&RequestFormInput::from_fields(&fields));
    match fields.get("passo").map(String::as_str) {
        Some("up") => form.step_hours(HoursStep::Up),
        Some("down") => form.step_hours(HoursStep::Down),
        _ => {}
    }
    Redirect::to(PAGE_PATH).into_response()
}

/// Envio. O lock do formulário é largado enquanto a API responde; a marca
/// "a enviar" impede um segundo envio nesse intervalo.
#[debug_handler]
pub async fn submit_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(fields): Form<Fields>,
) -> impl IntoResponse {
    let Some((session_id, session)) = auth::current_session(&state, &cookies).await else {
        return Redirect::to("/").into_response();
    };
    let today = Local::now().date_naive();
    let input = RequestFormInput::from_fields(&fields);
    let handle = state.form_for(&session_id);

    let begun = handle.lock().await.begin_submission(&input, today);
    let payload = match begun {
        Ok(payload) => payload,
        Err(modal) => {
            let form = handle.lock().await;
            let dialog = views::dialog(&state.config, &modal, None, &[]);
            return render_form(&state, &session, &form, Some(dialog)).await;
        }
    };

    let task = tokio::spawn(deliver(state.clone(), session.clone(), handle.clone(), payload));
    let modal = match task.await {
        Ok(modal) => modal,
        Err(e) => {
            tracing::error!(email = %session.email, error = %e, "tarefa de envio interrompida");
            handle.lock().await.finish_submission(&SubmitOutcome::failed(UNEXPECTED_FAILURE))
        }
    };

    let form = handle.lock().await;
    let dialog = views::dialog(&state.config, &modal, None, &[]);
    render_form(&state, &session, &form, Some(dialog)).await
}

const UNEXPECTED_FAILURE: &str = "Erro inesperado ao enviar a solicitação.";

/// Envia à API, regista o resultado e liberta o formulário. Corre numa
/// tarefa própria, que termina mesmo quando o navegador abandona o pedido.
async fn deliver(
    state: AppState,
    session: AuthSession,
    handle: Arc<Mutex<RequestForm>>,
    payload: SubmissionPayload,
) -> Modal {
    let outcome = AssertUnwindSafe(state.gateway.submit(&payload))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| {
            tracing::error!(email = %session.email, "a API de envio falhou com pânico");
            SubmitOutcome::failed(UNEXPECTED_FAILURE)
        });
    match &outcome {
        SubmitOutcome::Created { id, .. } => {
            tracing::info!(protocol = id, email = %session.email, employees = payload.employees.len(), "solicitação enviada");
            if let Err(e) = record_submission(&state, &session, *id, &payload).await {
                tracing::error!(protocol = id, error = %e, "falha ao registar a solicitação");
            }
        }
        SubmitOutcome::Failed { error, .. } => {
            tracing::warn!(email = %session.email, error = %error, "envio da solicitação falhou");
        }
    }
    handle.lock().await.finish_submission(&outcome)
}

async fn record_submission(
    state: &AppState,
    session: &AuthSession,
    protocol: u32,
    payload: &SubmissionPayload,
) -> Result<RequestRecord, StoreError> {
    let saved = requests::record(state.store.as_ref(), RequestRecord::from_payload(protocol, &session.email, payload)).await?;
    state
        .inbox(&session.email)
        .add(NewNotification::new(
            "Solicitação enviada",
            &format!("Sua solicitação de horas extras #{protocol} foi encaminhada ao gestor."),
            NotificationKind::Success,
        ))
        .await?;
    let managers = state.credentials.lock().unwrap_or_else(|e| e.into_inner()).emails_with_role(ROLE_GESTOR);
    for email in managers {
        state
            .inbox(&email)
            .add(NewNotification::new(
                "Nova solicitação",
                &format!("A solicitação #{protocol} de {} aguarda análise.", session.email),
                NotificationKind::Info,
            ))
            .await?;
    }
    Ok(saved)
}

#[debug_handler]
pub async fn cancel_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(fields): Form<Fields>,
) -> impl IntoResponse {
    let Some((session_id, session)) = auth::current_session(&state, &cookies).await else {
        return Redirect::to("/").into_response();
    };
    let answer = PostedAnswer::new(fields.get("resposta").map(String::as_str));
    let handle = state.form_for(&session_id);
    let mut form = handle.lock().await;
    form.remember(&RequestFormInput::from_fields(&fields));

    if !answer.is_answered() {
        let modal = Modal::confirm("Confirmação", CANCEL_CONFIRM_MESSAGE);
        let dialog = views::dialog(&state.config, &modal, Some("/solicitacao/cancelar"), &[]);
        return render_form(&state, &session, &form, Some(dialog)).await;
    }

    let confirm = answer.as_confirm(state.config.rich_dialogs, "Confirmação");
    match form.cancel(&confirm).await {
        Some(modal) => {
            tracing::info!(email = %session.email, "formulário de solicitação limpo");
            let dialog = views::dialog(&state.config, &modal, None, &[]);
            render_form(&state, &session, &form, Some(dialog)).await
        }
        None => Redirect::to(PAGE_PATH).into_response(),
    }
}
