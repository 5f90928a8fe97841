// src/review_handlers.rs

use crate::auth::{self, AppState, AuthSession};
use crate::chrome::REQUESTS_PATH;
use crate::error::{PortalError, PortalResult};
use crate::modal::{Modal, ModalKind, PostedAnswer};
use crate::notifications::{NewNotification, NotificationKind};
use crate::requests::{self, Decision, RequestRecord, ReviewError, ReviewOutcome, DENY_CONFIRM_MESSAGE};
use crate::users::ROLE_GESTOR;
use crate::views::{self, requests as view};
use axum::{
    debug_handler,
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

#[derive(Debug, Deserialize, Default)]
pub struct ReviewForm {
    #[serde(default)]
    pub comentario: String,
    pub resposta: Option<String>,
}

fn is_manager(session: &AuthSession) -> bool {
    session.role == ROLE_GESTOR
}

/// O Gestor vê todas as requisições; os restantes só as suas.
fn visible_to(session: &AuthSession, record: &RequestRecord) -> bool {
    is_manager(session) || record.requested_by.eq_ignore_ascii_case(&session.email)
}

async fn render_detail(
    state: &AppState,
    session: &AuthSession,
    record: &RequestRecord,
    comment: &str,
    comment_error: bool,
    dialog: Option<String>,
) -> Response {
    let content = view::detail_content(record, is_manager(session), comment, comment_error);
    let title = format!("Requisição #{}", record.protocol);
    views::render_shell(state, session, &title, REQUESTS_PATH, content, dialog).await.into_response()
}

async fn render_list(state: &AppState, session: &AuthSession, dialog: Option<String>) -> Response {
    let list: Vec<RequestRecord> = requests::list(state.store.as_ref())
        .await
        .into_iter()
        .filter(|r| visible_to(session, r))
        .collect();
    views::render_shell(state, session, "Requisições", REQUESTS_PATH, view::list_content(&list), dialog)
        .await
        .into_response()
}

#[debug_handler]
pub async fn requests_page(State(state): State<AppState>, cookies: Cookies) -> impl IntoResponse {
    let Some((_, session)) = auth::current_session(&state, &cookies).await else {
        return Redirect::to("/").into_response();
    };
    render_list(&state, &session, None).await
}

async fn load_visible(state: &AppState, session: &AuthSession, id: u32) -> PortalResult<RequestRecord> {
    let record = requests::find(state.store.as_ref(), id).await.ok_or(ReviewError::NotFound(id))?;
    if !visible_to(session, &record) {
        return Err(PortalError::Forbidden);
    }
    Ok(record)
}

#[debug_handler]
pub async fn request_detail_page(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(id): Path<u32>,
) -> PortalResult<Response> {
    let Some((_, session)) = auth::current_session(&state, &cookies).await else {
        return Ok(Redirect::to("/").into_response());
    };
    let record = load_visible(&state, &session, id).await?;
    Ok(render_detail(&state, &session, &record, "", false, None).await)
}

fn missing_comment_modal() -> Modal {
    Modal::alert("Atenção", format!("<p>{}</p>", ReviewError::MissingComment), ModalKind::Warning)
}

async fn notify_requester(state: &AppState, record: &RequestRecord) {
    let (title, kind, verb) = match record.status {
        requests::RequestStatus::Negada => ("Solicitação Negada", NotificationKind::Error, "negada"),
        _ => ("Solicitação Aprovada", NotificationKind::Success, "aprovada"),
    };
    let message = format!("Sua solicitação de horas extras #{} foi {verb} pelo gestor.", record.protocol);
    if let Err(e) = state.inbox(&record.requested_by).add(NewNotification::new(title, &message, kind)).await {
        tracing::error!(id = record.id, error = %e, "falha ao notificar o solicitante");
    }
}

async fn review_handler(
    state: AppState,
    cookies: Cookies,
    id: u32,
    decision: Decision,
    form: ReviewForm,
) -> PortalResult<Response> {
    let Some((_, session)) = auth::current_session(&state, &cookies).await else {
        return Ok(Redirect::to("/").into_response());
    };
    if !is_manager(&session) {
        return Err(PortalError::Forbidden);
    }
    let record = load_visible(&state, &session, id).await?;
    let comment = form.comentario.trim();

    if comment.is_empty() {
        let dialog = views::dialog(&state.config, &missing_comment_modal(), None, &[]);
        return Ok(render_detail(&state, &session, &record, "", true, Some(dialog)).await);
    }

    let answer = PostedAnswer::new(form.resposta.as_deref());
    if decision == Decision::Deny && !answer.is_answered() {
        let modal = Modal::confirm("Confirmação", DENY_CONFIRM_MESSAGE);
        let action = format!("/requisicoes/{id}/negar");
        let dialog = views::dialog(&state.config, &modal, Some(&action), &[("comentario", comment)]);
        return Ok(render_detail(&state, &session, &record, comment, false, Some(dialog)).await);
    }

    let confirm = answer.as_confirm(state.config.rich_dialogs, "Confirmação");
    let outcome = requests::review(state.store.as_ref(), id, decision, comment, &session.email, &confirm).await?;
    let ReviewOutcome::Reviewed(updated) = outcome else {
        return Ok(Redirect::to(&format!("{REQUESTS_PATH}/{id}")).into_response());
    };
    notify_requester(&state, &updated).await;

    let modal = match decision {
        Decision::Approve => Modal::alert("Requisição aprovada", "<p>Requisição aprovada com sucesso.</p>", ModalKind::Success),
        Decision::Deny => Modal::alert("Requisição negada", "<p>Requisição negada com sucesso.</p>", ModalKind::Info),
    };
    let dialog = views::dialog(&state.config, &modal, None, &[]);
    Ok(render_list(&state, &session, Some(dialog)).await)
}

#[debug_handler]
pub async fn approve_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(id): Path<u32>,
    Form(form): Form<ReviewForm>,
) -> PortalResult<Response> {
    review_handler(state, cookies, id, Decision::Approve, form).await
}

#[debug_handler]
pub async fn deny_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(id): Path<u32>,
    Form(form): Form<ReviewForm>,
) -> PortalResult<Response> {
    review_handler(state, cookies, id, Decision::Deny, form).await
}
