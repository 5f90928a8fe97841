// src/handlers.rs

use crate::auth::{self, AppState, AuthSession, LoginForm};
use crate::chrome::{HOME_PATH, REPORTS_PATH};
use crate::error::PortalResult;
use crate::modal::{Modal, PostedAnswer};
use crate::views::{self, home, login as view};
use axum::{
    debug_handler,
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

pub const LOGOUT_CONFIRM_MESSAGE: &str = "Deseja sair do sistema?";

/// Campo `resposta` de um diálogo já respondido.
#[derive(Debug, Deserialize, Default)]
pub struct DialogAnswer {
    pub resposta: Option<String>,
}

#[debug_handler]
pub async fn login_page(State(state): State<AppState>, cookies: Cookies) -> impl IntoResponse {
    if auth::current_session(&state, &cookies).await.is_some() {
        return Redirect::to(HOME_PATH).into_response();
    }
    view::login_page(None, "", false).into_response()
}

#[debug_handler]
pub async fn login_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(login): Form<LoginForm>,
) -> PortalResult<Response> {
    let remember = login.remember.is_some();
    let result = {
        let credentials = state.credentials.lock().unwrap_or_else(|e| e.into_inner());
        credentials
            .authenticate(&login.username, &login.password)
            .map(|user| AuthSession { email: user.email.clone(), role: user.role.clone(), remember })
    };

    match result {
        Ok(session) => {
            auth::start_session(&state, &cookies, &session).await?;
            Ok(Redirect::to(HOME_PATH).into_response())
        }
        Err(e) => {
            tracing::warn!(username = %login.username.trim(), error = ?e, "login recusado");
            Ok(view::login_page(Some(&e), login.username.trim(), remember).into_response())
        }
    }
}

/// Sair pede confirmação. Sem resposta mostra o diálogo; "yes" termina a
/// sessão e qualquer outra resposta volta ao início.
#[debug_handler]
pub async fn logout_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(answer): Form<DialogAnswer>,
) -> PortalResult<Response> {
    let Some((session_id, session)) = auth::current_session(&state, &cookies).await else {
        return Ok(Redirect::to("/").into_response());
    };
    let answer = PostedAnswer::new(answer.resposta.as_deref());
    if !answer.is_answered() {
        let modal = Modal::confirm("Confirmação", LOGOUT_CONFIRM_MESSAGE);
        let dialog = views::dialog(&state.config, &modal, Some("/logout"), &[]);
        let page = views::render_shell(&state, &session, "Início", HOME_PATH, home::home_content(&session), Some(dialog)).await;
        return Ok(page.into_response());
    }
    if answer.0.as_deref() != Some("yes") {
        return Ok(Redirect::to(HOME_PATH).into_response());
    }
    auth::end_session(&state, &cookies, &session_id).await?;
    Ok(Redirect::to("/").into_response())
}

#[debug_handler]
pub async fn main_handler(State(state): State<AppState>, cookies: Cookies) -> impl IntoResponse {
    let Some((_, session)) = auth::current_session(&state, &cookies).await else {
        return Redirect::to("/").into_response();
    };
    views::render_shell(&state, &session, "Início", HOME_PATH, home::home_content(&session), None)
        .await
        .into_response()
}

#[debug_handler]
pub async fn reports_handler(State(state): State<AppState>, cookies: Cookies) -> impl IntoResponse {
    let Some((_, session)) = auth::current_session(&state, &cookies).await else {
        return Redirect::to("/").into_response();
    };
    let dialog = views::dialog(&state.config, &home::reports_modal(), None, &[]);
    views::render_shell(&state, &session, "Relatórios", REPORTS_PATH, home::home_content(&session), Some(dialog))
        .await
        .into_response()
}
