// src/notification_handlers.rs

use crate::auth::{self, AppState};
use crate::chrome::safe_back;
use crate::error::{PortalError, PortalResult};
use crate::notifications::NewNotification;
use crate::views::{self, notifications as view};
use axum::{
    debug_handler,
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use tower_cookies::Cookies;

const LIST_PATH: &str = "/notificacoes";

#[derive(Debug, Deserialize, Default)]
pub struct BackForm {
    pub voltar: Option<String>,
}

#[debug_handler]
pub async fn notifications_page(State(state): State<AppState>, cookies: Cookies) -> impl IntoResponse {
    let Some((_, session)) = auth::current_session(&state, &cookies).await else {
        return Redirect::to("/").into_response();
    };
    let list = state.inbox(&session.email).list().await;
    views::render_shell(&state, &session, "Notificações", LIST_PATH, view::notifications_content(&list), None)
        .await
        .into_response()
}

/// Acrescenta uma notificação à caixa do utilizador autenticado.
#[debug_handler]
pub async fn add_notification_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(new): Json<NewNotification>,
) -> PortalResult<Response> {
    let Some((_, session)) = auth::current_session(&state, &cookies).await else {
        return Err(PortalError::Forbidden);
    };
    let added = state.inbox(&session.email).add(new).await?;
    Ok((StatusCode::CREATED, Json(added)).into_response())
}

#[debug_handler]
pub async fn mark_read_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(index): Path<usize>,
    Form(back): Form<BackForm>,
) -> PortalResult<Response> {
    let Some((_, session)) = auth::current_session(&state, &cookies).await else {
        return Ok(Redirect::to("/").into_response());
    };
    if !state.inbox(&session.email).mark_as_read(index).await? {
        return Err(PortalError::NotFound(format!("Notificação {index} não encontrada.")));
    }
    Ok(Redirect::to(&safe_back(back.voltar.as_deref(), LIST_PATH)).into_response())
}

#[debug_handler]
pub async fn mark_all_read_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(back): Form<BackForm>,
) -> PortalResult<Response> {
    let Some((_, session)) = auth::current_session(&state, &cookies).await else {
        return Ok(Redirect::to("/").into_response());
    };
    state.inbox(&session.email).mark_all_as_read().await?;
    Ok(Redirect::to(&safe_back(back.voltar.as_deref(), LIST_PATH)).into_response())
}
