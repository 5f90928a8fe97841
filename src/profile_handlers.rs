// src/profile_handlers.rs

use crate::auth::{self, AppState};
use crate::chrome::PROFILE_PATH;
use crate::error::{PortalError, PortalResult};
use crate::profile::{self, ProfileError, ProfileForm};
use crate::views::{self, profile as view};
use axum::{
    debug_handler,
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

#[debug_handler]
pub async fn profile_page(State(state): State<AppState>, cookies: Cookies) -> impl IntoResponse {
    let Some((_, session)) = auth::current_session(&state, &cookies).await else {
        return Redirect::to("/").into_response();
    };
    views::render_shell(&state, &session, "Perfil", PROFILE_PATH, view::profile_content(&session.email, None), None)
        .await
        .into_response()
}

#[debug_handler]
pub async fn save_profile_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<ProfileForm>,
) -> PortalResult<Response> {
    let Some((session_id, mut session)) = auth::current_session(&state, &cookies).await else {
        return Ok(Redirect::to("/").into_response());
    };

    let result =
        profile::apply(&state.credentials, state.store.as_ref(), state.config.notification_cap, &mut session, &form).await;

    match result {
        Ok(change) => {
            if !change.is_empty() {
                auth::save_session(&state, &session_id, &session).await?;
            }
            let dialog = views::dialog(&state.config, &profile::saved_modal(), None, &[]);
            let content = view::profile_content(&session.email, None);
            Ok(views::render_shell(&state, &session, "Perfil", PROFILE_PATH, content, Some(dialog)).await.into_response())
        }
        Err(e) if e.is_user_error() => {
            tracing::debug!(email = %session.email, error = %e, "perfil não alterado");
            let content = view::profile_content(&session.email, Some(&e.to_string()));
            Ok(views::render_shell(&state, &session, "Perfil", PROFILE_PATH, content, None).await.into_response())
        }
        Err(ProfileError::Store(e)) => Err(PortalError::Store(e)),
        Err(ProfileError::Credential(e)) => Err(PortalError::Credential(e)),
        Err(e) => Err(PortalError::BadRequest(e.to_string())),
    }
}
