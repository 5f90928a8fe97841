// src/auth.rs

use crate::catalog::Catalog;
use crate::config::PortalConfig;
use crate::notifications::Inbox;
use crate::request_form::RequestForm;
use crate::store::{self, KeyValueStore, StoreError};
use crate::submission::SubmissionGateway;
use crate::users::CredentialDirectory;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session_id";
pub const AUTH_KEY: &str = "fe:auth:user";
const REMEMBER_DAYS: i64 = 30;

/// Representa o estado partilhado da aplicação.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PortalConfig>,
    pub store: Arc<dyn KeyValueStore>,
    pub credentials: Arc<Mutex<CredentialDirectory>>,
    pub catalog: Arc<Catalog>,
    pub gateway: Arc<dyn SubmissionGateway>,
    /// Um formulário de solicitação por sessão.
    pub forms: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<RequestForm>>>>>,
}

impl AppState {
    pub fn new(
        config: PortalConfig,
        store: Arc<dyn KeyValueStore>,
        credentials: CredentialDirectory,
        catalog: Catalog,
        gateway: Arc<dyn SubmissionGateway>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            credentials: Arc::new(Mutex::new(credentials)),
            catalog: Arc::new(catalog),
            gateway,
            forms: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Formulário da sessão, criado na primeira visita.
    pub fn form_for(&self, session_id: &str) -> Arc<tokio::sync::Mutex<RequestForm>> {
        let mut forms = self.forms.lock().unwrap_or_else(|e| e.into_inner());
        forms
            .entry(session_id.to_string())
            .or_insert_with(|| {
                Arc::new(tokio::sync::Mutex::new(RequestForm::new(
                    self.catalog.funcionarios.clone(),
                    self.catalog.obras.clone(),
                )))
            })
            .clone()
    }

    pub fn inbox(&self, email: &str) -> Inbox<'_> {
        Inbox::new(self.store.as_ref(), email, self.config.notification_cap)
    }
}

/// Dados mínimos do utilizador autenticado.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AuthSession {
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub remember: bool,
}

/// Estrutura para deserializar os dados do formulário de login.
#[derive(Debug, Deserialize, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub remember: Option<String>,
}

pub fn session_key(session_id: &str) -> String {
    format!("{AUTH_KEY}:{session_id}")
}

/// Sessão do pedido atual, se existir.
pub async fn current_session(state: &AppState, cookies: &Cookies) -> Option<(String, AuthSession)> {
    let session_id = cookies.get(SESSION_COOKIE)?.value().to_string();
    let session = store::load_optional::<AuthSession>(state.store.as_ref(), &session_key(&session_id)).await?;
    Some((session_id, session))
}

/// Grava a sessão e envia o cookie. Com `remember` o cookie dura 30 dias;
/// sem ele, termina quando o navegador fecha.
pub async fn start_session(state: &AppState, cookies: &Cookies, session: &AuthSession) -> Result<String, StoreError> {
    let session_id = Uuid::new_v4().to_string();
    store::save(state.store.as_ref(), &session_key(&session_id), session).await?;
    let mut cookie = Cookie::build((SESSION_COOKIE, session_id.clone())).path("/").http_only(true);
    if session.remember {
        cookie = cookie.max_age(Duration::days(REMEMBER_DAYS));
    }
    cookies.add(cookie.build());
    tracing::info!(email = %session.email, role = %session.role, "sessão iniciada");
    Ok(session_id)
}

pub async fn save_session(state: &AppState, session_id: &str, session: &AuthSession) -> Result<(), StoreError> {
    store::save(state.store.as_ref(), &session_key(session_id), session).await
}

pub async fn end_session(state: &AppState, cookies: &Cookies, session_id: &str) -> Result<(), StoreError> {
    state.store.remove(&session_key(session_id)).await?;
    state.forms.lock().unwrap_or_else(|e| e.into_inner()).remove(session_id);
    cookies.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    tracing::info!("sessão terminada");
    Ok(())
}
