// src/requests.rs

//! Registo das solicitações enviadas e da sua análise pelo gestor.

use crate::modal::Confirm;
use crate::selection::MasterOption;
use crate::store::{self, KeyValueStore, StoreError};
use crate::submission::SubmissionPayload;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;
use tokio::sync::Mutex;

pub const REQUESTS_KEY: &str = "fe:requests";
pub const DENY_CONFIRM_MESSAGE: &str = "Tem certeza que deseja negar!?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pendente,
    Aprovada,
    Negada,
}

impl RequestStatus {
    pub fn label(self) -> &'static str {
        match self {
            RequestStatus::Pendente => "Pendente",
            RequestStatus::Aprovada => "Aprovada",
            RequestStatus::Negada => "Negada",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Número interno, atribuído ao registar; é o que aparece nas rotas.
    pub id: u32,
    /// Protocolo devolvido pela API de envio, mostrado ao utilizador.
    #[serde(default)]
    pub protocol: u32,
    pub requested_by: String,
    #[serde(default)]
    pub obra: Option<MasterOption>,
    #[serde(default)]
    pub hours: Option<f64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub employees: Vec<MasterOption>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
}

impl RequestRecord {
    /// Registo pendente; o `id` só é atribuído por [`record`].
    pub fn from_payload(protocol: u32, requested_by: &str, payload: &SubmissionPayload) -> Self {
        Self {
            id: 0,
            protocol,
            requested_by: requested_by.to_string(),
            obra: payload.obra.clone(),
            hours: payload.hours,
            date: payload.date.flatten(),
            employees: payload.employees.clone(),
            notes: payload.notes.clone(),
            status: RequestStatus::Pendente,
            comment: None,
            reviewed_by: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Deny,
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("O comentário é obrigatório.")]
    MissingComment,
    #[error("Requisição {0} não encontrada.")]
    NotFound(u32),
    #[error("A requisição {0} já foi analisada.")]
    AlreadyReviewed(u32),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resultado de uma análise: `Declined` quando a negação não foi confirmada.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    Reviewed(RequestRecord),
    Declined,
}

/// Serializa as escritas na lista de requisições (ler, alterar, gravar).
fn write_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

pub async fn list(store: &dyn KeyValueStore) -> Vec<RequestRecord> {
    store::load(store, REQUESTS_KEY).await
}

pub async fn find(store: &dyn KeyValueStore, id: u32) -> Option<RequestRecord> {
    list(store).await.into_iter().find(|r| r.id == id)
}

/// Guarda uma solicitação nova no topo da lista, com o próximo número livre.
pub async fn record(store: &dyn KeyValueStore, mut request: RequestRecord) -> Result<RequestRecord, StoreError> {
    let _guard = write_lock().lock().await;
    let mut all = list(store).await;
    request.id = all.iter().map(|r| r.id).max().unwrap_or(0) + 1;
    all.insert(0, request.clone());
    store::save(store, REQUESTS_KEY, &all).await?;
    Ok(request)
}

/// Passa as requisições de um solicitante para o seu novo e-mail.
pub async fn reassign(store: &dyn KeyValueStore, old_email: &str, new_email: &str) -> Result<usize, StoreError> {
    let _guard = write_lock().lock().await;
    let mut all = list(store).await;
    let mut moved = 0;
    for request in all.iter_mut().filter(|r| r.requested_by.eq_ignore_ascii_case(old_email)) {
        request.requested_by = new_email.to_string();
        moved += 1;
    }
    if moved > 0 {
        store::save(store, REQUESTS_KEY, &all).await?;
        tracing::debug!(old = %old_email, new = %new_email, moved, "requisições passadas para o novo e-mail");
    }
    Ok(moved)
}

/// Aprova ou nega uma requisição pendente.
///
/// O comentário é validado antes de qualquer confirmação; só a negação pede
/// confirmação.
pub async fn review(
    store: &dyn KeyValueStore,
    id: u32,
    decision: Decision,
    comment: &str,
    reviewer: &str,
    confirm: &dyn Confirm,
) -> Result<ReviewOutcome, ReviewError> {
    let comment = comment.trim();
    if comment.is_empty() {
        return Err(ReviewError::MissingComment);
    }
    let current = find(store, id).await.ok_or(ReviewError::NotFound(id))?;
    if current.status != RequestStatus::Pendente {
        return Err(ReviewError::AlreadyReviewed(id));
    }
    if decision == Decision::Deny && !confirm.confirm(DENY_CONFIRM_MESSAGE).await {
        return Ok(ReviewOutcome::Declined);
    }

    let _guard = write_lock().lock().await;
    let mut all = list(store).await;
    let Some(entry) = all.iter_mut().find(|r| r.id == id) else {
        return Err(ReviewError::NotFound(id));
    };
    if entry.status != RequestStatus::Pendente {
        return Err(ReviewError::AlreadyReviewed(id));
    }
    entry.status = match decision {
        Decision::Approve => RequestStatus::Aprovada,
        Decision::Deny => RequestStatus::Negada,
    };
    entry.comment = Some(comment.to_string());
    entry.reviewed_by = Some(reviewer.to_string());
    let updated = entry.clone();
    store::save(store, REQUESTS_KEY, &all).await?;
    tracing::info!(id, protocol = updated.protocol, status = updated.status.label(), reviewer, "requisição analisada");
    Ok(ReviewOutcome::Reviewed(updated))
}
