// src/error.rs

use crate::requests::ReviewError;
use crate::selection::SelectionError;
use crate::store::StoreError;
use crate::users::CredentialError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error("erro ao gerar hash da senha: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("erro de E/S: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("Acesso negado.")]
    Forbidden,
    #[error("{0}")]
    BadRequest(String),
}

impl PortalError {
    fn status(&self) -> StatusCode {
        match self {
            PortalError::Store(_)
            | PortalError::Hash(_)
            | PortalError::Io(_)
            | PortalError::Credential(CredentialError::Hash(_))
            | PortalError::Review(ReviewError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            PortalError::Review(ReviewError::NotFound(_)) => StatusCode::NOT_FOUND,
            PortalError::Review(ReviewError::AlreadyReviewed(_)) => StatusCode::CONFLICT,
            PortalError::Review(ReviewError::MissingComment) => StatusCode::BAD_REQUEST,
            PortalError::Credential(CredentialError::UnknownUser(_)) => StatusCode::NOT_FOUND,
            PortalError::Credential(CredentialError::EmailTaken(_)) => StatusCode::CONFLICT,
            PortalError::Selection(SelectionError::UnknownRow(_)) | PortalError::NotFound(_) => StatusCode::NOT_FOUND,
            PortalError::Selection(_) => StatusCode::CONFLICT,
            PortalError::Forbidden => StatusCode::FORBIDDEN,
            PortalError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "falha ao processar o pedido");
            return (status, "Erro interno. Tente novamente mais tarde.").into_response();
        }
        tracing::warn!(error = %self, status = status.as_u16(), "pedido recusado");
        (status, self.to_string()).into_response()
    }
}

pub type PortalResult<T> = Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::RowId;

    #[test]
    fn maps_errors_to_statuses() {
        assert_eq!(PortalError::Forbidden.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            PortalError::Selection(SelectionError::UnknownRow(RowId(3))).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PortalError::Selection(SelectionError::LimitReached).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            PortalError::Store(StoreError::Poisoned).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
