// src/profile.rs

//! Alteração de e-mail e senha pelo próprio utilizador.

use crate::auth::AuthSession;
use crate::modal::{Modal, ModalKind};
use crate::notifications::Inbox;
use crate::requests;
use crate::store::{KeyValueStore, StoreError};
use crate::users::{CredentialDirectory, CredentialError};
use serde::Deserialize;
use std::sync::Mutex;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ProfileForm {
    #[serde(default)]
    pub new_email: String,
    #[serde(default)]
    pub confirm_email: String,
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Os e-mails informados não coincidem.")]
    EmailMismatch,
    #[error("As senhas informadas não coincidem.")]
    PasswordMismatch,
    #[error("A nova senha deve ter no mínimo 6 caracteres.")]
    PasswordTooShort,
    #[error("Informe sua senha atual para confirmar as alterações.")]
    CurrentPasswordRequired,
    #[error("Senha atual incorreta.")]
    WrongCurrentPassword,
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProfileError {
    /// Erros que o utilizador corrige no próprio formulário.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, ProfileError::Store(_) | ProfileError::Credential(CredentialError::Hash(_)))
    }
}

/// O que o formulário pede para alterar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileChange {
    pub new_email: Option<String>,
    pub new_password: Option<String>,
}

impl ProfileChange {
    pub fn is_empty(&self) -> bool {
        self.new_email.is_none() && self.new_password.is_none()
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl ProfileForm {
    /// Valida pela ordem do formulário e devolve o primeiro erro encontrado.
    pub fn validate(&self) -> Result<ProfileChange, ProfileError> {
        let new_email = non_blank(&self.new_email);
        let new_password = non_blank(&self.new_password);

        if new_email.is_some() && self.new_email.trim() != self.confirm_email.trim() {
            return Err(ProfileError::EmailMismatch);
        }
        if let Some(password) = &new_password {
            if password != self.confirm_password.trim() {
                return Err(ProfileError::PasswordMismatch);
            }
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(ProfileError::PasswordTooShort);
            }
        }
        let change = ProfileChange { new_email, new_password };
        if !change.is_empty() && self.current_password.trim().is_empty() {
            return Err(ProfileError::CurrentPasswordRequired);
        }
        Ok(change)
    }
}

/// Aplica a alteração às credenciais, à sessão, à caixa de notificações
/// e às requisições do utilizador.
pub async fn apply(
    credentials: &Mutex<CredentialDirectory>,
    store: &dyn KeyValueStore,
    notification_cap: usize,
    session: &mut AuthSession,
    form: &ProfileForm,
) -> Result<ProfileChange, ProfileError> {
    let change = form.validate()?;
    if change.is_empty() {
        return Ok(change);
    }
    {
        let mut directory = credentials.lock().unwrap_or_else(|e| e.into_inner());
        if !directory.verify_password(&session.email, form.current_password.trim()) {
            return Err(ProfileError::WrongCurrentPassword);
        }
        directory.update(&session.email, change.new_email.as_deref(), change.new_password.as_deref())?;
    }
    if let Some(email) = &change.new_email {
        Inbox::new(store, &session.email, notification_cap).move_to(email).await?;
        requests::reassign(store, &session.email, email).await?;
        tracing::info!(old = %session.email, new = %email, "e-mail do perfil alterado");
        session.email = email.clone();
    }
    if change.new_password.is_some() {
        tracing::info!(email = %session.email, "senha alterada");
    }
    Ok(change)
}

pub fn saved_modal() -> Modal {
    Modal::alert(
        "Alterações Salvas",
        "<p>Suas informações de perfil foram atualizadas com sucesso.</p>",
        ModalKind::Success,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::{NewNotification, NotificationKind};
    use crate::requests::RequestRecord;
    use crate::store::MemoryStore;
    use crate::submission::SubmissionPayload;

    fn form(new_email: &str, confirm_email: &str, current: &str, new_pw: &str, confirm_pw: &str) -> ProfileForm {
        ProfileForm {
            new_email: new_email.into(),
            confirm_email: confirm_email.into(),
            current_password: current.into(),
            new_password: new_pw.into(),
            confirm_password: confirm_pw.into(),
        }
    }

    #[test]
    fn first_failing_rule_is_reported() {
        let msg = |f: ProfileForm| f.validate().unwrap_err().to_string();
        assert_eq!(msg(form("a@b.c", "x@b.c", "", "12", "34")), "Os e-mails informados não coincidem.");
        assert_eq!(msg(form("", "", "", "123456", "654321")), "As senhas informadas não coincidem.");
        assert_eq!(msg(form("", "", "", "123", "123")), "A nova senha deve ter no mínimo 6 caracteres.");
        assert_eq!(
            msg(form("a@b.c", "a@b.c", "  ", "", "")),
            "Informe sua senha atual para confirmar as alterações."
        );
    }

    #[test]
    fn nothing_to_change_is_valid_without_password() {
        assert!(form("", "", "", "", "").validate().unwrap().is_empty());
    }

    fn setup() -> (Mutex<CredentialDirectory>, MemoryStore, AuthSession) {
        let dir = CredentialDirectory::with_defaults(4).unwrap();
        let session = AuthSession { email: "encarregado@fortes.com".into(), role: "Encarregado".into(), remember: false };
        (Mutex::new(dir), MemoryStore::new(), session)
    }

    #[tokio::test]
    async fn wrong_current_password_changes_nothing() {
        let (dir, store, mut session) = setup();
        let err = apply(&dir, &store, 50, &mut session, &form("n@f.com", "n@f.com", "0000", "", "")).await.unwrap_err();
        assert!(matches!(err, ProfileError::WrongCurrentPassword));
        assert_eq!(session.email, "encarregado@fortes.com");
        assert!(dir.lock().unwrap().find("n@f.com").is_none());
    }

    #[tokio::test]
    async fn new_email_moves_session_inbox_and_requests() {
        let (dir, store, mut session) = setup();
        Inbox::new(&store, &session.email, 50)
            .add(NewNotification::new("Olá", "msg", NotificationKind::Info))
            .await
            .unwrap();
        let payload = SubmissionPayload { obra: None, hours: Some(2.0), date: None, employees: Vec::new(), notes: "Laje".into() };
        let saved = requests::record(&store, RequestRecord::from_payload(4242, &session.email, &payload)).await.unwrap();

        let change = apply(&dir, &store, 50, &mut session, &form("novo@fortes.com", "novo@fortes.com", "1234", "segredo", "segredo"))
            .await
            .unwrap();
        assert_eq!(change.new_email.as_deref(), Some("novo@fortes.com"));
        assert_eq!(session.email, "novo@fortes.com");
        assert!(dir.lock().unwrap().authenticate("novo@fortes.com", "segredo").is_ok());
        assert_eq!(Inbox::new(&store, "novo@fortes.com", 50).list().await.len(), 1);
        assert!(Inbox::new(&store, "encarregado@fortes.com", 50).list().await.is_empty());
        assert_eq!(requests::find(&store, saved.id).await.unwrap().requested_by, "novo@fortes.com");
    }

    #[tokio::test]
    async fn taken_email_is_a_user_error() {
        let (dir, store, mut session) = setup();
        let err = apply(&dir, &store, 50, &mut session, &form("gestor@fortes.com", "gestor@fortes.com", "1234", "", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::Credential(CredentialError::EmailTaken(_))));
        assert!(err.is_user_error());
    }
}
