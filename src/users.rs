// src/users.rs

//! Lista fixa de credenciais do portal.
//!
//! As senhas ficam guardadas como hash bcrypt. O identificador de login é o
//! e-mail, comparado sem distinguir maiúsculas de minúsculas.

use thiserror::Error;

pub const ROLE_ENCARREGADO: &str = "Encarregado";
pub const ROLE_GESTOR: &str = "Gestor";

/// Credenciais de fábrica: `(e-mail, senha, papel)`.
pub const DEFAULT_USERS: [(&str, &str, &str); 2] = [
    ("encarregado@fortes.com", "1234", ROLE_ENCARREGADO),
    ("gestor@fortes.com", "5678", ROLE_GESTOR),
];

#[derive(Debug, Clone)]
pub struct Credential {
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Campo do formulário de login que deve receber o foco depois de um erro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Username,
    /// Foca e seleciona o conteúdo da senha.
    Password,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("Preencha usuário/e-mail e senha para continuar.")]
    MissingFields,
    #[error("Usuário ou senha incorretos.")]
    UnknownUser,
    #[error("Usuário ou senha incorretos.")]
    WrongPassword,
}

impl LoginError {
    pub fn focus(&self) -> Option<LoginFocus> {
        match self {
            LoginError::MissingFields => None,
            LoginError::UnknownUser => Some(LoginFocus::Username),
            LoginError::WrongPassword => Some(LoginFocus::Password),
        }
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Utilizador '{0}' não encontrado.")]
    UnknownUser(String),
    #[error("O e-mail '{0}' já está em uso.")]
    EmailTaken(String),
    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
}

pub struct CredentialDirectory {
    users: Vec<Credential>,
    cost: u32,
}

impl CredentialDirectory {
    pub fn from_plain(users: &[(&str, &str, &str)], cost: u32) -> Result<Self, bcrypt::BcryptError> {
        let users = users
            .iter()
            .map(|(email, password, role)| {
                Ok(Credential {
                    email: email.to_string(),
                    password_hash: bcrypt::hash(password, cost)?,
                    role: role.to_string(),
                })
            })
            .collect::<Result<Vec<_>, bcrypt::BcryptError>>()?;
        Ok(Self { users, cost })
    }

    pub fn with_defaults(cost: u32) -> Result<Self, bcrypt::BcryptError> {
        Self::from_plain(&DEFAULT_USERS, cost)
    }

    pub fn find(&self, email: &str) -> Option<&Credential> {
        let wanted = email.trim().to_lowercase();
        self.users.iter().find(|u| u.email.to_lowercase() == wanted)
    }

    fn find_mut(&mut self, email: &str) -> Option<&mut Credential> {
        let wanted = email.trim().to_lowercase();
        self.users.iter_mut().find(|u| u.email.to_lowercase() == wanted)
    }

    pub fn emails_with_role(&self, role: &str) -> Vec<String> {
        self.users.iter().filter(|u| u.role == role).map(|u| u.email.clone()).collect()
    }

    /// Procura o identificador (sem distinguir maiúsculas) e exige a senha exata.
    pub fn authenticate(&self, identifier: &str, password: &str) -> Result<&Credential, LoginError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.trim().is_empty() {
            return Err(LoginError::MissingFields);
        }
        let user = self.find(identifier).ok_or(LoginError::UnknownUser)?;
        if bcrypt::verify(password.trim(), &user.password_hash).unwrap_or(false) {
            Ok(user)
        } else {
            Err(LoginError::WrongPassword)
        }
    }

    pub fn verify_password(&self, email: &str, password: &str) -> bool {
        self.find(email)
            .map(|u| bcrypt::verify(password, &u.password_hash).unwrap_or(false))
            .unwrap_or(false)
    }

    /// Altera o e-mail e/ou a senha de um utilizador.
    pub fn update(&mut self, email: &str, new_email: Option<&str>, new_password: Option<&str>) -> Result<(), CredentialError> {
        if let Some(target) = new_email {
            let taken = self
                .find(target)
                .map_or(false, |other| other.email.to_lowercase() != email.trim().to_lowercase());
            if taken {
                return Err(CredentialError::EmailTaken(target.to_string()));
            }
        }
        let new_hash = new_password.map(|p| bcrypt::hash(p, self.cost)).transpose()?;
        let user = self.find_mut(email).ok_or_else(|| CredentialError::UnknownUser(email.to_string()))?;
        if let Some(target) = new_email {
            user.email = target.trim().to_string();
        }
        if let Some(hash) = new_hash {
            user.password_hash = hash;
        }
        Ok(())
    }
}
