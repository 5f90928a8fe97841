// src/notifications.rs

//! # Caixa de notificações
//!
//! Cada utilizador tem uma lista ordenada (mais recente primeiro) guardada
//! numa única chave do armazenamento. A lista é limitada a `cap` entradas;
//! as mais antigas saem quando chega uma nova.

use crate::dates;
use crate::store::{self, KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};

pub const NOTIFICATIONS_KEY: &str = "fe:notifications";
pub const DEFAULT_CAP: usize = 50;
/// Quantas notificações aparecem no menu do cabeçalho.
pub const DROPDOWN_SIZE: usize = 3;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    /// Classe do ícone Bootstrap Icons correspondente.
    pub fn icon(self) -> &'static str {
        match self {
            NotificationKind::Success => "check-circle-fill text-success",
            NotificationKind::Warning => "exclamation-triangle-fill text-warning",
            NotificationKind::Error => "x-circle-fill text-danger",
            NotificationKind::Info => "info-circle-fill text-info",
        }
    }
}

fn default_title() -> String {
    "Notificação".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Notification {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub read: bool,
}

/// Dados de uma notificação nova; os campos em falta recebem valores padrão.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct NewNotification {
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<NotificationKind>,
    pub date: Option<String>,
    pub read: Option<bool>,
}

impl NewNotification {
    pub fn new(title: &str, message: &str, kind: NotificationKind) -> Self {
        Self {
            title: Some(title.to_string()),
            message: Some(message.to_string()),
            kind: Some(kind),
            ..Self::default()
        }
    }

    fn into_notification(self) -> Notification {
        Notification {
            title: self.title.filter(|t| !t.is_empty()).unwrap_or_else(default_title),
            message: self.message.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            date: self.date.unwrap_or_else(dates::today_display),
            read: self.read.unwrap_or(false),
        }
    }
}

pub fn inbox_key(email: &str) -> String {
    format!("{}:{}", NOTIFICATIONS_KEY, email.trim().to_lowercase())
}

/// Acesso à caixa de notificações de um utilizador.
pub struct Inbox<'a> {
    store: &'a dyn KeyValueStore,
    key: String,
    cap: usize,
}

impl<'a> Inbox<'a> {
    pub fn new(store: &'a dyn KeyValueStore, email: &str, cap: usize) -> Self {
        Self { store, key: inbox_key(email), cap: cap.max(1) }
    }

    pub async fn list(&self) -> Vec<Notification> {
        store::load(self.store, &self.key).await
    }

    pub async fn unread_count(&self) -> usize {
        self.list().await.iter().filter(|n| !n.read).count()
    }

    /// Insere no início da lista e descarta o excedente no fim.
    pub async fn add(&self, new: NewNotification) -> Result<Notification, StoreError> {
        let notification = new.into_notification();
        let mut list = self.list().await;
        list.insert(0, notification.clone());
        if list.len() > self.cap {
            let dropped = list.len() - self.cap;
            list.truncate(self.cap);
            tracing::debug!(key = %self.key, dropped, "notificações antigas descartadas");
        }
        store::save(self.store, &self.key, &list).await?;
        Ok(notification)
    }

    /// Marca uma notificação como lida; devolve `false` se o índice não existir.
    pub async fn mark_as_read(&self, index: usize) -> Result<bool, StoreError> {
        let mut list = self.list().await;
        match list.get_mut(index) {
            Some(n) => {
                n.read = true;
                store::save(self.store, &self.key, &list).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn mark_all_as_read(&self) -> Result<(), StoreError> {
        let mut list = self.list().await;
        list.iter_mut().for_each(|n| n.read = true);
        store::save(self.store, &self.key, &list).await
    }

    /// Move a caixa para a chave de outro e-mail (alteração de perfil).
    pub async fn move_to(self, new_email: &str) -> Result<Inbox<'a>, StoreError> {
        let target = Inbox::new(self.store, new_email, self.cap);
        if target.key != self.key {
            let list = self.list().await;
            store::save(self.store, &target.key, &list).await?;
            self.store.remove(&self.key).await?;
        }
        Ok(target)
    }
}

/// Texto do contador do sino: nada sem pendentes, `9+` acima de nove.
pub fn badge_label(unread: usize) -> Option<String> {
    match unread {
        0 => None,
        1..=9 => Some(unread.to_string()),
        _ => Some("9+".to_string()),
    }
}

/// O que o menu do cabeçalho deve mostrar.
#[derive(Debug, Clone, PartialEq)]
pub struct Dropdown {
    /// Até três entradas, com o índice original na lista.
    pub recent: Vec<(usize, Notification)>,
    /// Quantas notificações ficam de fora do menu.
    pub more: usize,
    pub show_view_all: bool,
    pub show_mark_all: bool,
}

pub fn dropdown(list: &[Notification]) -> Dropdown {
    let recent: Vec<(usize, Notification)> = list
        .iter()
        .take(DROPDOWN_SIZE)
        .cloned()
        .enumerate()
        .collect();
    Dropdown {
        more: list.len().saturating_sub(DROPDOWN_SIZE),
        show_view_all: !list.is_empty(),
        show_mark_all: list.iter().any(|n| !n.read),
        recent,
    }
}
