// src/store.rs

//! # Armazenamento chave-valor
//!
//! Todo o estado persistido do portal (sessões, notificações, requisições)
//! passa por [`KeyValueStore`]. Cada chave guarda um único valor JSON; a
//! ausência de uma chave equivale ao valor padrão em todos os leitores.

use futures_util::future::{self, BoxFuture};
use rusqlite::{params, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tokio_rusqlite::Connection;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("erro no SQLite: {0}")]
    Sqlite(#[from] tokio_rusqlite::Error),
    #[error("valor JSON inválido: {0}")]
    Json(#[from] serde_json::Error),
    #[error("lock do armazenamento envenenado")]
    Poisoned,
}

/// Interface mínima de armazenamento: ler, gravar e apagar um valor JSON.
/// As escritas são "last-write-wins", sem transações entre chaves.
pub trait KeyValueStore: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>, StoreError>>;
    fn set<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<(), StoreError>>;
    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StoreError>>;
}

/// Lê e desserializa uma chave. Chave ausente, valor ilegível ou falha do
/// armazenamento resultam no valor padrão (a falha fica registada no log).
pub async fn load<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match store.get(key).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(key, error = %e, "valor persistido ilegível, a usar o padrão");
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "falha ao ler o armazenamento, a usar o padrão");
            T::default()
        }
    }
}

/// Como [`load`], mas distingue a ausência da chave.
pub async fn load_optional<T>(store: &dyn KeyValueStore, key: &str) -> Option<T>
where
    T: DeserializeOwned,
{
    match store.get(key).await {
        Ok(Some(value)) => serde_json::from_value(value)
            .map_err(|e| tracing::warn!(key, error = %e, "valor persistido ilegível"))
            .ok(),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(key, error = %e, "falha ao ler o armazenamento");
            None
        }
    }
}

pub async fn save<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value)?;
    store.set(key, value).await
}

/// Armazenamento em memória, usado nos testes.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>, StoreError>> {
        let result = self
            .entries
            .lock()
            .map(|entries| entries.get(key).cloned())
            .map_err(|_| StoreError::Poisoned);
        Box::pin(future::ready(result))
    }

    fn set<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<(), StoreError>> {
        let result = self
            .entries
            .lock()
            .map(|mut entries| {
                entries.insert(key.to_string(), value);
            })
            .map_err(|_| StoreError::Poisoned);
        Box::pin(future::ready(result))
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StoreError>> {
        let result = self
            .entries
            .lock()
            .map(|mut entries| {
                entries.remove(key);
            })
            .map_err(|_| StoreError::Poisoned);
        Box::pin(future::ready(result))
    }
}

/// Armazenamento em SQLite: uma tabela `kv(key, value)` com o JSON em texto.
/// As consultas correm na thread da ligação `tokio_rusqlite`, fora dos
/// workers do runtime.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref().to_path_buf()).await?;
        Self::with_connection(conn).await
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory().await?).await
    }

    async fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.call(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL
                );",
            )?;
            Ok(())
        })
        .await?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>, StoreError>> {
        let key = key.to_string();
        Box::pin(async move {
            let raw: Option<String> = self
                .conn
                .call(move |conn| {
                    let value = conn
                        .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
                        .optional()?;
                    Ok(value)
                })
                .await?;
            match raw {
                Some(text) => Ok(Some(serde_json::from_str(&text)?)),
                None => Ok(None),
            }
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<(), StoreError>> {
        let key = key.to_string();
        Box::pin(async move {
            let text = serde_json::to_string(&value)?;
            self.conn
                .call(move |conn| {
                    conn.execute(
                        "INSERT INTO kv (key, value) VALUES (?1, ?2)
                         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                        params![key, text],
                    )?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StoreError>> {
        let key = key.to_string();
        Box::pin(async move {
            self.conn
                .call(move |conn| {
                    conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }
}
