// src/catalog.rs

//! Listas de funcionários e de obras oferecidas no formulário.

use crate::selection::MasterOption;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

pub const CATALOG_FILE: &str = "catalogo.json";

type AppResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub funcionarios: Vec<MasterOption>,
    pub obras: Vec<MasterOption>,
}

impl Default for Catalog {
    fn default() -> Self {
        let funcionarios = [
            ("101", "Antônio Pereira"),
            ("102", "Beatriz Souza"),
            ("103", "Carlos Lima"),
            ("104", "Daniela Rocha"),
            ("105", "Eduardo Martins"),
            ("106", "Fernanda Alves"),
        ];
        let obras = [
            ("obra-centro", "Edifício Centro Empresarial"),
            ("obra-aldeota", "Residencial Aldeota"),
            ("obra-porto", "Galpão Porto do Mucuripe"),
        ];
        Self {
            funcionarios: funcionarios.iter().map(|(v, t)| MasterOption::new(v, t)).collect(),
            obras: obras.iter().map(|(v, t)| MasterOption::new(v, t)).collect(),
        }
    }
}

/// Garante que o ficheiro do catálogo existe, criando-o com os valores padrão.
pub async fn ensure_catalog_file(data_dir: &Path) {
    let path = data_dir.join(CATALOG_FILE);
    if fs::try_exists(&path).await.unwrap_or(false) {
        return;
    }
    tracing::info!(path = %path.display(), "catálogo não encontrado, a criar um novo");
    if let Err(e) = save_catalog(&path, &Catalog::default()).await {
        tracing::error!(path = %path.display(), error = %e, "falha ao criar o catálogo");
    }
}

async fn save_catalog(path: &Path, catalog: &Catalog) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let json_content = serde_json::to_string_pretty(catalog)?;
    fs::write(path, json_content).await?;
    Ok(())
}

pub async fn load_catalog(data_dir: &Path) -> AppResult<Catalog> {
    let content = fs::read_to_string(data_dir.join(CATALOG_FILE)).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Carrega o catálogo; se não for possível, usa o padrão.
pub async fn load_or_default(data_dir: &Path) -> Catalog {
    match load_catalog(data_dir).await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!(error = %e, "catálogo ilegível, a usar a lista padrão");
            Catalog::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_default_file_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        ensure_catalog_file(dir.path()).await;
        let loaded = load_catalog(dir.path()).await.expect("load");
        assert_eq!(loaded, Catalog::default());

        let custom = Catalog { funcionarios: vec![MasterOption::new("9", "Zé")], obras: vec![] };
        save_catalog(&dir.path().join(CATALOG_FILE), &custom).await.unwrap();
        ensure_catalog_file(dir.path()).await;
        assert_eq!(load_or_default(dir.path()).await, custom);
    }

    #[tokio::test]
    async fn unreadable_catalog_falls_back_to_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(CATALOG_FILE), "{").await.unwrap();
        assert_eq!(load_or_default(dir.path()).await, Catalog::default());
    }
}
