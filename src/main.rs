// src/main.rs

use portal_horas::auth::AppState;
use portal_horas::catalog;
use portal_horas::config::PortalConfig;
use portal_horas::store::SqliteStore;
use portal_horas::submission::SimulatedGateway;
use portal_horas::users::CredentialDirectory;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = PortalConfig::from_env();
    init_tracing(config.log_json);
    tracing::info!("🚀 A iniciar o Portal de Horas Extras...");

    // Garante a criação de todos os ficheiros e pastas necessários
    tokio::fs::create_dir_all(&config.data_dir).await?;
    catalog::ensure_catalog_file(&config.data_dir).await;
    let catalog = catalog::load_or_default(&config.data_dir).await;

    let store = SqliteStore::open(config.store_path()).await?;
    let credentials = CredentialDirectory::with_defaults(config.bcrypt_cost)?;
    let gateway = SimulatedGateway {
        failure_rate: config.submit_failure_rate,
        min_delay: config.submit_delay_min,
        max_delay: config.submit_delay_max,
    };

    let addr = config.addr;
    let app_state = AppState::new(config, Arc::new(store), credentials, catalog, Arc::new(gateway));
    let app = portal_horas::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "✅ Servidor a escutar");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
