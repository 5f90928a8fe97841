// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Configuração do portal, lida uma vez das variáveis de ambiente.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub addr: SocketAddr,
    pub data_dir: PathBuf,
    pub fragments_dir: PathBuf,
    /// Com `false`, os diálogos usam `confirm()`/`alert()` do navegador.
    pub rich_dialogs: bool,
    pub submit_failure_rate: f64,
    pub submit_delay_min: Duration,
    pub submit_delay_max: Duration,
    pub notification_cap: usize,
    pub bcrypt_cost: u32,
    pub log_json: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: PathBuf::from("data"),
            fragments_dir: PathBuf::from("static"),
            rich_dialogs: true,
            submit_failure_rate: 0.08,
            submit_delay_min: Duration::from_millis(900),
            submit_delay_max: Duration::from_millis(1500),
            notification_cap: crate::notifications::DEFAULT_CAP,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            log_json: false,
        }
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn env_path(name: &str, default: PathBuf) -> PathBuf {
    env::var(name).map(PathBuf::from).unwrap_or(default)
}

impl PortalConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        let addr = env::var("PORTAL_ADDR")
            .ok()
            .and_then(|v| v.parse::<SocketAddr>().ok())
            .unwrap_or(d.addr);
        Self {
            addr,
            data_dir: env_path("PORTAL_DATA_DIR", d.data_dir),
            fragments_dir: env_path("PORTAL_FRAGMENTS_DIR", d.fragments_dir),
            rich_dialogs: env_bool("PORTAL_RICH_DIALOGS", d.rich_dialogs),
            submit_failure_rate: env_f64("PORTAL_SUBMIT_FAILURE_RATE", d.submit_failure_rate).clamp(0.0, 1.0),
            submit_delay_min: Duration::from_millis(env_u64("PORTAL_SUBMIT_DELAY_MIN_MS", 900)),
            submit_delay_max: Duration::from_millis(env_u64("PORTAL_SUBMIT_DELAY_MAX_MS", 1500)),
            notification_cap: env_usize("PORTAL_NOTIFICATION_CAP", d.notification_cap).max(1),
            bcrypt_cost: env_u64("PORTAL_BCRYPT_COST", d.bcrypt_cost as u64) as u32,
            log_json: env_bool("PORTAL_LOG_JSON", d.log_json),
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("portal.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_and_clamps() {
        env::set_var("PORTAL_ADDR", "0.0.0.0:8080");
        env::set_var("PORTAL_RICH_DIALOGS", "no");
        env::set_var("PORTAL_SUBMIT_FAILURE_RATE", "3.5");
        env::set_var("PORTAL_NOTIFICATION_CAP", "0");
        env::set_var("PORTAL_BCRYPT_COST", "lixo");

        let config = PortalConfig::from_env();
        assert_eq!(config.addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert!(!config.rich_dialogs);
        assert_eq!(config.submit_failure_rate, 1.0);
        assert_eq!(config.notification_cap, 1);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.store_path(), config.data_dir.join("portal.db"));

        env::set_var("PORTAL_SUBMIT_FAILURE_RATE", "NaN");
        assert_eq!(PortalConfig::from_env().submit_failure_rate, PortalConfig::default().submit_failure_rate);
        env::set_var("PORTAL_SUBMIT_FAILURE_RATE", "inf");
        assert_eq!(PortalConfig::from_env().submit_failure_rate, PortalConfig::default().submit_failure_rate);

        for name in [
            "PORTAL_ADDR",
            "PORTAL_RICH_DIALOGS",
            "PORTAL_SUBMIT_FAILURE_RATE",
            "PORTAL_NOTIFICATION_CAP",
            "PORTAL_BCRYPT_COST",
        ] {
            env::remove_var(name);
        }
    }
}
