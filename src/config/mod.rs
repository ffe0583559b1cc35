//! Configuration module for the dashboard backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AppError;
use crate::gateway::{
    MockSettings, DEFAULT_CLAIM_DELAY, DEFAULT_CLAIM_SUCCESS_RATE, DEFAULT_FETCH_DELAY,
};

/// Which backend the dashboard store talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayKind {
    Mock,
    Sqlite,
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    pub gateway: GatewayKind,
    /// Path to SQLite database file (sqlite gateway only)
    pub db_path: PathBuf,
    /// Latency and success rate of the mock gateway
    pub mock: MockSettings,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_psk = lookup("DASHBOARD_API_PSK").filter(|psk| !psk.is_empty());

        let bind_addr = lookup("DASHBOARD_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|_| AppError::Validation("Invalid DASHBOARD_BIND_ADDR format".to_string()))?;

        let log_level = lookup("DASHBOARD_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_format = match lookup("DASHBOARD_LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "Invalid DASHBOARD_LOG_FORMAT: {} (expected pretty or json)",
                    other
                )))
            }
        };

        let gateway = match lookup("DASHBOARD_GATEWAY").as_deref() {
            None | Some("mock") => GatewayKind::Mock,
            Some("sqlite") => GatewayKind::Sqlite,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "Invalid DASHBOARD_GATEWAY: {} (expected mock or sqlite)",
                    other
                )))
            }
        };

        let db_path = lookup("DASHBOARD_DB_PATH")
            .unwrap_or_else(|| "./data/dashboard.sqlite".to_string())
            .into();

        let fetch_delay =
            parse_millis(&lookup, "DASHBOARD_FETCH_DELAY_MS")?.unwrap_or(DEFAULT_FETCH_DELAY);
        let claim_delay =
            parse_millis(&lookup, "DASHBOARD_CLAIM_DELAY_MS")?.unwrap_or(DEFAULT_CLAIM_DELAY);

        let claim_success_rate = match lookup("DASHBOARD_CLAIM_SUCCESS_RATE") {
            None => DEFAULT_CLAIM_SUCCESS_RATE,
            Some(raw) => {
                let rate: f64 = raw.parse().map_err(|_| {
                    AppError::Validation(format!("Invalid DASHBOARD_CLAIM_SUCCESS_RATE: {}", raw))
                })?;
                if !(0.0..=1.0).contains(&rate) {
                    return Err(AppError::Validation(format!(
                        "DASHBOARD_CLAIM_SUCCESS_RATE must be within [0, 1], got {}",
                        rate
                    )));
                }
                rate
            }
        };

        Ok(Self {
            api_psk,
            bind_addr,
            log_level,
            log_format,
            gateway,
            db_path,
            mock: MockSettings {
                fetch_delay,
                claim_delay,
                claim_success_rate,
            },
        })
    }
}

fn parse_millis<F>(lookup: &F, key: &str) -> Result<Option<Duration>, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| AppError::Validation(format!("Invalid {}: {}", key, raw)))
        })
        .transpose()
}
