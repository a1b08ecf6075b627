use std::fmt::Display;
use std::str::FromStr;

use queuedesk_core::queue::{QueueSettings, DEFAULT_AVG_SERVICE_MINUTES, DEFAULT_NOTIFY_AHEAD};

use crate::auth::jwt::JwtConfig;

/// Default interval between expired-session sweeps.
const DEFAULT_SESSION_CLEANUP_INTERVAL_SECS: u64 = 3600;

/// Default interval between WebSocket keep-alive pings.
const DEFAULT_WS_HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Wait estimation and proximity notification tunables.
    pub queue: QueueSettings,
    /// Admin account created at startup when it does not exist yet.
    pub bootstrap_admin: Option<AdminBootstrap>,
    /// Seconds between expired-session sweeps (default: `3600`).
    pub session_cleanup_interval_secs: u64,
    /// Seconds between WebSocket pings (default: `30`).
    pub ws_heartbeat_interval_secs: u64,
}

/// Credentials for the first admin account.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `HOST`                          | `0.0.0.0`               |
    /// | `PORT`                          | `3000`                  |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`         | `30`                    |
    /// | `AVG_SERVICE_MINUTES`           | `2`                     |
    /// | `NOTIFY_AHEAD_POSITIONS`        | `3`                     |
    /// | `SESSION_CLEANUP_INTERVAL_SECS` | `3600`                  |
    /// | `WS_HEARTBEAT_INTERVAL_SECS`    | `30`                    |
    /// | `ADMIN_EMAIL` + `ADMIN_PASSWORD`| unset (no bootstrap)    |
    ///
    /// # Panics
    ///
    /// Panics on unparseable numbers, and on zero or negative intervals and
    /// queue tunables; misconfiguration should fail fast.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = positive_var("REQUEST_TIMEOUT_SECS", 30);
        let shutdown_timeout_secs: u64 = positive_var("SHUTDOWN_TIMEOUT_SECS", 30);
        let avg_service_minutes: i32 =
            positive_var("AVG_SERVICE_MINUTES", DEFAULT_AVG_SERVICE_MINUTES);
        let notify_ahead: i32 = positive_var("NOTIFY_AHEAD_POSITIONS", DEFAULT_NOTIFY_AHEAD);
        let session_cleanup_interval_secs: u64 = positive_var(
            "SESSION_CLEANUP_INTERVAL_SECS",
            DEFAULT_SESSION_CLEANUP_INTERVAL_SECS,
        );
        let ws_heartbeat_interval_secs: u64 =
            positive_var("WS_HEARTBEAT_INTERVAL_SECS", DEFAULT_WS_HEARTBEAT_INTERVAL_SECS);

        let bootstrap_admin = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminBootstrap {
                    email,
                    password,
                    full_name: std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".into()),
                    phone_number: std::env::var("ADMIN_PHONE").unwrap_or_else(|_| "N/A".into()),
                })
            }
            _ => None,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            queue: QueueSettings {
                avg_service_minutes,
                notify_ahead,
            },
            bootstrap_admin,
            session_cleanup_interval_secs,
            ws_heartbeat_interval_secs,
        }
    }
}

/// Read `name` from the environment, falling back to `default` when unset.
fn positive_var<T>(name: &str, default: T) -> T
where
    T: FromStr + PartialOrd + From<u8> + Display,
{
    match std::env::var(name) {
        Ok(raw) => parse_positive(name, &raw),
        Err(_) => default,
    }
}

/// Parse a number that must be at least 1.
///
/// # Panics
///
/// Panics when `raw` is not a number or is below 1.
fn parse_positive<T>(name: &str, raw: &str) -> T
where
    T: FromStr + PartialOrd + From<u8> + Display,
{
    let value: T = raw
        .trim()
        .parse()
        .unwrap_or_else(|_| panic!("{name} must be a number, got {raw:?}"));
    assert!(value >= T::from(1), "{name} must be at least 1, got {value}");
    value
}
