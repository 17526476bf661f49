use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr};

use chrono::Duration;
use thiserror::Error;
use tracing::info;

use crate::modules::visits::use_cases::scan_visitor::handler::ResolverSettings;
use crate::shared::core::primitives::parse_utc_offset;
use crate::shared::infrastructure::postgres::DatabaseConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// `None` runs on the in-memory adapters.
    pub database: Option<DatabaseConfig>,
    pub seed_path: Option<PathBuf>,
    pub resolver: ResolverSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = try_load(&lookup, "BIND_ADDR", "0.0.0.0:8080")?;

        let database = match optional(&lookup, "DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: try_load(&lookup, "DATABASE_MAX_CONNECTIONS", "10")?,
                connect_timeout_secs: try_load(&lookup, "DATABASE_CONNECT_TIMEOUT_SECS", "30")?,
            }),
            None => {
                info!("DATABASE_URL not set, using in-memory adapters");
                None
            }
        };

        let offset_raw: String = try_load(&lookup, "VISIT_LOG_UTC_OFFSET", "+08:00")?;
        let utc_offset = parse_utc_offset(&offset_raw).ok_or_else(|| ConfigError::Invalid {
            key: "VISIT_LOG_UTC_OFFSET",
            value: offset_raw.clone(),
            reason: "expected an offset such as +08:00".into(),
        })?;

        let window_secs: u32 = try_load(&lookup, "DUPLICATE_SCAN_WINDOW_SECS", "5")?;

        Ok(Self {
            bind_addr,
            database,
            seed_path: optional(&lookup, "SEED_PATH").map(PathBuf::from),
            resolver: ResolverSettings {
                utc_offset,
                duplicate_scan_window: Duration::seconds(i64::from(window_secs)),
            },
        })
    }
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = optional(lookup, key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.clone(),
        reason: e.to_string(),
    })
}
