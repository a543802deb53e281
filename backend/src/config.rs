use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_USER_AGENT: &str = concat!("footprint-backend/", env!("CARGO_PKG_VERSION"));
const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_DIR: &str = "backend/data/distance_cache";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("environment variable {name} is invalid: {reason}")]
    Env { name: &'static str, reason: String },
}

/// Process-level settings, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub geocoder_timeout: Duration,
    pub cache_dir: PathBuf,
    pub emissions_config_path: Option<PathBuf>,
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset or blank variables take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Env {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let timeout_secs = match var("GEOCODER_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Env {
                name: "GEOCODER_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_GEOCODER_TIMEOUT_SECS,
        };

        Ok(Self {
            bind_addr,
            geocoder_url: var("GEOCODER_URL").unwrap_or_else(|| DEFAULT_GEOCODER_URL.to_string()),
            geocoder_user_agent: var("GEOCODER_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            geocoder_timeout: Duration::from_secs(timeout_secs),
            cache_dir: var("DISTANCE_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            emissions_config_path: var("EMISSIONS_CONFIG").map(PathBuf::from),
            database_url: var("DATABASE_URL"),
        })
    }
}
