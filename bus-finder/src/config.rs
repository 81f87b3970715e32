//! Process configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::datamall::{DEFAULT_BASE_URL, DataMallConfig};
use crate::directory::{CacheConfig, DEFAULT_CACHE_PATH};
use crate::locate::LocateConfig;

/// DataMall account key.
pub const API_KEY_VAR: &str = "LTA_API_KEY";
/// Override for the cache file location.
pub const CACHE_PATH_VAR: &str = "BUS_FINDER_CACHE_PATH";
/// Override for the cache TTL, in whole hours.
pub const CACHE_TTL_VAR: &str = "BUS_FINDER_CACHE_TTL_HOURS";
/// Override for the DataMall base URL.
pub const BASE_URL_VAR: &str = "DATAMALL_BASE_URL";
/// Optional key enabling the Google geolocation provider.
pub const GOOGLE_KEY_VAR: &str = "GOOGLE_GEOLOCATION_API_KEY";

const DEFAULT_TTL_HOURS: u64 = 24;

/// Errors building the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or blank
    #[error("{0} not set")]
    MissingVar(&'static str),

    /// A variable is set but unusable
    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Everything the binary needs to build its clients.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub cache_path: PathBuf,
    pub cache_ttl: Duration,
    pub google_api_key: Option<String>,
}

impl AppConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through an arbitrary lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get(API_KEY_VAR).ok_or(ConfigError::MissingVar(API_KEY_VAR))?;

        let cache_ttl = match get(CACHE_TTL_VAR) {
            Some(raw) => {
                let hours: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    var: CACHE_TTL_VAR,
                    message: format!("expected whole hours, got {raw:?}"),
                })?;
                if hours == 0 {
                    return Err(ConfigError::Invalid {
                        var: CACHE_TTL_VAR,
                        message: "must be at least 1 hour".to_string(),
                    });
                }
                let secs = hours.checked_mul(60 * 60).ok_or(ConfigError::Invalid {
                    var: CACHE_TTL_VAR,
                    message: format!("{hours} hours is too long"),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TTL_HOURS * 60 * 60),
        };

        Ok(Self {
            api_key,
            base_url: get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            cache_path: get(CACHE_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH)),
            cache_ttl,
            google_api_key: get(GOOGLE_KEY_VAR),
        })
    }

    pub fn datamall(&self) -> DataMallConfig {
        DataMallConfig::new(&self.api_key).with_base_url(&self.base_url)
    }

    pub fn cache(&self) -> CacheConfig {
        CacheConfig::new(&self.cache_path).with_ttl(self.cache_ttl)
    }

    pub fn locate(&self) -> LocateConfig {
        match &self.google_api_key {
            Some(key) => LocateConfig::new().with_google_api_key(key),
            None => LocateConfig::new(),
        }
    }

    /// The account key in a form safe to log.
    pub fn masked_api_key(&self) -> String {
        mask_key(&self.api_key)
    }
}

/// Show only the first and last four characters of a secret.
///
/// Secrets of eight characters or fewer are hidden entirely.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
