//! Runtime configuration
//!
//! Paths and endpoints are read from the environment, falling back to the
//! platform data directory.

use crate::error::{AppError, AppResult};
use log::info;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DB_PATH_VAR: &str = "SUNSEEKER_DB_PATH";
pub const STORAGE_DIR_VAR: &str = "SUNSEEKER_STORAGE_DIR";
pub const SOLAR_API_URL_VAR: &str = "SUNSEEKER_SOLAR_API_URL";
pub const REFRESH_INTERVAL_VAR: &str = "SUNSEEKER_REFRESH_INTERVAL_SECS";

pub const DEFAULT_SOLAR_API_URL: &str = "https://api.sunrise-sunset.org/";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite file backing the offline cache
    pub db_path: PathBuf,
    /// Root directory for locally stored images
    pub storage_dir: PathBuf,
    pub solar_api_url: String,
    pub refresh_interval: Duration,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sunseeker")
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            db_path: data_dir.join("sunseeker.db"),
            storage_dir: data_dir.join("storage"),
            solar_api_url: DEFAULT_SOLAR_API_URL.to_string(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(path) = env::var(DB_PATH_VAR) {
            config.db_path = PathBuf::from(path);
        }
        if let Ok(dir) = env::var(STORAGE_DIR_VAR) {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Ok(url) = env::var(SOLAR_API_URL_VAR) {
            config.solar_api_url = url;
        }
        if let Ok(secs) = env::var(REFRESH_INTERVAL_VAR) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                AppError::config(format!("{} must be a whole number of seconds, got '{}'", REFRESH_INTERVAL_VAR, secs))
            })?;
            config.refresh_interval = Duration::from_secs(secs);
        }

        validate_config(&config)?;
        Ok(config)
    }
}

/// Checks the values that would otherwise only fail on first use.
pub fn validate_config(config: &AppConfig) -> AppResult<()> {
    info!("Validating configuration (cache at {})", config.db_path.display());

    let url = Url::parse(&config.solar_api_url)
        .map_err(|e| AppError::config(format!("Invalid solar API URL '{}': {}", config.solar_api_url, e)))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(AppError::config(format!(
            "Solar API URL must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.refresh_interval.is_zero() {
        return Err(AppError::config("Refresh interval must be greater than zero"));
    }

    Ok(())
}
