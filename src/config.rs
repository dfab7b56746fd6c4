use crate::errors::{QuoteError, Result};
use log::debug;
use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

/// Alpha Vantage's public key; only answers for a handful of sample tickers.
pub const DEMO_API_KEY: &str = "demo";

pub const ENV_API_KEY: &str = "MARKETVIEW_API_KEY";
pub const ENV_BASE_URL: &str = "MARKETVIEW_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "MARKETVIEW_TIMEOUT_SECS";

/// Runtime settings, loaded once at startup and copied into the provider.
///
/// The API key is redacted from `Debug` and never logged.
#[derive(Clone)]
pub struct Config {
    api_key: String,
    pub base_url: String,
    pub request_timeout: Option<Duration>,
    pub color: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_key: DEMO_API_KEY.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
            color: true,
        }
    }

    /// Loads `.env` from the working directory (if any), then the environment.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_env()
    }

    /// Like [`Config::load`] with an explicit env file, which must exist.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        dotenv::from_path(path)
            .map_err(|e| QuoteError::ConfigError(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_env()
    }

    /// Reads `MARKETVIEW_*` variables on top of the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();

        if let Ok(key) = env::var(ENV_API_KEY) {
            if !key.trim().is_empty() {
                config = config.with_api_key(key.trim());
            }
        }

        if let Ok(url) = env::var(ENV_BASE_URL) {
            config = config.with_base_url(&url);
        }

        if let Ok(secs) = env::var(ENV_TIMEOUT_SECS) {
            config = config.with_timeout_secs(&secs)?;
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = key.to_string();
        self
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_timeout_secs(self, secs: &str) -> Result<Self> {
        let secs = secs
            .trim()
            .parse::<u64>()
            .map_err(|e| QuoteError::ConfigError(format!("invalid timeout '{}': {}", secs, e)))?;
        Ok(self.with_request_timeout(Some(Duration::from_secs(secs))))
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn uses_demo_key(&self) -> bool {
        self.api_key == DEMO_API_KEY
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("color", &self.color)
            .finish()
    }
}
