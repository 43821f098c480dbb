use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

/// Where the generation backend lives and how long to wait on it.
/// Generation proxies an LLM call, so the timeout is generous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl BackendConfig {
    /// Defaults, overridden by `casedeck.toml`, overridden by `CASEDECK_*`
    /// environment variables.
    pub fn load() -> Result<BackendConfig> {
        let config: BackendConfig = Figment::from(Serialized::defaults(BackendConfig::default()))
            .merge(Toml::file("casedeck.toml"))
            .merge(Env::prefixed("CASEDECK_"))
            .extract()
            .map_err(|e| AppError::ValidationError(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url).map_err(|_| {
            AppError::ValidationError(format!("Invalid backend base URL: {}", self.base_url))
        })?;
        Ok(())
    }
}
