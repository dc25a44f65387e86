use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "venture_lens.toml";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LOG_LEVEL: &str = "venture_lens=info";

/// Main configuration structure loaded from venture_lens.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub valuation: ValuationConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Chat-completion provider settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub model: String,
    pub base_url: String,
    /// Only ever read from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// JSON object of lowercase region name to multiplier. Built-in table when unset.
    pub region_risk_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn load_from_env() -> Self {
        let mut config = Self::default();
        if let Ok(level) = std::env::var("VENTURE_LENS_LOG")
            && !level.trim().is_empty()
        {
            config.log_level = level;
        }
        config
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses VENTURE_LENS_CONFIG environment variable or defaults to "venture_lens.toml"
    pub fn load() -> anyhow::Result<Self> {
        // VENTURE_LENS_ENV_FILE wins over ./.env
        if let Ok(env_path) = std::env::var("VENTURE_LENS_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let config_path = std::env::var("VENTURE_LENS_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            Self::from_toml_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Env-first: anything set in the environment replaces the file value.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY")
            && !key.trim().is_empty()
        {
            self.model.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("VENTURE_LENS_MODEL") {
            tracing::debug!("VENTURE_LENS_MODEL env override applied");
            self.model.model = model;
        }
        if let Ok(base_url) = std::env::var("VENTURE_LENS_BASE_URL") {
            tracing::debug!("VENTURE_LENS_BASE_URL env override applied");
            self.model.base_url = base_url;
        }
        if let Ok(path) = std::env::var("VENTURE_LENS_REGION_RISK_FILE") {
            tracing::debug!("VENTURE_LENS_REGION_RISK_FILE env override applied");
            self.valuation.region_risk_file = Some(PathBuf::from(path));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.model.model.trim().is_empty() {
            anyhow::bail!("model name must not be empty");
        }
        if !self.model.base_url.starts_with("http://")
            && !self.model.base_url.starts_with("https://")
        {
            anyhow::bail!(
                "base_url '{}' must start with http:// or https://",
                self.model.base_url
            );
        }
        if self.model.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set; requests will be sent without credentials");
        }
        Ok(())
    }
}
