//! Application configuration management.
//!
//! This module handles loading and saving the client configuration, which
//! selects the deployment environment (and therefore the API base URL), the
//! session persistence strategy, and remembers the last used username.
//!
//! Configuration is stored at `~/.config/unichess/config.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::session::SessionStrategy;

/// Application name used for config/cache/data directory paths
const APP_NAME: &str = "unichess";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that selects the deployment environment
pub const ENV_VAR: &str = "UNICHESS_ENV";

/// API base URL for production deployments
pub const PRODUCTION_API_URL: &str = "https://unichess-api-62644c9d9bf1.herokuapp.com";

/// API base URL for local development
pub const DEVELOPMENT_API_URL: &str = "http://localhost:8000";

/// Cookie domain used outside production
const DEVELOPMENT_COOKIE_DOMAIN: &str = "localhost";

/// Deployment environment. Selects the API endpoint and cookie attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Parse an environment name. Anything other than "production" is development.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn api_url(&self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_API_URL,
            Environment::Development => DEVELOPMENT_API_URL,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub session_strategy: SessionStrategy,
    /// Cookie domain for production; defaults to the API host.
    pub cookie_domain: Option<String>,
    pub last_username: Option<String>,
}

impl Config {
    /// Load the config file (or defaults), then apply the environment override.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        if let Ok(name) = std::env::var(ENV_VAR) {
            config.environment = Environment::from_name(&name);
        }
        Ok(config)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Base URL of the backend API for the configured environment
    pub fn api_url(&self) -> &'static str {
        self.environment.api_url()
    }

    /// Domain attribute for the session cookie
    pub fn cookie_domain(&self) -> Result<String> {
        if !self.environment.is_production() {
            return Ok(DEVELOPMENT_COOKIE_DOMAIN.to_string());
        }
        if let Some(ref domain) = self.cookie_domain {
            return Ok(domain.clone());
        }
        host_of(self.api_url())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

/// Host portion of a URL, without scheme, userinfo, port or path.
fn host_of(url: &str) -> Result<String> {
    let parsed = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
    let host = parsed
        .host_str()
        .with_context(|| format!("URL has no host: {}", url))?;
    Ok(host.to_string())
}
