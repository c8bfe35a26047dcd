//! Application configuration for quotelane.
//!
//! User config lives at `~/.quotelane/quotelane.toml`.
//! Environment variables override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QuotelaneError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "quotelane.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".quotelane";

/// Env var for the backend content API base URL.
pub const ENV_API_BASE_URL: &str = "QUOTELANE_API_BASE_URL";

/// Env var for the public site URL (used when building share links).
pub const ENV_SITE_URL: &str = "QUOTELANE_SITE_URL";

/// Env var for the public site name.
pub const ENV_SITE_NAME: &str = "QUOTELANE_SITE_NAME";

// ---------------------------------------------------------------------------
// SiteConfig (matching quotelane.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the backend content API. Required for every network command.
    #[serde(default)]
    pub api_base_url: String,

    /// Public site URL, used for share links and canonical references.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Public site name.
    #[serde(default = "default_site_name")]
    pub site_name: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            site_url: default_site_url(),
            site_name: default_site_name(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_site_url() -> String {
    "http://localhost:3000".into()
}
fn default_site_name() -> String {
    "Quotelane".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl SiteConfig {
    /// Apply environment variable overrides on top of the loaded config.
    pub fn apply_env(mut self) -> Self {
        if let Ok(val) = std::env::var(ENV_API_BASE_URL) {
            if !val.is_empty() {
                self.api_base_url = val;
            }
        }
        if let Ok(val) = std::env::var(ENV_SITE_URL) {
            if !val.is_empty() {
                self.site_url = val;
            }
        }
        if let Ok(val) = std::env::var(ENV_SITE_NAME) {
            if !val.is_empty() {
                self.site_name = val;
            }
        }
        self
    }

    /// Check that the API base URL is present and well-formed.
    ///
    /// Absence of the base URL is a fatal startup condition: every command
    /// that talks to the backend calls this before issuing a request.
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(QuotelaneError::config(format!(
                "backend API base URL is not configured. Set {ENV_API_BASE_URL} \
                 or add api_base_url to {CONFIG_FILE_NAME}."
            )));
        }
        url::Url::parse(&self.api_base_url).map_err(|e| {
            QuotelaneError::config(format!(
                "invalid api_base_url '{}': {e}",
                self.api_base_url
            ))
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.quotelane/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| QuotelaneError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.quotelane/quotelane.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk and apply env overrides.
/// Returns defaults (plus env) if the file does not exist.
pub fn load_config() -> Result<SiteConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(SiteConfig::default().apply_env());
    }

    Ok(load_config_from(&path)?.apply_env())
}

/// Load the application config from a specific file path (no env overrides).
pub fn load_config_from(path: &Path) -> Result<SiteConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        QuotelaneError::config(format!("failed to read {}: {e}", path.display()))
    })?;

    toml::from_str(&content).map_err(|e| {
        QuotelaneError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)
        .map_err(|e| QuotelaneError::config(format!("create {}: {e}", dir.display())))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = SiteConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| QuotelaneError::config(e.to_string()))?;

    std::fs::write(&path, content)
        .map_err(|e| QuotelaneError::config(format!("write {}: {e}", path.display())))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = SiteConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("api_base_url"));
        assert!(toml_str.contains("site_name"));
    }

    #[test]
    fn config_roundtrip() {
        let config = SiteConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: SiteConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.timeout_secs, 30);
        assert_eq!(parsed.site_name, "Quotelane");
    }

    #[test]
    fn missing_base_url_is_fatal() {
        let config = SiteConfig::default();
        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("base URL is not configured")
        );
    }

    #[test]
    fn malformed_base_url_is_fatal() {
        let config = SiteConfig {
            api_base_url: "not a url".into(),
            ..SiteConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn valid_base_url_passes() {
        let config = SiteConfig {
            api_base_url: "https://api.quotelane.example".into(),
            ..SiteConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: SiteConfig =
            toml::from_str(r#"api_base_url = "https://api.example.com""#).expect("parse");
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.site_url, "http://localhost:3000");
        assert_eq!(config.timeout_secs, 30);
    }
}
