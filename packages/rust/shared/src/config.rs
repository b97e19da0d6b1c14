//! Application configuration for PhoneSpec.
//!
//! User config lives at `~/.phonespec/phonespec.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PhoneSpecError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "phonespec.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".phonespec";

// ---------------------------------------------------------------------------
// Config structs (matching phonespec.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP fetch settings.
    #[serde(default)]
    pub fetch: FetchSection,

    /// Base URLs for spec sources and marketplaces.
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSection {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header sent with every request.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Maximum redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    15
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .into()
}
fn default_accept_language() -> String {
    "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7".into()
}
fn default_max_redirects() -> usize {
    5
}

/// `[sources]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Oficina da Net smartphone catalogue root.
    #[serde(default = "default_oficinadanet_base")]
    pub oficinadanet_base: String,

    /// Kimovil (Portuguese locale) root.
    #[serde(default = "default_kimovil_base")]
    pub kimovil_base: String,

    /// Kimovil device-name autocomplete JSON endpoint.
    #[serde(default = "default_kimovil_autocomplete_url")]
    pub kimovil_autocomplete_url: String,

    /// OLX phone category search root.
    #[serde(default = "default_olx_base")]
    pub olx_base: String,

    /// Amazon search root.
    #[serde(default = "default_amazon_base")]
    pub amazon_base: String,

    /// Mercado Livre new-phone listing root.
    #[serde(default = "default_mercadolivre_base")]
    pub mercadolivre_base: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            oficinadanet_base: default_oficinadanet_base(),
            kimovil_base: default_kimovil_base(),
            kimovil_autocomplete_url: default_kimovil_autocomplete_url(),
            olx_base: default_olx_base(),
            amazon_base: default_amazon_base(),
            mercadolivre_base: default_mercadolivre_base(),
        }
    }
}

fn default_oficinadanet_base() -> String {
    "https://www.oficinadanet.com.br/smartphones".into()
}
fn default_kimovil_base() -> String {
    "https://www.kimovil.com/pt".into()
}
fn default_kimovil_autocomplete_url() -> String {
    "https://www.kimovil.com/_json/autocomplete_devicemodels_joined.json".into()
}
fn default_olx_base() -> String {
    "https://www.olx.com.br/celulares".into()
}
fn default_amazon_base() -> String {
    "https://www.amazon.com.br/s".into()
}
fn default_mercadolivre_base() -> String {
    "https://lista.mercadolivre.com.br/celulares-smartphones/novo".into()
}

// ---------------------------------------------------------------------------
// Fetch config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime fetch configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header.
    pub user_agent: String,
    /// Accept-Language header.
    pub accept_language: String,
    /// Maximum redirects to follow.
    pub max_redirects: usize,
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.fetch.timeout_secs,
            user_agent: config.fetch.user_agent.clone(),
            accept_language: config.fetch.accept_language.clone(),
            max_redirects: config.fetch.max_redirects,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.phonespec/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PhoneSpecError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.phonespec/phonespec.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PhoneSpecError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        PhoneSpecError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PhoneSpecError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PhoneSpecError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PhoneSpecError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject settings that would make every fetch fail.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.fetch.timeout_secs == 0 {
        return Err(PhoneSpecError::config("fetch.timeout_secs must be greater than 0"));
    }
    if config.fetch.user_agent.trim().is_empty() {
        return Err(PhoneSpecError::config("fetch.user_agent must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("timeout_secs"));
        assert!(toml_str.contains("oficinadanet.com.br"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.fetch.timeout_secs, 15);
        assert_eq!(parsed.sources.kimovil_base, "https://www.kimovil.com/pt");
        assert!(parsed.sources.kimovil_autocomplete_url.ends_with("autocomplete_devicemodels_joined.json"));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[fetch]
timeout_secs = 30

[sources]
olx_base = "http://localhost:9999/celulares"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.fetch.max_redirects, 5);
        assert_eq!(config.sources.olx_base, "http://localhost:9999/celulares");
        assert!(config.sources.amazon_base.contains("amazon.com.br"));
    }

    #[test]
    fn fetch_config_from_app_config() {
        let app = AppConfig::default();
        let fetch = FetchConfig::from(&app);
        assert_eq!(fetch.timeout_secs, 15);
        assert_eq!(fetch.max_redirects, 5);
        assert!(fetch.accept_language.starts_with("pt-BR"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.fetch.timeout_secs = 0;
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout_secs"));
    }
}
