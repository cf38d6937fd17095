//! Configuration module for cambio-server.
//!
//! Handles loading configuration from TOML files and CLI arguments, and
//! validating it into a [`RuntimeConfig`].

pub mod file;
pub mod runtime;

use crate::config::file::FileConfig;
use crate::config::runtime::{
    AdsConfig, CheckoutConfig, HandoffConfig, RatesConfig, RuntimeConfig, ServerConfig,
    ServicesConfig,
};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Read the TOML file, apply CLI overrides and validate.
    pub fn load(&self) -> Result<RuntimeConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        build_runtime_config(file_config)
    }
}

fn build_runtime_config(file: FileConfig) -> Result<RuntimeConfig, ConfigError> {
    let checkout = &file.checkout;
    if checkout.countdown_seconds == 0 {
        return Err(ConfigError::ValidationError(
            "checkout.countdown_seconds must be greater than zero".to_string(),
        ));
    }
    if checkout.session_ttl_hours == 0 {
        return Err(ConfigError::ValidationError(
            "checkout.session_ttl_hours must be greater than zero".to_string(),
        ));
    }
    let prefix = &checkout.iban_prefix;
    if prefix.len() != 4 || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::ValidationError(format!(
            "checkout.iban_prefix must be 4 ASCII letters or digits, got {prefix:?}"
        )));
    }
    if file.rates.refresh_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "rates.refresh_interval_secs must be greater than zero".to_string(),
        ));
    }

    let target = parse_http_url("handoff.target", &file.handoff.target)?;
    if target.query().is_some() || target.fragment().is_some() {
        return Err(ConfigError::ValidationError(
            "handoff.target must not carry a query or fragment".to_string(),
        ));
    }

    Ok(RuntimeConfig {
        server: ServerConfig {
            listen: file.server.listen,
            session_dir: file.server.session_dir,
        },
        checkout: CheckoutConfig {
            countdown_seconds: checkout.countdown_seconds,
            session_ttl: time::Duration::hours(i64::from(checkout.session_ttl_hours)),
            iban_prefix: checkout.iban_prefix.clone(),
            interstitial_delay: Duration::from_millis(checkout.interstitial_delay_ms),
        },
        handoff: HandoffConfig::new(target),
        services: ServicesConfig {
            rates_url: base_url("services.rates_url", &file.services.rates_url)?,
            orders_url: base_url("services.orders_url", &file.services.orders_url)?,
            api_key: file.services.api_key.filter(|k| !k.trim().is_empty()),
        },
        rates: RatesConfig {
            refresh_interval: Duration::from_secs(file.rates.refresh_interval_secs),
        },
        ads: AdsConfig {
            interstitial_enabled: file.ads.interstitial_enabled,
            interstitial_cooldown: Duration::from_secs(file.ads.interstitial_cooldown_secs),
        },
    })
}

fn parse_http_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::ValidationError(format!("{field} is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::ValidationError(format!(
            "{field} must be an absolute http(s) URL"
        )));
    }
    Ok(url)
}

/// Parse a service root URL and make sure its path ends with `/`.
fn base_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = parse_http_url(field, value)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
