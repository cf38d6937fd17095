//! TOML file configuration structures.
//!
//! These structs directly map to the `cambio-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    pub handoff: HandoffConfig,
    pub services: ServicesConfig,
    #[serde(default)]
    pub rates: RatesConfig,
    #[serde(default)]
    pub ads: AdsConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "127.0.0.1:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
    /// Directory holding the persisted checkout session.
    #[serde(default = "default_session_dir")]
    pub session_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            session_dir: default_session_dir(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 8080))
}

fn default_session_dir() -> PathBuf {
    PathBuf::from("./.cambio")
}

/// Checkout flow section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    pub countdown_seconds: u32,
    pub session_ttl_hours: u32,
    pub iban_prefix: String,
    pub interstitial_delay_ms: u64,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            countdown_seconds: 900,
            session_ttl_hours: 24,
            iban_prefix: "AO06".to_string(),
            interstitial_delay_ms: 1500,
        }
    }
}

/// Messaging hand-off section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffConfig {
    /// Fixed routing target, e.g. `https://wa.me/244923000000`.
    pub target: String,
}

/// External services section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Root URL of the rate provider.
    pub rates_url: String,
    /// Root URL of the order service.
    pub orders_url: String,
    /// Bearer token for the order service.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Rate polling section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    pub refresh_interval_secs: u64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 60,
        }
    }
}

/// Ad and reward section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdsConfig {
    pub interstitial_enabled: bool,
    /// Minimum time between two interstitials.
    pub interstitial_cooldown_secs: u64,
}

impl Default for AdsConfig {
    fn default() -> Self {
        Self {
            interstitial_enabled: true,
            interstitial_cooldown_secs: 180,
        }
    }
}
