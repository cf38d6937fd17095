//! Validated configuration the server runs with.
//!
//! The checkout, hand-off and rate sections are the core's own config types.

pub use cambio_core::config::{CheckoutConfig, HandoffConfig, RatesConfig};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub session_dir: PathBuf,
}

/// Base URLs always end with `/` so endpoint paths join below them.
#[derive(Debug, Clone)]
pub struct ServicesConfig {
    pub rates_url: Url,
    pub orders_url: Url,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AdsConfig {
    pub interstitial_enabled: bool,
    pub interstitial_cooldown: Duration,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub server: ServerConfig,
    pub checkout: CheckoutConfig,
    pub handoff: HandoffConfig,
    pub services: ServicesConfig,
    pub rates: RatesConfig,
    pub ads: AdsConfig,
}
