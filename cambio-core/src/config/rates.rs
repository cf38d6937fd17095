//! Rate refresh configuration.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatesConfig {
    /// How often the rate provider is polled.
    pub refresh_interval: Duration,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(60),
        }
    }
}
