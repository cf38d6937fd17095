//! Checkout flow configuration.

use std::time::Duration;

/// Length of rate guarantee, in seconds.
pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 15 * 60;

/// Required IBAN length.
pub const IBAN_LENGTH: usize = 25;

/// Country and check digit prefix every accepted IBAN starts with.
pub const DEFAULT_IBAN_PREFIX: &str = "AO06";

/// Largest accepted proof-of-payment file.
pub const MAX_PROOF_BYTES: usize = 5 * 1024 * 1024;

/// Checkout flow configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Initial value of the rate guarantee countdown.
    pub countdown_seconds: u32,
    /// Persisted sessions older than this are discarded on recovery.
    pub session_ttl: time::Duration,
    /// Fixed four-character IBAN prefix.
    pub iban_prefix: String,
    /// Delay between a successful submission and the interstitial.
    pub interstitial_delay: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            session_ttl: time::Duration::hours(24),
            iban_prefix: DEFAULT_IBAN_PREFIX.to_string(),
            interstitial_delay: Duration::from_millis(1500),
        }
    }
}
