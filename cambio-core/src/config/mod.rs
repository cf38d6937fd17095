//! Configuration types for the checkout engine.
//!
//! These types represent validated runtime configuration. Loading and
//! parsing the configuration file is handled by the server crate.

mod checkout;
mod handoff;
mod rates;

pub use checkout::{
    CheckoutConfig, DEFAULT_COUNTDOWN_SECONDS, DEFAULT_IBAN_PREFIX, IBAN_LENGTH, MAX_PROOF_BYTES,
};
pub use handoff::HandoffConfig;
pub use rates::RatesConfig;
