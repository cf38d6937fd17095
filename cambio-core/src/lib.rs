#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod checkout;
pub mod clock;
pub mod config;
pub mod entities;
pub mod handoff;
pub mod ports;
pub mod processors;
pub mod rates;
pub mod state_machine;
pub mod store;
pub mod utils;
