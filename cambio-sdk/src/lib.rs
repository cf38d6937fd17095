//! Shared types for the Cambio checkout.
//!
//! `objects` holds the wire formats exchanged with the rate provider, the
//! order service and the checkout host API. The HTTP clients for the two
//! external services live behind the `client` feature.

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
