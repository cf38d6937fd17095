//! Messaging hand-off configuration.

use url::Url;

/// Where completed orders are routed for human fulfillment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffConfig {
    /// Fixed routing target, e.g. `https://wa.me/244923000000`.
    pub target: Url,
}

impl HandoffConfig {
    pub fn new(target: Url) -> Self {
        Self { target }
    }
}
