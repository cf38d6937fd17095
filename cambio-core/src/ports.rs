//! Seams to the collaborators the checkout does not own.
//!
//! The server crate provides HTTP-backed implementations; tests use
//! in-memory fakes.

use async_trait::async_trait;
use cambio_sdk::objects::RateQuote;
use url::Url;
use uuid::Uuid;

use crate::entities::order::NewOrder;
use crate::entities::proof::ProofFile;

/// Failure reported by an external service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ExternalError(pub String);

impl ExternalError {
    pub fn new(message: impl std::fmt::Display) -> Self {
        Self(message.to_string())
    }
}

/// Source of current buy/sell quotes. Eventually consistent.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn get_rates(&self) -> Result<Vec<RateQuote>, ExternalError>;
}

/// Durable order and proof-file storage.
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn create_order(&self, order: &NewOrder) -> Result<Uuid, ExternalError>;
    async fn upload_proof(&self, file: ProofFile) -> Result<Url, ExternalError>;
}

/// Ad and reward bookkeeping of the host.
pub trait RewardSubsystem: Send + Sync {
    fn has_active_reward(&self) -> bool;
    fn mark_reward_completed(&self);
    fn reset_reward_state(&self);
    fn can_show_interstitial(&self) -> bool;
    fn show_interstitial(&self);
}
