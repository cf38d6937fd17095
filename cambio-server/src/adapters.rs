//! Implementations of the core's external seams for the running server.

use async_trait::async_trait;
use bytes::Bytes;
use cambio_core::entities::order::NewOrder;
use cambio_core::entities::proof::ProofFile;
use cambio_core::ports::{ExternalError, OrderService, RateProvider, RewardSubsystem};
use cambio_sdk::client::{OrderServiceClient, ProofUpload, RateClient};
use cambio_sdk::objects::{CreateOrderRequest, RateQuote};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;
use uuid::Uuid;

use crate::config::runtime::{AdsConfig, ServicesConfig};

pub struct HttpRateProvider {
    client: RateClient,
}

impl HttpRateProvider {
    pub fn new(services: &ServicesConfig) -> Self {
        Self {
            client: RateClient::new(services.rates_url.clone()),
        }
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn get_rates(&self) -> Result<Vec<RateQuote>, ExternalError> {
        self.client.get_rates().await.map_err(ExternalError::new)
    }
}

pub struct HttpOrderService {
    client: OrderServiceClient,
}

impl HttpOrderService {
    pub fn new(services: &ServicesConfig) -> Self {
        Self {
            client: OrderServiceClient::new(services.orders_url.clone(), services.api_key.clone()),
        }
    }
}

#[async_trait]
impl OrderService for HttpOrderService {
    async fn create_order(&self, order: &NewOrder) -> Result<Uuid, ExternalError> {
        self.client
            .create_order(&CreateOrderRequest::from(order))
            .await
            .map_err(ExternalError::new)
    }

    async fn upload_proof(&self, file: ProofFile) -> Result<Url, ExternalError> {
        self.client
            .upload_proof(ProofUpload {
                file_name: file.file_name,
                content_type: file.content_type,
                bytes: Bytes::from(file.bytes),
            })
            .await
            .map_err(ExternalError::new)
    }
}

/// In-process reward and interstitial bookkeeping.
///
/// A reward stays active from completion until the hand-off that used it
/// resets it. Interstitials are rate limited by a cooldown.
pub struct LocalRewardLedger {
    active: AtomicBool,
    interstitial_enabled: bool,
    cooldown: Duration,
    last_interstitial: Mutex<Option<Instant>>,
}

impl LocalRewardLedger {
    pub fn new(ads: &AdsConfig) -> Self {
        Self {
            active: AtomicBool::new(false),
            interstitial_enabled: ads.interstitial_enabled,
            cooldown: ads.interstitial_cooldown,
            last_interstitial: Mutex::new(None),
        }
    }

    fn last_interstitial(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.last_interstitial
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }
}

impl RewardSubsystem for LocalRewardLedger {
    fn has_active_reward(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn mark_reward_completed(&self) {
        self.active.store(true, Ordering::Release);
    }

    fn reset_reward_state(&self) {
        self.active.store(false, Ordering::Release);
    }

    fn can_show_interstitial(&self) -> bool {
        if !self.interstitial_enabled {
            return false;
        }
        match *self.last_interstitial() {
            Some(at) => at.elapsed() >= self.cooldown,
            None => true,
        }
    }

    fn show_interstitial(&self) {
        *self.last_interstitial() = Some(Instant::now());
        tracing::info!("Interstitial shown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(enabled: bool) -> LocalRewardLedger {
        LocalRewardLedger::new(&AdsConfig {
            interstitial_enabled: enabled,
            interstitial_cooldown: Duration::from_secs(180),
        })
    }

    #[test]
    fn test_reward_lifecycle() {
        let ledger = ledger(true);
        assert!(!ledger.has_active_reward());
        ledger.mark_reward_completed();
        assert!(ledger.has_active_reward());
        ledger.reset_reward_state();
        assert!(!ledger.has_active_reward());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interstitial_cooldown() {
        let ledger = ledger(true);
        assert!(ledger.can_show_interstitial());
        ledger.show_interstitial();
        assert!(!ledger.can_show_interstitial());

        tokio::time::advance(Duration::from_secs(180)).await;
        assert!(ledger.can_show_interstitial());
    }

    #[test]
    fn test_disabled_interstitials() {
        assert!(!ledger(false).can_show_interstitial());
    }
}
