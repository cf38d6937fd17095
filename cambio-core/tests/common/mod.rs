#![allow(dead_code)]

use async_trait::async_trait;
use cambio_core::checkout::CheckoutDeps;
use cambio_core::clock::ManualClock;
use cambio_core::config::{CheckoutConfig, HandoffConfig};
use cambio_core::entities::order::NewOrder;
use cambio_core::entities::proof::ProofFile;
use cambio_core::entities::rate::RateSnapshot;
use cambio_core::ports::{ExternalError, OrderService, RewardSubsystem};
use cambio_core::rates::RateBoard;
use cambio_core::store::InMemorySessionStore;
use cambio_sdk::objects::{Currency, RateQuote};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use time::macros::datetime;
use url::Url;
use uuid::Uuid;

pub const VALID_IBAN: &str = "AO06000000000000000000000";

pub fn order_id() -> Uuid {
    Uuid::parse_str("0192f7a4-8c3e-7b21-9d4f-1a2b3c4d5e6f").unwrap()
}

#[derive(Default)]
pub struct FakeOrders {
    pub created: Mutex<Vec<NewOrder>>,
    pub uploads: Mutex<Vec<ProofFile>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl OrderService for FakeOrders {
    async fn create_order(&self, order: &NewOrder) -> Result<Uuid, ExternalError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ExternalError::new("503 Service Unavailable"));
        }
        self.created.lock().unwrap().push(order.clone());
        Ok(order_id())
    }

    async fn upload_proof(&self, file: ProofFile) -> Result<Url, ExternalError> {
        let url = Url::parse("https://files.example/proofs/")
            .unwrap()
            .join(&file.file_name)
            .unwrap();
        self.uploads.lock().unwrap().push(file);
        Ok(url)
    }
}

#[derive(Default)]
pub struct FakeRewards {
    pub active: AtomicBool,
    pub completed: AtomicUsize,
    pub resets: AtomicUsize,
}

impl RewardSubsystem for FakeRewards {
    fn has_active_reward(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
    fn mark_reward_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
    fn reset_reward_state(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
    fn can_show_interstitial(&self) -> bool {
        false
    }
    fn show_interstitial(&self) {}
}

pub fn usd_snapshot(informal_buy: Decimal, informal_sell: Decimal) -> RateSnapshot {
    RateSnapshot::new(
        vec![RateQuote {
            currency: Currency::Usd,
            formal_buy: dec!(830),
            formal_sell: dec!(835),
            informal_buy,
            informal_sell,
        }],
        datetime!(2026-03-01 12:00 UTC),
    )
}

pub struct Harness {
    pub deps: CheckoutDeps,
    pub store: InMemorySessionStore,
    pub clock: ManualClock,
    pub orders: Arc<FakeOrders>,
    pub rewards: Arc<FakeRewards>,
}

impl Harness {
    pub fn new() -> Self {
        let store = InMemorySessionStore::new();
        let clock = ManualClock::new(datetime!(2026-03-01 12:00 UTC));
        let orders = Arc::new(FakeOrders::default());
        let rewards = Arc::new(FakeRewards::default());
        let deps = CheckoutDeps {
            store: Arc::new(store.clone()),
            clock: Arc::new(clock.clone()),
            orders: orders.clone(),
            rewards: rewards.clone(),
            rates: RateBoard::new(usd_snapshot(dec!(930), dec!(950))),
            config: CheckoutConfig::default(),
            handoff: HandoffConfig::new(Url::parse("https://wa.me/244923000000").unwrap()),
        };
        Self {
            deps,
            store,
            clock,
            orders,
            rewards,
        }
    }
}
