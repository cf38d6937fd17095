//! `RateBoard` publishes the latest [`RateSnapshot`] to every checkout.
//!
//! Snapshots are immutable and handed out as `Arc`s: publishing a new one
//! never disturbs a checkout that is still holding the previous snapshot.
//! Subscribers can `await` the next publication through a `watch`
//! receiver.

use std::sync::Arc;
use tokio::sync::watch;

use crate::entities::Currency;
use crate::entities::rate::{RateSnapshot, RateUnavailable};

/// Currencies every snapshot is expected to quote.
const QUOTED: [Currency; 2] = [Currency::Usd, Currency::Eur];

#[derive(Clone)]
pub struct RateBoard {
    tx: Arc<watch::Sender<Arc<RateSnapshot>>>,
}

impl RateBoard {
    pub fn new(initial: RateSnapshot) -> Self {
        let (tx, _) = watch::channel(Arc::new(initial));
        Self { tx: Arc::new(tx) }
    }

    /// The snapshot available right now.
    pub fn current(&self) -> Arc<RateSnapshot> {
        self.tx.borrow().clone()
    }

    /// Replace the current snapshot and notify subscribers.
    pub fn publish(&self, snapshot: RateSnapshot) {
        self.tx.send_replace(Arc::new(snapshot));
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<RateSnapshot>> {
        self.tx.subscribe()
    }

    /// Currencies without a usable quote in the current snapshot.
    ///
    /// A non-empty result is surfaced as a system-wide alert; it clears by
    /// itself once a valid snapshot is published.
    pub fn alerts(&self) -> Vec<RateUnavailable> {
        let current = self.current();
        QUOTED
            .iter()
            .filter_map(|c| current.valid_quote(*c).err())
            .collect()
    }

    pub fn alert_for(&self, currency: Currency) -> Option<RateUnavailable> {
        self.current().valid_quote(currency).err()
    }
}

impl Default for RateBoard {
    fn default() -> Self {
        Self::new(RateSnapshot::empty())
    }
}
