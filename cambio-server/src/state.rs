//! Application state shared across all request handlers.

use cambio_core::checkout::{Checkout, CheckoutDeps};
use cambio_core::entities::session::{CheckoutSession, TradeRequest};
use cambio_core::handoff::HandoffLinkBuilder;
use cambio_core::store::{Recovery, SessionStoreError, load_fresh};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
/// The host serves a single user agent, so at most one checkout is open.
#[derive(Clone)]
pub struct AppState {
    pub deps: CheckoutDeps,
    pub handoff: HandoffLinkBuilder,
    checkout: Arc<RwLock<Option<Arc<Checkout>>>>,
    auto_resumed: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(deps: CheckoutDeps) -> Self {
        Self {
            handoff: HandoffLinkBuilder::new(&deps.handoff),
            deps,
            checkout: Arc::new(RwLock::new(None)),
            auto_resumed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The current checkout, open or already finished.
    pub async fn checkout(&self) -> Option<Arc<Checkout>> {
        self.checkout.read().await.clone()
    }

    /// Replace the current checkout, stopping the previous one.
    async fn install(&self, checkout: Checkout) -> Arc<Checkout> {
        let checkout = Arc::new(checkout);
        let previous = self.checkout.write().await.replace(checkout.clone());
        if let Some(previous) = previous {
            previous.close();
            previous.shutdown().await;
        }
        checkout
    }

    pub async fn open(&self, trade: TradeRequest) -> Arc<Checkout> {
        self.auto_resumed.store(false, Ordering::Release);
        self.install(Checkout::open(trade, &self.deps)).await
    }

    pub async fn resume(&self, session: CheckoutSession) -> Arc<Checkout> {
        self.install(Checkout::resume(session, &self.deps)).await
    }

    /// Resume the stored session if it is still fresh.
    pub async fn resume_stored(&self) -> Result<Option<Arc<Checkout>>, SessionStoreError> {
        let session = load_fresh(
            self.deps.store.as_ref(),
            self.deps.clock.now(),
            self.deps.config.session_ttl,
        )?;
        match session {
            Some(session) => Ok(Some(self.resume(session).await)),
            None => Ok(None),
        }
    }

    /// Look at the stored session. A session left at the payment step is
    /// reopened right away.
    pub async fn inspect_recovery(&self) -> Result<Recovery, SessionStoreError> {
        let recovery = Recovery::inspect(
            self.deps.store.as_ref(),
            self.deps.clock.as_ref(),
            self.deps.config.session_ttl,
        )?;
        if let Recovery::AutoResume(session) = &recovery {
            self.resume(session.clone()).await;
            self.auto_resumed.store(true, Ordering::Release);
        }
        Ok(recovery)
    }

    pub fn auto_resumed(&self) -> bool {
        self.auto_resumed.load(Ordering::Acquire)
    }

    /// Stop the current checkout, if any.
    pub async fn shutdown(&self) {
        if let Some(checkout) = self.checkout.write().await.take() {
            checkout.shutdown().await;
        }
    }
}
