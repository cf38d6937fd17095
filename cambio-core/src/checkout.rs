//! One open checkout and everything running on its behalf.
//!
//! [`Checkout`] owns the state machine, the countdown task, the order
//! submitter and the reward gate. All user actions go through it; no
//! error it returns is fatal to the host.

use kanau::processor::Processor;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use cambio_sdk::objects::FormPatch;

use crate::clock::Clock;
use crate::config::{CheckoutConfig, HandoffConfig};
use crate::entities::form::FieldError;
use crate::entities::proof::{ProofFile, UploadError};
use crate::entities::rate::RateUnavailable;
use crate::entities::reward::RewardState;
use crate::entities::session::{CheckoutSession, Step, TradeRequest};
use crate::handoff::{HandoffDraft, HandoffLink, HandoffLinkBuilder, HandoffReference};
use crate::ports::{ExternalError, OrderService, RewardSubsystem};
use crate::processors::{
    Countdown, FinalizeError, FinalizeOrder, GateDecision, OrderSubmitter, RewardGate,
    RewardGateError,
};
use crate::rates::RateBoard;
use crate::state_machine::{CheckoutStateMachine, Retreat, SharedStateMachine, TransitionError};
use crate::store::SessionStore;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Finalize(#[from] FinalizeError),

    #[error(transparent)]
    Reward(#[from] RewardGateError),
}

/// Collaborators shared by every checkout of the host.
#[derive(Clone)]
pub struct CheckoutDeps {
    pub store: Arc<dyn SessionStore>,
    pub clock: Arc<dyn Clock>,
    pub orders: Arc<dyn OrderService>,
    pub rewards: Arc<dyn RewardSubsystem>,
    pub rates: RateBoard,
    pub config: CheckoutConfig,
    pub handoff: HandoffConfig,
}

/// What the host renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutView {
    pub session: CheckoutSession,
    pub closed: bool,
    pub show_errors: bool,
    pub field_errors: Vec<FieldError>,
    pub warn_before_unload: bool,
    pub rate_alert: Option<RateUnavailable>,
    pub reward_pending: bool,
}

#[derive(Debug)]
pub enum FinalizeOutcome {
    /// Order registered and the hand-off released right away.
    Released { order_id: Uuid, link: HandoffLink },
    /// Order registered; the hand-off waits for the reward interaction.
    Deferred { order_id: Uuid },
    /// The order service failed. The link carries a manual reference and
    /// the checkout stays open so the user can retry.
    ManualFallback {
        link: HandoffLink,
        reason: ExternalError,
    },
}

pub struct Checkout {
    machine: SharedStateMachine,
    submitter: OrderSubmitter,
    gate: Mutex<RewardGate>,
    builder: HandoffLinkBuilder,
    orders: Arc<dyn OrderService>,
    rates: RateBoard,
    clock: Arc<dyn Clock>,
    shutdown_tx: watch::Sender<bool>,
    countdown: Mutex<Option<JoinHandle<()>>>,
}

impl Checkout {
    /// Open a new checkout and start its countdown.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(trade: TradeRequest, deps: &CheckoutDeps) -> Self {
        let machine = CheckoutStateMachine::open(
            trade,
            &deps.config,
            deps.store.clone(),
            deps.clock.now(),
        );
        Self::start(machine, deps)
    }

    /// Continue a recovered session, countdown included.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn resume(session: CheckoutSession, deps: &CheckoutDeps) -> Self {
        let machine = CheckoutStateMachine::resume(session, &deps.config, deps.store.clone());
        Self::start(machine, deps)
    }

    fn start(machine: CheckoutStateMachine, deps: &CheckoutDeps) -> Self {
        let machine = machine.into_shared();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let countdown = Countdown::new(machine.clone()).spawn(shutdown_rx);
        let builder = HandoffLinkBuilder::new(&deps.handoff);

        Self {
            machine,
            submitter: OrderSubmitter::new(
                deps.orders.clone(),
                deps.rewards.clone(),
                deps.config.iban_prefix.clone(),
                deps.config.interstitial_delay,
            ),
            gate: Mutex::new(RewardGate::new(deps.rewards.clone(), builder.clone())),
            builder,
            orders: deps.orders.clone(),
            rates: deps.rates.clone(),
            clock: deps.clock.clone(),
            shutdown_tx,
            countdown: Mutex::new(Some(countdown)),
        }
    }

    fn machine(&self) -> MutexGuard<'_, CheckoutStateMachine> {
        self.machine.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn gate(&self) -> MutexGuard<'_, RewardGate> {
        self.gate.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn view(&self) -> CheckoutView {
        let machine = self.machine();
        let session = machine.session().clone();
        let rate_alert = self.rates.alert_for(session.trade.currency);
        CheckoutView {
            closed: machine.is_closed(),
            show_errors: machine.show_errors(),
            field_errors: machine.field_errors().to_vec(),
            warn_before_unload: machine.warn_before_unload(),
            rate_alert,
            reward_pending: self.gate().is_pending(),
            session,
        }
    }

    pub fn update_form(&self, patch: FormPatch) -> Result<(), CheckoutError> {
        Ok(self.machine().update_form(patch)?)
    }

    pub fn advance(&self) -> Result<Step, CheckoutError> {
        let rates = self.rates.current();
        Ok(self.machine().advance(&rates)?)
    }

    pub fn retreat(&self) -> Result<Retreat, CheckoutError> {
        let retreat = self.machine().retreat()?;
        if retreat == Retreat::Closed {
            self.stop_countdown();
        }
        Ok(retreat)
    }

    pub fn go_to(&self, step: Step) -> Result<(), CheckoutError> {
        Ok(self.machine().go_to(step)?)
    }

    /// Close without finalizing. The stored session stays available for
    /// recovery.
    pub fn close(&self) {
        self.machine().close();
        self.stop_countdown();
    }

    /// Validate, upload and attach a proof of payment.
    pub async fn upload_proof(&self, file: ProofFile) -> Result<Url, CheckoutError> {
        {
            let machine = self.machine();
            machine.ensure_open()?;
            machine.require_step(Step::Payment)?;
        }
        let kind = file.validate()?;
        let size = file.bytes.len();
        let url = self
            .orders
            .upload_proof(file)
            .await
            .map_err(|e| UploadError::UploadFailed(e.to_string()))?;
        info!(%url, kind = kind.mime(), size, "Proof of payment uploaded");

        self.machine().attach_proof(url.to_string())?;
        Ok(url)
    }

    /// Register the order and run the reward gate.
    pub async fn finalize(&self) -> Result<FinalizeOutcome, CheckoutError> {
        let rates = self.rates.current();
        let session = self.machine().ensure_finalizable(&rates)?;

        match self.submitter.process(FinalizeOrder { session, rates }).await {
            Ok(receipt) => {
                self.machine().complete();
                self.stop_countdown();
                let order_id = receipt.order_id;
                let draft = HandoffDraft::new(HandoffReference::Order(order_id), receipt.order);
                Ok(match self.gate().decide(draft) {
                    GateDecision::Released(link) => FinalizeOutcome::Released { order_id, link },
                    GateDecision::Deferred => FinalizeOutcome::Deferred { order_id },
                })
            }
            Err(FinalizeError::SubmissionFailed { order, reason }) => {
                let draft = HandoffDraft::new(HandoffReference::fallback(self.clock.now()), *order);
                let link = self.builder.build(&draft, RewardState::default());
                warn!(
                    reference = %link.reference,
                    error = %reason,
                    "Offering manual hand-off after failed submission"
                );
                Ok(FinalizeOutcome::ManualFallback { link, reason })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The reward interaction completed. Use the returned state with
    /// [`Checkout::release_handoff`].
    pub fn complete_reward(&self) -> Result<RewardState, CheckoutError> {
        Ok(self.gate().complete_reward()?)
    }

    /// Earn the reward and release the waiting hand-off in one step.
    pub fn complete_reward_and_release(&self) -> Result<HandoffLink, CheckoutError> {
        Ok(self.gate().complete_and_release()?)
    }

    pub fn release_handoff(&self, state: RewardState) -> Result<HandoffLink, CheckoutError> {
        Ok(self.gate().release(state)?)
    }

    pub fn skip_reward(&self) -> Result<HandoffLink, CheckoutError> {
        Ok(self.gate().skip_reward()?)
    }

    fn stop_countdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Stop the countdown and wait for it to exit.
    pub async fn shutdown(&self) {
        self.stop_countdown();
        let handle = self
            .countdown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(handle) = handle else {
            return;
        };
        if let Err(e) = handle.await {
            warn!(error = %e, "Countdown task ended abnormally");
        }
    }
}

impl Drop for Checkout {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}
