//! Checkout step progression and the rate guarantee countdown.
//!
//! ```text
//!  open ──► Step 1 (data) ──advance──► Step 2 (terms) ──advance──► Step 3 (payment)
//!              │   ▲                      │   ▲                        │
//!           retreat └──────retreat────────┘   └────────retreat─────────┘
//!              ▼
//!           Closed ◄── close() / complete() from any step
//! ```
//!
//! Forward moves only happen through [`CheckoutStateMachine::advance`],
//! which checks the gate of the current step and the validity of the
//! current rate quote. Backward moves are free but only to steps already
//! completed. Every user-driven mutation is written to the
//! [`SessionStore`] before the call returns. Countdown ticks only bump the
//! revision; the countdown task writes them through [`PendingSave`] after
//! releasing the lock. Once closed, the machine refuses all mutation and
//! writes nothing.

use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::config::CheckoutConfig;
use crate::entities::form::FieldError;
use crate::entities::rate::{RateSnapshot, RateUnavailable};
use crate::entities::session::{CheckoutSession, Step, TradeRequest};
use crate::store::{PendingSave, SessionStore, SessionWriter};
use cambio_sdk::objects::FormPatch;

/// A state machine shared between the host and the countdown task.
pub type SharedStateMachine = Arc<Mutex<CheckoutStateMachine>>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("checkout is closed")]
    Closed,

    #[error("step 1 has invalid fields: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("terms and rate guarantee must both be accepted")]
    TermsNotAccepted,

    #[error(transparent)]
    RateUnavailable(#[from] RateUnavailable),

    #[error("the payment step has no forward transition")]
    NoForwardStep,

    #[error("cannot navigate from step {from} to step {to}")]
    NotBackward { from: Step, to: Step },

    #[error("only allowed at step {expected}, checkout is at step {actual}")]
    WrongStep { expected: Step, actual: Step },
}

/// Result of a successful [`CheckoutStateMachine::retreat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retreat {
    To(Step),
    Closed,
}

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running(u32),
    /// This tick brought the countdown to zero.
    Expired,
    /// Already at zero; nothing changed.
    AlreadyExpired,
}

pub struct CheckoutStateMachine {
    session: CheckoutSession,
    closed: bool,
    show_errors: bool,
    field_errors: Vec<FieldError>,
    iban_prefix: String,
    writer: SessionWriter,
    revision: u64,
}

impl CheckoutStateMachine {
    /// Start a new checkout at step 1 with a full countdown.
    pub fn open(
        trade: TradeRequest,
        config: &CheckoutConfig,
        store: Arc<dyn SessionStore>,
        now: time::OffsetDateTime,
    ) -> Self {
        let session = CheckoutSession::new(trade, config.countdown_seconds, now);
        info!(
            direction = %session.trade.direction,
            currency = %session.trade.currency,
            seconds_remaining = session.seconds_remaining,
            "Checkout opened"
        );
        let mut machine = Self::with_session(session, config, store);
        machine.persist();
        machine
    }

    /// Continue a recovered session where it left off.
    pub fn resume(
        session: CheckoutSession,
        config: &CheckoutConfig,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        info!(
            step = %session.step,
            seconds_remaining = session.seconds_remaining,
            "Checkout resumed"
        );
        Self::with_session(session, config, store)
    }

    fn with_session(
        session: CheckoutSession,
        config: &CheckoutConfig,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            session,
            closed: false,
            show_errors: false,
            field_errors: Vec::new(),
            iban_prefix: config.iban_prefix.clone(),
            writer: SessionWriter::new(store),
            revision: 0,
        }
    }

    pub fn into_shared(self) -> SharedStateMachine {
        Arc::new(Mutex::new(self))
    }

    pub fn session(&self) -> &CheckoutSession {
        &self.session
    }

    pub fn step(&self) -> Step {
        self.session.step
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn show_errors(&self) -> bool {
        self.show_errors
    }

    /// Inline field errors, populated once an advance from step 1 failed.
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// The host must warn before navigation or close while payment is
    /// pending.
    pub fn warn_before_unload(&self) -> bool {
        !self.closed && self.session.step == Step::Payment
    }

    pub fn ensure_open(&self) -> Result<(), TransitionError> {
        if self.closed {
            Err(TransitionError::Closed)
        } else {
            Ok(())
        }
    }

    fn persist(&mut self) {
        self.revision += 1;
        if let Err(e) = self.writer.save(self.revision, &self.session) {
            warn!(error = %e, step = %self.session.step, "Failed to persist checkout session");
        }
    }

    fn step1_errors(&self) -> Vec<FieldError> {
        self.session
            .form
            .step1_errors(self.session.trade.direction, &self.iban_prefix)
    }

    /// Apply user input to the form.
    pub fn update_form(&mut self, patch: FormPatch) -> Result<(), TransitionError> {
        self.ensure_open()?;
        self.session.form.apply(patch);
        if self.show_errors {
            self.field_errors = self.step1_errors();
        }
        self.persist();
        Ok(())
    }

    /// Move one step forward if the current step's gate passes.
    pub fn advance(&mut self, rates: &RateSnapshot) -> Result<Step, TransitionError> {
        self.ensure_open()?;
        let from = self.session.step;
        match from {
            Step::Data => {
                let errors = self.step1_errors();
                if !errors.is_empty() {
                    debug!(?errors, "Step 1 gate failed");
                    self.show_errors = true;
                    self.field_errors = errors.clone();
                    return Err(TransitionError::Validation(errors));
                }
                self.show_errors = false;
                self.field_errors.clear();
            }
            Step::Terms => {
                if !self.session.form.terms_complete() {
                    return Err(TransitionError::TermsNotAccepted);
                }
            }
            Step::Payment => return Err(TransitionError::NoForwardStep),
        }
        rates.valid_quote(self.session.trade.currency)?;

        let to = from.next().ok_or(TransitionError::NoForwardStep)?;
        self.session.step = to;
        info!(%from, %to, "Checkout advanced");
        self.persist();
        Ok(to)
    }

    /// Go back one step, or close the checkout from step 1.
    pub fn retreat(&mut self) -> Result<Retreat, TransitionError> {
        self.ensure_open()?;
        match self.session.step.previous() {
            Some(to) => {
                self.session.step = to;
                debug!(%to, "Checkout retreated");
                self.persist();
                Ok(Retreat::To(to))
            }
            None => {
                self.close();
                Ok(Retreat::Closed)
            }
        }
    }

    /// Jump back to an already completed step.
    pub fn go_to(&mut self, to: Step) -> Result<(), TransitionError> {
        self.ensure_open()?;
        let from = self.session.step;
        if to >= from {
            return Err(TransitionError::NotBackward { from, to });
        }
        self.session.step = to;
        self.persist();
        Ok(())
    }

    /// Record the uploaded proof of payment.
    pub fn attach_proof(&mut self, reference: String) -> Result<(), TransitionError> {
        self.ensure_open()?;
        self.require_step(Step::Payment)?;
        self.session.form.proof_reference = Some(reference);
        self.persist();
        Ok(())
    }

    pub fn require_step(&self, expected: Step) -> Result<(), TransitionError> {
        let actual = self.session.step;
        if actual != expected {
            return Err(TransitionError::WrongStep { expected, actual });
        }
        Ok(())
    }

    /// One second of the rate guarantee elapsed.
    ///
    /// Clamps at zero. Expiry is advisory and never blocks progression.
    /// Nothing is written here; take [`Self::pending_save`] for that.
    pub fn tick(&mut self) -> Result<Tick, TransitionError> {
        self.ensure_open()?;
        if self.session.seconds_remaining == 0 {
            return Ok(Tick::AlreadyExpired);
        }
        self.session.seconds_remaining -= 1;
        let tick = if self.session.seconds_remaining == 0 {
            self.session.expired = true;
            info!("Rate guarantee expired");
            Tick::Expired
        } else {
            Tick::Running(self.session.seconds_remaining)
        };
        self.revision += 1;
        Ok(tick)
    }

    /// Snapshot of the current session, to be written without the lock.
    pub fn pending_save(&self) -> PendingSave {
        PendingSave::new(self.writer.clone(), self.revision, self.session.clone())
    }

    /// Snapshot of the session for finalize.
    ///
    /// Only allowed at the payment step and while the current quote for the
    /// trade currency is valid.
    pub fn ensure_finalizable(
        &self,
        rates: &RateSnapshot,
    ) -> Result<CheckoutSession, TransitionError> {
        self.ensure_open()?;
        self.require_step(Step::Payment)?;
        rates.valid_quote(self.session.trade.currency)?;
        Ok(self.session.clone())
    }

    /// Close without finalizing. The persisted copy is kept for recovery.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            info!(step = %self.session.step, "Checkout closed");
        }
    }

    /// Close after a successful finalize and forget the persisted copy.
    pub fn complete(&mut self) {
        self.closed = true;
        if let Err(e) = self.writer.clear() {
            warn!(error = %e, "Failed to clear checkout session after finalize");
        }
        info!("Checkout completed");
    }
}
