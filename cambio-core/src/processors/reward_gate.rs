//! RewardGate.
//!
//! Decides, once per finalize, whether the hand-off link is released right
//! away or held back behind a reward interaction. Earning and using a
//! reward are separate calls: [`RewardGate::complete_reward`] returns the
//! new [`RewardState`], which is then handed to [`RewardGate::release`].

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::entities::reward::RewardState;
use crate::handoff::{HandoffDraft, HandoffLink, HandoffLinkBuilder};
use crate::ports::RewardSubsystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RewardGateError {
    #[error("reward already earned in this checkout")]
    AlreadyEarned,
    #[error("no hand-off is waiting for release")]
    NothingPending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Released(HandoffLink),
    /// Waiting for the reward interaction to complete or be skipped.
    Deferred,
}

pub struct RewardGate {
    rewards: Arc<dyn RewardSubsystem>,
    builder: HandoffLinkBuilder,
    state: RewardState,
    pending: Option<HandoffDraft>,
}

impl RewardGate {
    pub fn new(rewards: Arc<dyn RewardSubsystem>, builder: HandoffLinkBuilder) -> Self {
        Self {
            rewards,
            builder,
            state: RewardState::default(),
            pending: None,
        }
    }

    pub fn state(&self) -> RewardState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release immediately if a reward is already earned, locally or in the
    /// host's reward subsystem. Otherwise keep `draft` until the reward
    /// interaction ends.
    pub fn decide(&mut self, draft: HandoffDraft) -> GateDecision {
        if !self.state.earned && self.rewards.has_active_reward() {
            debug!("Host reports an active reward");
            self.state = RewardState::EARNED;
        }
        self.pending = Some(draft);
        if self.state.earned {
            match self.release(self.state) {
                Ok(link) => GateDecision::Released(link),
                Err(_) => GateDecision::Deferred,
            }
        } else {
            info!("Hand-off deferred until the reward interaction ends");
            GateDecision::Deferred
        }
    }

    /// Record the reward as earned. Allowed once per checkout.
    pub fn complete_reward(&mut self) -> Result<RewardState, RewardGateError> {
        if self.state.earned {
            return Err(RewardGateError::AlreadyEarned);
        }
        self.state = RewardState::EARNED;
        self.rewards.mark_reward_completed();
        info!("Reward earned");
        Ok(self.state)
    }

    /// Earn the reward for the waiting hand-off and release it with
    /// priority. Nothing changes when no hand-off is waiting.
    pub fn complete_and_release(&mut self) -> Result<HandoffLink, RewardGateError> {
        if !self.is_pending() {
            return Err(RewardGateError::NothingPending);
        }
        let state = self.complete_reward()?;
        self.release(state)
    }

    /// Build the link for the pending draft with `state`, then reset the
    /// reward bookkeeping.
    pub fn release(&mut self, state: RewardState) -> Result<HandoffLink, RewardGateError> {
        let draft = self.pending.take().ok_or(RewardGateError::NothingPending)?;
        let link = self.builder.build(&draft, state);
        info!(
            reference = %link.reference,
            priority = link.priority,
            "Hand-off released"
        );
        self.state = RewardState::default();
        self.rewards.reset_reward_state();
        Ok(link)
    }

    /// The user dismissed the reward interaction.
    pub fn skip_reward(&mut self) -> Result<HandoffLink, RewardGateError> {
        self.release(RewardState::default())
    }
}
