//! Long-running tasks and async steps of the checkout.
//!
//! - `Countdown`: ticks the rate guarantee of one checkout once per second
//! - `RatePoller`: refreshes the shared [`RateBoard`](crate::rates::RateBoard)
//! - `OrderSubmitter`: recomputes and registers the order at finalize
//! - `RewardGate`: holds the hand-off back until a reward is earned or skipped

pub mod countdown;
pub mod order_submitter;
pub mod rate_poller;
pub mod reward_gate;

pub use countdown::Countdown;
pub use order_submitter::{FinalizeError, FinalizeOrder, OrderSubmitter};
pub use rate_poller::{RatePoller, RefreshRates};
pub use reward_gate::{GateDecision, RewardGate, RewardGateError};
