//! Checkout host API request and response types.
//!
//! These types are exchanged between the checkout frontend and the local
//! host surface that drives the checkout engine on its behalf.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::deep_link::DeepLinkAction;
use super::market::{Currency, TradeDirection};
use super::orders::PaymentMethod;

/// Request body for opening a checkout from the rate calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenCheckoutRequest {
    pub direction: TradeDirection,
    pub currency: Currency,
    /// Amount exactly as typed by the user.
    pub amount: String,
    /// Total the calculator showed. Informational only.
    #[serde(default)]
    pub displayed_total: Option<Decimal>,
}

/// Partial update of the checkout form. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormPatch {
    pub full_name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub wallet: Option<String>,
    pub coordinates: Option<String>,
    pub bank: Option<String>,
    pub iban: Option<String>,
    pub account_holder: Option<String>,
    pub terms_accepted: Option<bool>,
    pub rate_guarantee_accepted: Option<bool>,
    pub payment_method: Option<PaymentMethod>,
}

/// Request body for jumping back to an already completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoToStepRequest {
    pub step: u8,
}

/// Current state of the open checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutStateResponse {
    pub step: u8,
    pub direction: TradeDirection,
    pub currency: Currency,
    pub amount: String,
    pub seconds_remaining: u32,
    pub expired: bool,
    pub show_errors: bool,
    pub field_errors: Vec<String>,
    /// The host should warn before the page is closed or navigated away.
    pub warn_before_unload: bool,
    pub proof_reference: Option<String>,
    pub rate_alert: Option<String>,
    pub closed: bool,
    /// A registered order is waiting for the reward interaction.
    pub reward_pending: bool,
}

/// Persisted session available for recovery, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryResponse {
    pub available: bool,
    pub step: Option<u8>,
    pub created_at: Option<i64>,
    /// The session was at the payment step and has already been reopened.
    pub auto_resumed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandoffStatus {
    Released,
    Deferred,
}

/// Outcome of finalize or of a reward interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffResponse {
    pub status: HandoffStatus,
    /// Outbound link, present once released.
    pub uri: Option<String>,
    pub order_id: Option<Uuid>,
    pub reference: String,
    pub priority: bool,
    /// The order service rejected the order; `uri` is a manual fallback.
    pub submission_failed: bool,
}

/// Response of the feedback deep link entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackPromptResponse {
    pub order_id: Uuid,
    pub action: DeepLinkAction,
    /// Hand-off link the user can use to confirm receipt with an operator.
    pub confirm_uri: String,
}
