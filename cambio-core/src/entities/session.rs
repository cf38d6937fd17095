//! In-progress checkout state, as persisted for reload recovery.

use cambio_sdk::objects::{Currency, TradeDirection};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::form::CheckoutForm;

/// Checkout steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    /// Identity and destination data.
    Data = 1,
    /// Terms and rate guarantee acceptance.
    Terms = 2,
    /// Payment and proof of payment.
    Payment = 3,
}

impl Step {
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Step::Data),
            2 => Some(Step::Terms),
            3 => Some(Step::Payment),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::from_number(self.number().checked_sub(1)?)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl Serialize for Step {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.number())
    }
}

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let n = u8::deserialize(deserializer)?;
        Step::from_number(n).ok_or_else(|| {
            serde::de::Error::invalid_value(serde::de::Unexpected::Unsigned(n.into()), &"1, 2 or 3")
        })
    }
}

/// The trade the checkout was opened for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub direction: TradeDirection,
    pub currency: Currency,
    /// Amount exactly as typed; parsed only at finalize.
    pub amount: String,
    /// Total shown by the calculator. Never used for the order.
    #[serde(default)]
    pub displayed_total: Option<Decimal>,
}

/// Durable snapshot of one checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub trade: TradeRequest,
    pub form: CheckoutForm,
    pub step: Step,
    pub seconds_remaining: u32,
    pub expired: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
}

impl CheckoutSession {
    pub fn new(trade: TradeRequest, countdown_seconds: u32, created_at: time::OffsetDateTime) -> Self {
        Self {
            trade,
            form: CheckoutForm::default(),
            step: Step::Data,
            seconds_remaining: countdown_seconds,
            expired: countdown_seconds == 0,
            created_at,
        }
    }

    /// Whether the session is still inside the recovery window at `now`.
    pub fn is_fresh(&self, now: time::OffsetDateTime, ttl: time::Duration) -> bool {
        now - self.created_at < ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn trade() -> TradeRequest {
        TradeRequest {
            direction: TradeDirection::Buy,
            currency: Currency::Usd,
            amount: "500".to_string(),
            displayed_total: None,
        }
    }

    #[test]
    fn test_step_navigation() {
        assert_eq!(Step::Data.next(), Some(Step::Terms));
        assert_eq!(Step::Payment.next(), None);
        assert_eq!(Step::Data.previous(), None);
        assert_eq!(Step::Payment.previous(), Some(Step::Terms));
    }

    #[test]
    fn test_session_record_format() {
        let session = CheckoutSession::new(trade(), 900, datetime!(2026-03-01 12:00 UTC));
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["step"], 1);
        assert_eq!(json["seconds_remaining"], 900);
        assert_eq!(json["created_at"], "2026-03-01T12:00:00Z");

        let back: CheckoutSession = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn test_rejects_out_of_range_step() {
        let mut json =
            serde_json::to_value(CheckoutSession::new(trade(), 900, datetime!(2026-03-01 12:00 UTC)))
                .unwrap();
        json["step"] = serde_json::json!(4);
        assert!(serde_json::from_value::<CheckoutSession>(json).is_err());
    }

    #[test]
    fn test_freshness_window() {
        let session = CheckoutSession::new(trade(), 900, datetime!(2026-03-01 12:00 UTC));
        let ttl = time::Duration::hours(24);
        assert!(session.is_fresh(datetime!(2026-03-02 11:59 UTC), ttl));
        assert!(!session.is_fresh(datetime!(2026-03-02 12:00 UTC), ttl));
    }
}
