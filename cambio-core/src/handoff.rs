//! Hand-off payload and outbound link.
//!
//! The payload is a plain text message routed to a human operator through a
//! messaging deep-link of the form `<target>?text=<url-encoded payload>`.

use cambio_sdk::objects::{OrderDestination, TradeDirection};
use itertools::Itertools;
use std::fmt;
use url::Url;
use uuid::Uuid;

use crate::config::HandoffConfig;
use crate::entities::order::NewOrder;
use crate::entities::reward::RewardState;
use crate::utils::money::format_money;

/// Marker prepended to payloads released with an earned reward.
pub const PRIORITY_MARKER: &str = "⭐ PRIORITY ORDER ⭐";

/// Local currency code used for totals.
pub const LOCAL_CURRENCY: &str = "AOA";

/// Identifier the operator uses to match the message to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffReference {
    /// Order registered with the order service.
    Order(Uuid),
    /// Order service unavailable; synthesized from the submission time.
    Fallback(String),
}

impl HandoffReference {
    pub fn fallback(now: time::OffsetDateTime) -> Self {
        let millis = now.unix_timestamp_nanos() / 1_000_000;
        HandoffReference::Fallback(format!("CX-{millis}"))
    }

    pub fn order_id(&self) -> Option<Uuid> {
        match self {
            HandoffReference::Order(id) => Some(*id),
            HandoffReference::Fallback(_) => None,
        }
    }
}

impl fmt::Display for HandoffReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandoffReference::Order(id) => write!(f, "{id}"),
            HandoffReference::Fallback(r) => write!(f, "{r}"),
        }
    }
}

/// Everything the payload is rendered from, fixed at finalize.
///
/// Rebuilding after a reward completes reuses the same draft, so the
/// reference never changes between the deferred and released link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffDraft {
    reference: HandoffReference,
    order: NewOrder,
}

impl HandoffDraft {
    pub fn new(reference: HandoffReference, order: NewOrder) -> Self {
        Self { reference, order }
    }

    pub fn reference(&self) -> &HandoffReference {
        &self.reference
    }

    pub fn order(&self) -> &NewOrder {
        &self.order
    }
}

/// A rendered hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffLink {
    pub uri: String,
    pub text: String,
    pub reference: HandoffReference,
    pub priority: bool,
}

#[derive(Debug, Clone)]
pub struct HandoffLinkBuilder {
    target: Url,
}

impl HandoffLinkBuilder {
    pub fn new(config: &HandoffConfig) -> Self {
        Self {
            target: config.target.clone(),
        }
    }

    pub fn build(&self, draft: &HandoffDraft, reward: RewardState) -> HandoffLink {
        let text = render_text(draft, reward.earned);
        let uri = format!("{}?text={}", self.target, urlencoding::encode(&text));
        HandoffLink {
            uri,
            text,
            reference: draft.reference.clone(),
            priority: reward.earned,
        }
    }

    /// Link the user follows to confirm receipt of a completed order.
    pub fn confirmation(&self, order_id: Uuid) -> String {
        let text = format!("Order: {order_id}\nI confirm I have received the funds for this order.");
        format!("{}?text={}", self.target, urlencoding::encode(&text))
    }
}

fn render_text(draft: &HandoffDraft, priority: bool) -> String {
    let order = &draft.order;
    let mut lines: Vec<String> = Vec::with_capacity(16);

    if priority {
        lines.push(PRIORITY_MARKER.to_string());
    }
    match &draft.reference {
        HandoffReference::Order(id) => lines.push(format!("Order: {id}")),
        HandoffReference::Fallback(r) => {
            lines.push(format!("Manual reference: {r}"));
            lines.push("Order could not be registered automatically.".to_string());
        }
    }

    let verb = match order.direction {
        TradeDirection::Buy => "BUY",
        TradeDirection::Sell => "SELL",
    };
    lines.push(format!(
        "{verb} {} {}",
        format_money(order.amount),
        order.currency
    ));
    lines.push(format!(
        "Total: {} {LOCAL_CURRENCY}",
        format_money(order.total_local_currency)
    ));
    lines.push(format!(
        "Rate: {} {LOCAL_CURRENCY}/{}",
        format_money(order.applied_rate),
        order.currency
    ));

    lines.push(format!("Name: {}", order.customer.full_name));
    lines.push(format!("Age: {}", order.customer.age));
    if !order.customer.gender.is_empty() {
        lines.push(format!("Gender: {}", order.customer.gender));
    }

    match &order.destination {
        OrderDestination::Wallet {
            wallet,
            coordinates,
        } => {
            if !wallet.is_empty() {
                lines.push(format!("Wallet: {wallet}"));
            }
            lines.push(format!("Account: {coordinates}"));
        }
        OrderDestination::Bank {
            bank,
            iban,
            account_holder,
        } => {
            if !bank.is_empty() {
                lines.push(format!("Bank: {bank}"));
            }
            lines.push(format!("IBAN: {iban}"));
            lines.push(format!("Account holder: {account_holder}"));
        }
    }

    lines.push(format!("Payment method: {}", order.payment_method));
    lines.push(match &order.proof_reference {
        Some(url) => format!("Proof of payment: {url}"),
        None => "Proof of payment: not attached".to_string(),
    });
    lines.push(if order.rate_expired {
        "Rate guarantee: EXPIRED, confirm the rate before paying out".to_string()
    } else {
        "Rate guarantee: valid".to_string()
    });

    lines.iter().join("\n")
}


#[cfg(test)]
mod tests {
    use super::fixtures::buy_order;
    use super::*;
    use time::macros::datetime;

    fn builder() -> HandoffLinkBuilder {
        HandoffLinkBuilder::new(&HandoffConfig::new(
            Url::parse("https://wa.me/244923000000").unwrap(),
        ))
    }

    fn order_id() -> Uuid {
        Uuid::parse_str("0192f7a4-8c3e-7b21-9d4f-1a2b3c4d5e6f").unwrap()
    }

    #[test]
    fn test_payload_contents() {
        let draft = HandoffDraft::new(HandoffReference::Order(order_id()), buy_order());
        let link = builder().build(&draft, RewardState::default());

        assert!(!link.priority);
        assert!(!link.text.contains(PRIORITY_MARKER));
        assert!(link.text.contains(&order_id().to_string()));
        assert!(link.text.contains("BUY 500.00 USD"));
        assert!(link.text.contains("Total: 475000.00 AOA"));
        assert!(link.text.contains("Account: GB29NWBK60161331926819"));
        assert!(link.text.contains("Proof of payment: not attached"));
        assert!(link.text.contains("Rate guarantee: valid"));
        assert!(!link.text.contains("Gender"));
    }

    #[test]
    fn test_uri_encodes_payload() {
        let draft = HandoffDraft::new(HandoffReference::Order(order_id()), buy_order());
        let link = builder().build(&draft, RewardState::default());
        let (target, query) = link.uri.split_once('?').unwrap();
        assert_eq!(target, "https://wa.me/244923000000");
        let encoded = query.strip_prefix("text=").unwrap();
        assert!(!encoded.contains(' '));
        assert!(!encoded.contains('\n'));
        assert_eq!(urlencoding::decode(encoded).unwrap(), link.text);
    }

    #[test]
    fn test_priority_keeps_reference() {
        let draft = HandoffDraft::new(HandoffReference::Order(order_id()), buy_order());
        let plain = builder().build(&draft, RewardState::default());
        let priority = builder().build(&draft, RewardState::EARNED);
        assert!(priority.priority);
        assert!(priority.text.starts_with(PRIORITY_MARKER));
        assert_eq!(plain.reference, priority.reference);
        assert!(priority.text.ends_with(&plain.text));
    }

    #[test]
    fn test_confirmation_link() {
        let uri = builder().confirmation(order_id());
        let encoded = uri
            .strip_prefix("https://wa.me/244923000000?text=")
            .unwrap();
        let text = urlencoding::decode(encoded).unwrap();
        assert!(text.starts_with(&format!("Order: {}", order_id())));
    }

    #[test]
    fn test_fallback_and_expiry() {
        let mut order = buy_order();
        order.rate_expired = true;
        order.proof_reference = Some("https://files.example/proof.pdf".to_string());
        order.destination = OrderDestination::Bank {
            bank: String::new(),
            iban: "AO06000000000000000000000".to_string(),
            account_holder: "Ana".to_string(),
        };
        let reference = HandoffReference::fallback(datetime!(2026-03-01 12:00 UTC));
        assert_eq!(reference.order_id(), None);
        assert_eq!(reference.to_string(), "CX-1772366400000");

        let link = builder().build(&HandoffDraft::new(reference, order), RewardState::default());
        assert!(link.text.contains("Manual reference: CX-1772366400000"));
        assert!(link.text.contains("IBAN: AO06000000000000000000000"));
        assert!(link.text.contains("EXPIRED"));
        assert!(link.text.contains("https://files.example/proof.pdf"));
    }
}
