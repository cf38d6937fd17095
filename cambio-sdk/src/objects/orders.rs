//! Order service wire format.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::market::{Currency, TradeDirection};

/// How the user settles their side of the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    BankTransfer,
    MulticaixaExpress,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::BankTransfer => write!(f, "bank transfer"),
            PaymentMethod::MulticaixaExpress => write!(f, "Multicaixa Express"),
        }
    }
}

/// Where the fulfilled funds are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OrderDestination {
    /// Foreign currency delivered to a wallet (buy orders).
    Wallet { wallet: String, coordinates: String },
    /// Kwanza paid out to a bank account (sell orders).
    Bank {
        bank: String,
        iban: String,
        account_holder: String,
    },
}

/// Order status as reported by the order service.
///
/// Checkout only ever creates `Pending` orders; later transitions belong
/// to the fulfillment side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Request body for `POST /orders` on the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub full_name: String,
    pub age: String,
    pub gender: String,
    pub direction: TradeDirection,
    pub amount: Decimal,
    pub currency: Currency,
    /// Kwanza total recomputed at submit time from the applied rate.
    pub total_local_currency: Decimal,
    pub applied_rate: Decimal,
    pub payment_method: PaymentMethod,
    pub proof_reference: Option<String>,
    pub status: OrderStatus,
    pub destination: OrderDestination,
    pub rate_expired: bool,
}

/// Response body of `POST /orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: Uuid,
}

/// Response body of `POST /proofs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofUploadResponse {
    pub url: Url,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_is_tagged() {
        let dest = OrderDestination::Bank {
            bank: "BAI".to_string(),
            iban: "AO06000000000000000000000".to_string(),
            account_holder: "Ana".to_string(),
        };
        let json = serde_json::to_value(&dest).unwrap();
        assert_eq!(json["kind"], "bank");
        assert_eq!(json["iban"], "AO06000000000000000000000");
    }

    #[test]
    fn test_payment_method_default() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::BankTransfer);
        let json = serde_json::to_string(&PaymentMethod::MulticaixaExpress).unwrap();
        assert_eq!(json, r#""multicaixa_express""#);
    }
}
