//! Orders created at finalize.

use cambio_sdk::objects::{
    CreateOrderRequest, Currency, OrderDestination, OrderStatus, PaymentMethod, TradeDirection,
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Personal details carried into the order, already sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub full_name: String,
    pub age: String,
    pub gender: String,
}

/// An order ready to be registered with the order service.
///
/// `total_local_currency` is always the value recomputed by the submitter
/// from the rate snapshot supplied to finalize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer: Customer,
    pub direction: TradeDirection,
    pub amount: Decimal,
    pub currency: Currency,
    pub applied_rate: Decimal,
    pub total_local_currency: Decimal,
    pub payment_method: PaymentMethod,
    pub proof_reference: Option<String>,
    pub status: OrderStatus,
    pub destination: OrderDestination,
    pub rate_expired: bool,
}

impl From<&NewOrder> for CreateOrderRequest {
    fn from(order: &NewOrder) -> Self {
        CreateOrderRequest {
            full_name: order.customer.full_name.clone(),
            age: order.customer.age.clone(),
            gender: order.customer.gender.clone(),
            direction: order.direction,
            amount: order.amount,
            currency: order.currency,
            total_local_currency: order.total_local_currency,
            applied_rate: order.applied_rate,
            payment_method: order.payment_method,
            proof_reference: order.proof_reference.clone(),
            status: order.status,
            destination: order.destination.clone(),
            rate_expired: order.rate_expired,
        }
    }
}

/// A registered order. Only the identifier is kept after hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    pub order_id: Uuid,
    pub order: NewOrder,
}
