//! OrderSubmitter processor.
//!
//! Turns a finalizable [`CheckoutSession`] into a [`NewOrder`] and registers
//! it with the [`OrderService`]:
//! - the amount is parsed from the text the user typed
//! - the step-1 gate is checked again against the submitted form
//! - the local-currency total is recomputed from the rate snapshot handed in
//!   with the request; the total the user was shown is never used
//! - free-text fields are sanitized
//!
//! On success an interstitial may be scheduled on a detached task.

use kanau::processor::Processor;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use cambio_sdk::objects::{OrderDestination, OrderStatus, TradeDirection};

use crate::entities::form::FieldError;
use crate::entities::order::{Customer, NewOrder, OrderReceipt};
use crate::entities::rate::{RateSnapshot, RateUnavailable};
use crate::entities::session::CheckoutSession;
use crate::ports::{ExternalError, OrderService, RewardSubsystem};
use crate::utils::money::{parse_positive_amount, round_money};

#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error("a finalize is already in flight")]
    AlreadyInFlight,

    #[error("trade amount is not a positive number: {0:?}")]
    InvalidAmount(String),

    #[error("local-currency total for {0:?} is out of range")]
    TotalOutOfRange(String),

    #[error("form has invalid fields: {0:?}")]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    RateUnavailable(#[from] RateUnavailable),

    /// The order was built but the order service did not accept it.
    #[error("order submission failed: {reason}")]
    SubmissionFailed {
        order: Box<NewOrder>,
        reason: ExternalError,
    },
}

/// Register the order for `session` at the rates in `rates`.
#[derive(Debug, Clone)]
pub struct FinalizeOrder {
    pub session: CheckoutSession,
    pub rates: Arc<RateSnapshot>,
}

pub struct OrderSubmitter {
    orders: Arc<dyn OrderService>,
    rewards: Arc<dyn RewardSubsystem>,
    iban_prefix: String,
    interstitial_delay: Duration,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the submission ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl OrderSubmitter {
    pub fn new(
        orders: Arc<dyn OrderService>,
        rewards: Arc<dyn RewardSubsystem>,
        iban_prefix: String,
        interstitial_delay: Duration,
    ) -> Self {
        Self {
            orders,
            rewards,
            iban_prefix,
            interstitial_delay,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Build the order without submitting it.
    pub fn build_order(
        &self,
        session: &CheckoutSession,
        rates: &RateSnapshot,
    ) -> Result<NewOrder, FinalizeError> {
        let trade = &session.trade;
        let amount = parse_positive_amount(&trade.amount)
            .ok_or_else(|| FinalizeError::InvalidAmount(trade.amount.clone()))?;

        let form = session.form.sanitized();
        let errors = form.step1_errors(trade.direction, &self.iban_prefix);
        if !errors.is_empty() {
            return Err(FinalizeError::Validation(errors));
        }

        let quote = rates.valid_quote(trade.currency)?;
        let applied_rate = quote.informal_rate(trade.direction);
        let total_local_currency = local_total(amount, applied_rate)
            .ok_or_else(|| FinalizeError::TotalOutOfRange(trade.amount.clone()))?;
        if let Some(displayed) = trade.displayed_total.filter(|d| *d != total_local_currency) {
            debug!(
                %displayed,
                recomputed = %total_local_currency,
                "Displayed total differs from recomputed total, using recomputed"
            );
        }

        let destination = match trade.direction {
            TradeDirection::Buy => OrderDestination::Wallet {
                wallet: form.wallet,
                coordinates: form.coordinates,
            },
            TradeDirection::Sell => OrderDestination::Bank {
                bank: form.bank,
                iban: form.iban,
                account_holder: form.account_holder,
            },
        };

        Ok(NewOrder {
            customer: Customer {
                full_name: form.full_name,
                age: form.age,
                gender: form.gender,
            },
            direction: trade.direction,
            amount,
            currency: trade.currency,
            applied_rate,
            total_local_currency,
            payment_method: form.payment_method,
            proof_reference: form.proof_reference,
            status: OrderStatus::Pending,
            destination,
            rate_expired: session.expired,
        })
    }

    fn schedule_interstitial(&self) {
        if !self.rewards.can_show_interstitial() {
            return;
        }
        let rewards = self.rewards.clone();
        let delay = self.interstitial_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if rewards.can_show_interstitial() {
                rewards.show_interstitial();
            }
        });
    }
}

impl Processor<FinalizeOrder> for OrderSubmitter {
    type Output = OrderReceipt;
    type Error = FinalizeError;

    #[tracing::instrument(skip_all, err, name = "OrderSubmitter:Finalize")]
    async fn process(&self, request: FinalizeOrder) -> Result<OrderReceipt, FinalizeError> {
        let _guard = InFlight::acquire(&self.in_flight).ok_or(FinalizeError::AlreadyInFlight)?;

        let order = self.build_order(&request.session, &request.rates)?;
        match self.orders.create_order(&order).await {
            Ok(order_id) => {
                info!(
                    %order_id,
                    direction = %order.direction,
                    currency = %order.currency,
                    total = %order.total_local_currency,
                    rate_expired = order.rate_expired,
                    "Order registered"
                );
                self.schedule_interstitial();
                Ok(OrderReceipt { order_id, order })
            }
            Err(reason) => {
                warn!(error = %reason, "Order service rejected the order");
                Err(FinalizeError::SubmissionFailed {
                    order: Box::new(order),
                    reason,
                })
            }
        }
    }
}

/// Total in local currency for `amount` at `rate`, as charged.
///
/// `None` when the product does not fit a [`Decimal`].
pub fn local_total(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    amount.checked_mul(rate).map(round_money)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::proof::ProofFile;
    use crate::entities::rate::fixtures::usd_snapshot;
    use crate::entities::session::{Step, TradeRequest};
    use async_trait::async_trait;
    use cambio_sdk::objects::{Currency, FormPatch};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use time::macros::datetime;
    use tokio::sync::Notify;
    use url::Url;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingOrders {
        created: Mutex<Vec<NewOrder>>,
        fail: bool,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl OrderService for RecordingOrders {
        async fn create_order(&self, order: &NewOrder) -> Result<Uuid, ExternalError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                return Err(ExternalError::new("order service unavailable"));
            }
            self.created.lock().unwrap().push(order.clone());
            Ok(Uuid::nil())
        }

        async fn upload_proof(&self, _file: ProofFile) -> Result<Url, ExternalError> {
            Err(ExternalError::new("not used"))
        }
    }

    #[derive(Default)]
    struct CountingRewards {
        interstitials: AtomicUsize,
        eligible: bool,
    }

    impl RewardSubsystem for CountingRewards {
        fn has_active_reward(&self) -> bool {
            false
        }
        fn mark_reward_completed(&self) {}
        fn reset_reward_state(&self) {}
        fn can_show_interstitial(&self) -> bool {
            self.eligible
        }
        fn show_interstitial(&self) {
            self.interstitials.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn session(direction: TradeDirection, amount: &str) -> CheckoutSession {
        let mut session = CheckoutSession::new(
            TradeRequest {
                direction,
                currency: Currency::Usd,
                amount: amount.to_string(),
                displayed_total: Some(dec!(1)),
            },
            900,
            datetime!(2026-03-01 12:00 UTC),
        );
        session.form.apply(FormPatch {
            full_name: Some(" Ana <b>Luísa</b> ".to_string()),
            age: Some("31".to_string()),
            coordinates: Some("GB29NWBK60161331926819".to_string()),
            iban: Some("AO06000000000000000000000".to_string()),
            account_holder: Some("Ana".to_string()),
            terms_accepted: Some(true),
            rate_guarantee_accepted: Some(true),
            ..Default::default()
        });
        session.step = Step::Payment;
        session
    }

    fn submitter(orders: Arc<RecordingOrders>, rewards: Arc<CountingRewards>) -> OrderSubmitter {
        OrderSubmitter::new(
            orders,
            rewards,
            "AO06".to_string(),
            Duration::from_millis(1500),
        )
    }

    fn request(session: CheckoutSession) -> FinalizeOrder {
        FinalizeOrder {
            session,
            rates: Arc::new(usd_snapshot(dec!(930), dec!(950))),
        }
    }

    #[tokio::test]
    async fn test_total_is_recomputed() {
        let orders = Arc::new(RecordingOrders::default());
        let submitter = submitter(orders.clone(), Arc::default());

        let receipt = submitter
            .process(request(session(TradeDirection::Buy, "500")))
            .await
            .unwrap();
        assert_eq!(receipt.order.total_local_currency, dec!(475000));
        assert_eq!(receipt.order.applied_rate, dec!(950));
        assert_eq!(receipt.order.customer.full_name, "Ana bLuísa/b");
        assert_eq!(orders.created.lock().unwrap().len(), 1);
        assert!(!submitter.is_in_flight());
    }

    #[tokio::test]
    async fn test_sell_uses_informal_buy() {
        let submitter = submitter(Arc::default(), Arc::default());
        let receipt = submitter
            .process(request(session(TradeDirection::Sell, "12,5")))
            .await
            .unwrap();
        assert_eq!(receipt.order.applied_rate, dec!(930));
        assert_eq!(receipt.order.total_local_currency, dec!(11625.00));
        assert!(matches!(
            receipt.order.destination,
            OrderDestination::Bank { .. }
        ));
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        let submitter = submitter(Arc::default(), Arc::default());
        for amount in ["0", "-5", "abc", ""] {
            assert!(matches!(
                submitter
                    .process(request(session(TradeDirection::Buy, amount)))
                    .await,
                Err(FinalizeError::InvalidAmount(_))
            ));
        }

        let mut tampered = session(TradeDirection::Buy, "500");
        tampered.form.full_name = "   ".to_string();
        assert!(matches!(
            submitter.process(request(tampered)).await,
            Err(FinalizeError::Validation(errors)) if errors == vec![FieldError::FullNameMissing]
        ));

        let no_rates = FinalizeOrder {
            session: session(TradeDirection::Buy, "500"),
            rates: Arc::new(RateSnapshot::empty()),
        };
        assert!(matches!(
            submitter.process(no_rates).await,
            Err(FinalizeError::RateUnavailable(RateUnavailable::Missing(Currency::Usd)))
        ));
    }

    #[tokio::test]
    async fn test_submission_failure_returns_order() {
        let orders = Arc::new(RecordingOrders {
            fail: true,
            ..Default::default()
        });
        let submitter = submitter(orders, Arc::default());
        let mut expired = session(TradeDirection::Buy, "500");
        expired.expired = true;
        match submitter.process(request(expired)).await {
            Err(FinalizeError::SubmissionFailed { order, .. }) => {
                assert_eq!(order.total_local_currency, dec!(475000));
                assert!(order.rate_expired);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!submitter.is_in_flight());
    }

    #[tokio::test]
    async fn test_single_finalize_in_flight() {
        let gate = Arc::new(Notify::new());
        let orders = Arc::new(RecordingOrders {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let submitter = Arc::new(submitter(orders, Arc::default()));

        let first = {
            let submitter = submitter.clone();
            tokio::spawn(async move {
                submitter
                    .process(request(session(TradeDirection::Buy, "500")))
                    .await
            })
        };
        while !submitter.is_in_flight() {
            tokio::task::yield_now().await;
        }
        assert!(matches!(
            submitter
                .process(request(session(TradeDirection::Buy, "500")))
                .await,
            Err(FinalizeError::AlreadyInFlight)
        ));

        gate.notify_one();
        assert!(first.await.unwrap().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interstitial_is_deferred() {
        let rewards = Arc::new(CountingRewards {
            eligible: true,
            ..Default::default()
        });
        let submitter = submitter(Arc::default(), rewards.clone());
        submitter
            .process(request(session(TradeDirection::Buy, "500")))
            .await
            .unwrap();
        assert_eq!(rewards.interstitials.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rewards.interstitials.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_huge_amount_is_rejected_without_overflow() {
        let submitter = submitter(Arc::default(), Arc::default());
        let rates = usd_snapshot(dec!(930), dec!(950));
        let huge = session(TradeDirection::Buy, "79228162514264337593543950335");
        assert!(matches!(
            submitter.build_order(&huge, &rates),
            Err(FinalizeError::InvalidAmount(amount)) if amount == "79228162514264337593543950335"
        ));

        let largest = session(TradeDirection::Buy, "1000000000");
        let order = submitter.build_order(&largest, &rates).unwrap();
        assert_eq!(order.total_local_currency, dec!(950000000000));
    }

    #[test]
    fn test_gate_runs_on_sanitized_form() {
        let submitter = submitter(Arc::default(), Arc::default());
        let rates = usd_snapshot(dec!(930), dec!(950));

        let mut stripped = session(TradeDirection::Sell, "100");
        stripped.form.iban = format!("AO06{} ", "0".repeat(20));
        stripped.form.full_name = "<>".to_string();
        assert_eq!(stripped.form.iban.chars().count(), 25);
        assert!(matches!(
            submitter.build_order(&stripped, &rates),
            Err(FinalizeError::Validation(errors))
                if errors == vec![FieldError::FullNameMissing, FieldError::IbanInvalid]
        ));

        let mut padded = session(TradeDirection::Sell, "100");
        padded.form.iban = " AO06000000000000000000000 ".to_string();
        let order = submitter.build_order(&padded, &rates).unwrap();
        match order.destination {
            OrderDestination::Bank { iban, .. } => {
                assert_eq!(iban, "AO06000000000000000000000");
            }
            other => panic!("unexpected destination: {other:?}"),
        }
    }

    #[test]
    fn test_local_total_rounding() {
        assert_eq!(local_total(dec!(10.005), dec!(1)), Some(dec!(10.01)));
        assert_eq!(local_total(dec!(500), dec!(950)), Some(dec!(475000)));
        assert_eq!(local_total(Decimal::MAX, dec!(950)), None);
    }
}
