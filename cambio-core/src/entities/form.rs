//! Checkout form and the step-1 validity predicate.

use cambio_sdk::objects::{FormPatch, PaymentMethod, TradeDirection};
use serde::{Deserialize, Serialize};

use crate::config::IBAN_LENGTH;
use crate::utils::sanitize::sanitize_text;

/// Everything the user types or ticks during checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub full_name: String,
    pub age: String,
    pub gender: String,
    pub wallet: String,
    pub coordinates: String,
    pub bank: String,
    pub iban: String,
    pub account_holder: String,
    pub terms_accepted: bool,
    pub rate_guarantee_accepted: bool,
    pub payment_method: PaymentMethod,
    /// URL of the uploaded proof of payment.
    pub proof_reference: Option<String>,
}

/// A step-1 field that blocks advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum FieldError {
    #[error("full name is required")]
    FullNameMissing,
    #[error("age is required")]
    AgeMissing,
    #[error("account coordinates are required")]
    CoordinatesMissing,
    #[error("IBAN must have 25 characters and start with the country prefix")]
    IbanInvalid,
    #[error("account holder is required")]
    AccountHolderMissing,
}

impl FieldError {
    /// Stable field name for inline error placement.
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::FullNameMissing => "full_name",
            FieldError::AgeMissing => "age",
            FieldError::CoordinatesMissing => "coordinates",
            FieldError::IbanInvalid => "iban",
            FieldError::AccountHolderMissing => "account_holder",
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// An IBAN is accepted iff it is exactly [`IBAN_LENGTH`] characters long
/// and starts with `prefix`.
pub fn is_valid_iban(iban: &str, prefix: &str) -> bool {
    iban.chars().count() == IBAN_LENGTH && iban.starts_with(prefix)
}

impl CheckoutForm {
    /// Merge the fields present in `patch`.
    pub fn apply(&mut self, patch: FormPatch) {
        let FormPatch {
            full_name,
            age,
            gender,
            wallet,
            coordinates,
            bank,
            iban,
            account_holder,
            terms_accepted,
            rate_guarantee_accepted,
            payment_method,
        } = patch;

        if let Some(v) = full_name {
            self.full_name = v;
        }
        if let Some(v) = age {
            self.age = v;
        }
        if let Some(v) = gender {
            self.gender = v;
        }
        if let Some(v) = wallet {
            self.wallet = v;
        }
        if let Some(v) = coordinates {
            self.coordinates = v;
        }
        if let Some(v) = bank {
            self.bank = v;
        }
        if let Some(v) = iban {
            self.iban = v;
        }
        if let Some(v) = account_holder {
            self.account_holder = v;
        }
        if let Some(v) = terms_accepted {
            self.terms_accepted = v;
        }
        if let Some(v) = rate_guarantee_accepted {
            self.rate_guarantee_accepted = v;
        }
        if let Some(v) = payment_method {
            self.payment_method = v;
        }
    }

    /// The form with every free-text field passed through [`sanitize_text`].
    ///
    /// This is the text an order is built from.
    pub fn sanitized(&self) -> CheckoutForm {
        CheckoutForm {
            full_name: sanitize_text(&self.full_name),
            age: sanitize_text(&self.age),
            gender: sanitize_text(&self.gender),
            wallet: sanitize_text(&self.wallet),
            coordinates: sanitize_text(&self.coordinates),
            bank: sanitize_text(&self.bank),
            iban: sanitize_text(&self.iban),
            account_holder: sanitize_text(&self.account_holder),
            ..self.clone()
        }
    }

    /// Fields that currently fail the step-1 gate for `direction`.
    ///
    /// Judged on the sanitized text, so a field that only holds stripped
    /// characters or padding fails here rather than reaching an order.
    pub fn step1_errors(&self, direction: TradeDirection, iban_prefix: &str) -> Vec<FieldError> {
        let form = self.sanitized();
        let mut errors = Vec::new();
        if is_blank(&form.full_name) {
            errors.push(FieldError::FullNameMissing);
        }
        if is_blank(&form.age) {
            errors.push(FieldError::AgeMissing);
        }
        match direction {
            TradeDirection::Buy => {
                if is_blank(&form.coordinates) {
                    errors.push(FieldError::CoordinatesMissing);
                }
            }
            TradeDirection::Sell => {
                if !is_valid_iban(&form.iban, iban_prefix) {
                    errors.push(FieldError::IbanInvalid);
                }
                if is_blank(&form.account_holder) {
                    errors.push(FieldError::AccountHolderMissing);
                }
            }
        }
        errors
    }

    pub fn is_step1_valid(&self, direction: TradeDirection, iban_prefix: &str) -> bool {
        self.step1_errors(direction, iban_prefix).is_empty()
    }

    pub fn terms_complete(&self) -> bool {
        self.terms_accepted && self.rate_guarantee_accepted
    }
}
