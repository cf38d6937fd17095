//! Rate snapshots.

use cambio_sdk::objects::Currency;
pub use cambio_sdk::objects::RateQuote;

/// Why no usable quote exists for a currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RateUnavailable {
    #[error("no quote available for {0}")]
    Missing(Currency),
    #[error("quote for {0} fails the validity check")]
    Invalid(Currency),
}

/// An immutable set of quotes as returned by one call to the rate provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateSnapshot {
    quotes: Vec<RateQuote>,
    fetched_at: time::OffsetDateTime,
}

impl RateSnapshot {
    pub fn new(quotes: Vec<RateQuote>, fetched_at: time::OffsetDateTime) -> Self {
        Self { quotes, fetched_at }
    }

    /// A snapshot with no quotes. Every lookup against it is `Missing`.
    pub fn empty() -> Self {
        Self::new(Vec::new(), time::OffsetDateTime::UNIX_EPOCH)
    }

    pub fn quotes(&self) -> &[RateQuote] {
        &self.quotes
    }

    pub fn fetched_at(&self) -> time::OffsetDateTime {
        self.fetched_at
    }

    pub fn quote(&self, currency: Currency) -> Option<&RateQuote> {
        self.quotes.iter().find(|q| q.currency == currency)
    }

    /// The quote for `currency`, provided it passes the validity check.
    pub fn valid_quote(&self, currency: Currency) -> Result<&RateQuote, RateUnavailable> {
        let quote = self
            .quote(currency)
            .ok_or(RateUnavailable::Missing(currency))?;
        if !quote.is_valid() {
            return Err(RateUnavailable::Invalid(currency));
        }
        Ok(quote)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    pub fn usd_quote(informal_buy: Decimal, informal_sell: Decimal) -> RateQuote {
        RateQuote {
            currency: Currency::Usd,
            formal_buy: dec!(830),
            formal_sell: dec!(835),
            informal_buy,
            informal_sell,
        }
    }

    pub fn usd_snapshot(informal_buy: Decimal, informal_sell: Decimal) -> RateSnapshot {
        RateSnapshot::new(
            vec![usd_quote(informal_buy, informal_sell)],
            time::macros::datetime!(2026-03-01 12:00 UTC),
        )
    }
}
