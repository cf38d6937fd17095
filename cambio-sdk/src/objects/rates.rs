//! Rate provider wire format.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::market::{Currency, TradeDirection};

/// A currency's buy/sell prices on the formal and informal markets,
/// expressed in kwanza per unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateQuote {
    pub currency: Currency,
    pub formal_buy: Decimal,
    pub formal_sell: Decimal,
    pub informal_buy: Decimal,
    pub informal_sell: Decimal,
}

impl RateQuote {
    /// A quote is usable only when `informal_sell > informal_buy > 0`.
    pub fn is_valid(&self) -> bool {
        self.informal_buy > Decimal::ZERO && self.informal_sell > self.informal_buy
    }

    /// The informal rate applied to a trade in the given direction.
    ///
    /// A user buying foreign currency pays the informal sell price; a user
    /// selling it receives the informal buy price.
    pub fn informal_rate(&self, direction: TradeDirection) -> Decimal {
        match direction {
            TradeDirection::Buy => self.informal_sell,
            TradeDirection::Sell => self.informal_buy,
        }
    }
}

/// Response body of the rate provider's `GET /rates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesResponse {
    pub quotes: Vec<RateQuote>,
}
