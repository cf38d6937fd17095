use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Largest trade amount accepted, in units of the foreign currency.
pub const MAX_TRADE_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Parse a user-typed amount. Accepts a comma as decimal separator.
///
/// Returns `None` unless the result is strictly positive and no larger than
/// [`MAX_TRADE_AMOUNT`].
pub fn parse_positive_amount(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    let normalized = if trimmed.contains('.') {
        trimmed.to_string()
    } else {
        trimmed.replacen(',', ".", 1)
    };
    let amount = Decimal::from_str(&normalized).ok()?;
    (amount > Decimal::ZERO && amount <= MAX_TRADE_AMOUNT).then_some(amount)
}

/// Round to cents, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Two-decimal rendering used in hand-off messages.
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_amounts() {
        assert_eq!(parse_positive_amount("500"), Some(dec!(500)));
        assert_eq!(parse_positive_amount(" 12.5 "), Some(dec!(12.5)));
        assert_eq!(parse_positive_amount("12,5"), Some(dec!(12.5)));
        assert_eq!(parse_positive_amount("0"), None);
        assert_eq!(parse_positive_amount("-3"), None);
        assert_eq!(parse_positive_amount(""), None);
        assert_eq!(parse_positive_amount("abc"), None);
    }

    #[test]
    fn test_parse_caps_amount() {
        assert_eq!(parse_positive_amount("1000000000"), Some(MAX_TRADE_AMOUNT));
        assert_eq!(parse_positive_amount("1000000000.01"), None);
        assert_eq!(parse_positive_amount("79228162514264337593543950335"), None);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(500)), "500.00");
        assert_eq!(format_money(dec!(475000)), "475000.00");
        assert_eq!(format_money(dec!(0.125)), "0.13");
    }
}
