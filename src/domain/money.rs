use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Money is an exact decimal so repeated deposits and interest accruals never
/// pick up binary floating-point drift. Rounding happens only for display.
pub type Money = Decimal;

/// Format an amount as a human-readable currency string with two decimals.
/// Example: 20 -> "20.00", -45 -> "-45.00", 1.665 -> "1.67"
pub fn format_money(amount: Money) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Parse a decimal string into money.
/// Example: "50.00" -> 50, "12.5" -> 12.5, "-3" -> -3
pub fn parse_money(input: &str) -> Result<Money, ParseMoneyError> {
    let input = input.trim().trim_start_matches('$');
    if input.is_empty() {
        return Err(ParseMoneyError::Empty);
    }
    Decimal::from_str(input).map_err(|_| ParseMoneyError::InvalidFormat(input.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseMoneyError {
    #[error("empty amount")]
    Empty,

    #[error("invalid money format: {0}")]
    InvalidFormat(String),
}
