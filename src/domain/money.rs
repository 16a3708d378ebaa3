use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Prices, litres and totals are fixed-point decimals. Full precision is kept
/// in state; rounding happens only when a value is presented.
pub type Amount = Decimal;

/// Currency prefix printed in front of every money value.
pub const CURRENCY: &str = "RM";

/// Round to two decimal places, half away from zero.
pub fn round2(value: Amount) -> Amount {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a money value with two decimals.
/// Example: 50 -> "50.00", 2.035 -> "2.04"
pub fn format_money(value: Amount) -> String {
    format!("{:.2}", round2(value))
}

/// Format a money value with the currency prefix, e.g. "RM50.00".
pub fn format_ringgit(value: Amount) -> String {
    format!("{}{}", CURRENCY, format_money(value))
}

/// Format a volume in litres with two decimals.
pub fn format_litres(value: Amount) -> String {
    format!("{:.2}", round2(value))
}

/// Parse a strictly positive decimal amount typed by a customer.
/// Example: "50" -> 50, "12.5" -> 12.5, "RM10" -> 10
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    let input = input
        .strip_prefix(CURRENCY)
        .or_else(|| input.strip_prefix("rm"))
        .unwrap_or(input)
        .trim();

    let value = Decimal::from_str(input).map_err(|_| ParseAmountError::InvalidFormat)?;
    if value <= Decimal::ZERO {
        return Err(ParseAmountError::NotPositive);
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
    NotPositive,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "invalid money format"),
            ParseAmountError::NotPositive => write!(f, "amount must be positive"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
