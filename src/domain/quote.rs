use rust_decimal::Decimal;

use super::{Amount, FuelType, PriceTable};

/// How many litres a sum of money buys at the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub fuel: FuelType,
    pub price_per_litre: Amount,
    pub amount: Amount,
    pub litres: Amount,
}

/// Compute the litres bought by `amount` of money for `fuel`.
/// The amount must be positive and the price strictly positive.
pub fn quote(prices: &PriceTable, fuel: FuelType, amount: Amount) -> Result<Quote, QuoteError> {
    if amount <= Decimal::ZERO {
        return Err(QuoteError::NonPositiveAmount { amount });
    }

    let price_per_litre = prices.price(fuel);
    if price_per_litre <= Decimal::ZERO {
        return Err(QuoteError::NonPositivePrice {
            fuel,
            price: price_per_litre,
        });
    }

    let litres = amount
        .checked_div(price_per_litre)
        .ok_or(QuoteError::Overflow { amount })?;

    Ok(Quote {
        fuel,
        price_per_litre,
        amount,
        litres,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    NonPositiveAmount { amount: Amount },
    NonPositivePrice { fuel: FuelType, price: Amount },
    Overflow { amount: Amount },
}

impl std::fmt::Display for QuoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteError::NonPositiveAmount { amount } => {
                write!(f, "amount must be positive, got {}", amount)
            }
            QuoteError::NonPositivePrice { fuel, price } => {
                write!(f, "price for {} must be positive, got {}", fuel, price)
            }
            QuoteError::Overflow { amount } => {
                write!(f, "amount {} is too large to quote", amount)
            }
        }
    }
}

impl std::error::Error for QuoteError {}
