use rust_decimal::Decimal;
use serde::Deserialize;

use super::{format_ringgit, Amount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuelType {
    Ron95,
    Ron97,
    Diesel,
}

impl FuelType {
    pub const ALL: [FuelType; 3] = [FuelType::Ron95, FuelType::Ron97, FuelType::Diesel];

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Ron95 => "ron95",
            FuelType::Ron97 => "ron97",
            FuelType::Diesel => "diesel",
        }
    }

    /// Label used in price summaries.
    pub fn label(&self) -> &'static str {
        match self {
            FuelType::Ron95 => "RON95",
            FuelType::Ron97 => "RON97",
            FuelType::Diesel => "Diesel",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ron95" => Some(FuelType::Ron95),
            "ron97" => Some(FuelType::Ron97),
            "diesel" => Some(FuelType::Diesel),
            _ => None,
        }
    }
}

impl std::fmt::Display for FuelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Price per litre for every fuel type. All three prices always travel
/// together: a table is replaced wholesale, never patched per fuel type.
///
/// The field names double as the price feed schema, so unknown keys are
/// rejected when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PriceTable {
    pub ron95: Amount,
    pub ron97: Amount,
    pub diesel: Amount,
}

impl PriceTable {
    pub fn new(ron95: Amount, ron97: Amount, diesel: Amount) -> Self {
        Self {
            ron95,
            ron97,
            diesel,
        }
    }

    /// Latest published reference prices (2017), used whenever the live feed
    /// cannot be read.
    pub fn fallback() -> Self {
        Self::new(
            Decimal::new(203, 2),
            Decimal::new(228, 2),
            Decimal::new(199, 2),
        )
    }

    pub fn price(&self, fuel: FuelType) -> Amount {
        match fuel {
            FuelType::Ron95 => self.ron95,
            FuelType::Ron97 => self.ron97,
            FuelType::Diesel => self.diesel,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FuelType, Amount)> {
        FuelType::ALL.into_iter().map(move |fuel| (fuel, self.price(fuel)))
    }
}

impl std::fmt::Display for PriceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (fuel, price)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} Price: {}", fuel.label(), format_ringgit(price))?;
        }
        Ok(())
    }
}

/// Where the current price table came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceOrigin {
    Live,
    /// The feed failed; the fallback table is in use. Carries the reason.
    Fallback(String),
}

impl PriceOrigin {
    pub fn is_fallback(&self) -> bool {
        matches!(self, PriceOrigin::Fallback(_))
    }
}
