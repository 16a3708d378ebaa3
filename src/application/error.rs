use thiserror::Error;

use crate::domain::{format_litres, format_money, Amount, DispenserId, FuelType};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StationError {
    #[error("Invalid dispenser: {index} (station has {count} dispensers)")]
    InvalidDispenser { index: DispenserId, count: usize },

    #[error("Invalid fuel type: {0}")]
    InvalidFuelType(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid price for {fuel}: {}", money(.price))]
    InvalidPrice { fuel: FuelType, price: Amount },

    #[error(
        "Not enough petrol in {dispenser}: requested {} litres, {} litres available; topped up with {} litres",
        litres(.requested),
        litres(.available),
        litres(.refilled)
    )]
    InsufficientInventory {
        dispenser: String,
        requested: Amount,
        available: Amount,
        refilled: Amount,
    },

    #[error("Invalid station configuration: {0}")]
    Config(String),
}

fn litres(value: &Amount) -> String {
    format_litres(*value)
}

fn money(value: &Amount) -> String {
    format_money(*value)
}
