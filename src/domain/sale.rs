use chrono::{DateTime, Utc};

use super::{format_litres, format_ringgit, Amount, DispenserId, FuelType};

/// Sequential receipt number, starting at 1.
pub type ReceiptNumber = u64;

/// A completed sale. Sales are immutable: once built they are only read,
/// rendered and handed to a receipt sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    pub receipt_number: ReceiptNumber,
    pub dispenser_id: DispenserId,
    pub dispenser_name: String,
    pub fuel: FuelType,
    /// Litres dispensed, full precision.
    pub litres: Amount,
    pub price_per_litre: Amount,
    /// `litres * price_per_litre`, full precision.
    pub total_price: Amount,
    pub sold_at: DateTime<Utc>,
}

impl Sale {
    /// Build a sale. The total is derived from litres and price.
    pub fn new(
        receipt_number: ReceiptNumber,
        dispenser_id: DispenserId,
        dispenser_name: impl Into<String>,
        fuel: FuelType,
        litres: Amount,
        price_per_litre: Amount,
    ) -> Self {
        assert!(receipt_number > 0, "Receipt numbers start at 1");
        Self {
            receipt_number,
            dispenser_id,
            dispenser_name: dispenser_name.into(),
            fuel,
            litres,
            price_per_litre,
            total_price: litres * price_per_litre,
            sold_at: Utc::now(),
        }
    }

    /// Render the five-line receipt body.
    pub fn receipt_text(&self) -> String {
        format!(
            "Receipt Number: {}\nDispenser: {}\nFuel Type: {}\nLitres: {}\nTotal Price: {}\n",
            self.receipt_number,
            self.dispenser_name,
            self.fuel,
            format_litres(self.litres),
            format_ringgit(self.total_price),
        )
    }
}

impl std::fmt::Display for Sale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Filling up {} litres of {} at {}. Total price: {}",
            format_litres(self.litres),
            self.fuel,
            self.dispenser_name,
            format_ringgit(self.total_price)
        )
    }
}
