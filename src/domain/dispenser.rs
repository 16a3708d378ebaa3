use rust_decimal::Decimal;

use super::Amount;

/// Position of a dispenser within the station, 0-based.
pub type DispenserId = usize;

/// Default tank capacity of a dispenser, in litres.
pub const DEFAULT_CAPACITY: Amount = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispenserStatus {
    /// Level at or above the minimum; purchases are accepted.
    Normal,
    /// Level below the minimum; purchases are refused until a refill.
    Low,
}

impl DispenserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispenserStatus::Normal => "normal",
            DispenserStatus::Low => "low",
        }
    }
}

impl std::fmt::Display for DispenserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fuel-serving unit. The level is kept within `0..=capacity`; the only
/// ways to change it are [`Dispenser::dispense`] and [`Dispenser::refill`].
#[derive(Debug, Clone)]
pub struct Dispenser {
    pub id: DispenserId,
    pub name: String,
    level: Amount,
    capacity: Amount,
}

impl Dispenser {
    /// Create a dispenser filled to capacity.
    pub fn new(id: DispenserId, name: impl Into<String>, capacity: Amount) -> Self {
        Self {
            id,
            name: name.into(),
            level: capacity,
            capacity,
        }
    }

    pub fn level(&self) -> Amount {
        self.level
    }

    pub fn status(&self, min_level: Amount) -> DispenserStatus {
        if self.level < min_level {
            DispenserStatus::Low
        } else {
            DispenserStatus::Normal
        }
    }

    /// Draw `litres` from the tank. Nothing changes when the tank holds less
    /// than requested.
    pub fn dispense(&mut self, litres: Amount) -> Result<Amount, DispenseError> {
        if litres <= Decimal::ZERO {
            return Err(DispenseError::NonPositive { requested: litres });
        }
        if litres > self.level {
            return Err(DispenseError::ExceedsLevel {
                requested: litres,
                available: self.level,
            });
        }
        self.level -= litres;
        Ok(self.level)
    }

    /// Top the tank up to capacity. Returns the litres added (zero when full).
    pub fn refill(&mut self) -> Amount {
        let added = self.capacity - self.level;
        self.level = self.capacity;
        added
    }

    #[cfg(test)]
    pub(crate) fn with_level(mut self, level: Amount) -> Self {
        self.level = level.clamp(Decimal::ZERO, self.capacity);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispenseError {
    NonPositive { requested: Amount },
    ExceedsLevel { requested: Amount, available: Amount },
}

impl std::fmt::Display for DispenseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispenseError::NonPositive { requested } => {
                write!(f, "cannot dispense {} litres", requested)
            }
            DispenseError::ExceedsLevel {
                requested,
                available,
            } => write!(
                f,
                "requested {} litres but only {} litres left",
                requested, available
            ),
        }
    }
}

impl std::error::Error for DispenseError {}
