//! Unit pricing and balance arithmetic.

use rust_decimal::Decimal;

use crate::errors::{Result, SalesError};

/// Price charged per unit when no configuration overrides it.
pub const DEFAULT_UNIT_PRICE: Decimal = Decimal::from_parts(90, 0, 0, false, 0);

/// Converts quantities into charges at a fixed unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingCalculator {
    unit_price: Decimal,
}

impl Default for PricingCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_UNIT_PRICE)
    }
}

impl PricingCalculator {
    pub fn new(unit_price: Decimal) -> Self {
        Self { unit_price }
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Returns `quantity × unit_price`. A product beyond `Decimal` range is rejected.
    pub fn compute_total(&self, quantity: i64) -> Result<Decimal> {
        if quantity < 1 {
            return Err(SalesError::InvalidQuantity(format!(
                "{quantity} is not a positive integer"
            )));
        }
        Decimal::from(quantity)
            .checked_mul(self.unit_price)
            .ok_or_else(|| {
                SalesError::InvalidQuantity(format!(
                    "{quantity} units at {} exceeds the representable total",
                    self.unit_price
                ))
            })
    }

    /// Returns `max(total - paid, 0)`; negative payments count as zero.
    pub fn compute_balance(&self, total: Decimal, paid: Decimal) -> Decimal {
        compute_balance(total, paid)
    }
}

pub fn compute_balance(total: Decimal, paid: Decimal) -> Decimal {
    let paid = paid.max(Decimal::ZERO);
    (total - paid).max(Decimal::ZERO)
}

/// Parses user-entered quantity text, accepting only positive integers.
pub fn parse_quantity(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    let quantity: i64 = trimmed
        .parse()
        .map_err(|_| SalesError::InvalidQuantity(format!("`{trimmed}` is not an integer")))?;
    if quantity < 1 {
        return Err(SalesError::InvalidQuantity(format!(
            "{quantity} is not a positive integer"
        )));
    }
    Ok(quantity)
}
