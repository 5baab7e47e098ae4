use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::pricing::PricingCalculator;
use crate::errors::{Result, SaleField, ValidationErrors};

/// Maximum number of decimal places accepted for monetary input.
pub const MONEY_SCALE: u32 = 2;

/// Caller-supplied editable fields for a sale. Derived fields are never part of a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleDraft {
    pub customer_name: String,
    pub quantity: i64,
    pub sale_date: NaiveDate,
    #[serde(default)]
    pub amount_paid: Decimal,
    #[serde(default)]
    pub notes: String,
}

impl SaleDraft {
    /// Builds a draft with no payment and no notes.
    pub fn new(customer_name: impl Into<String>, quantity: i64, sale_date: NaiveDate) -> Self {
        Self {
            customer_name: customer_name.into(),
            quantity,
            sale_date,
            amount_paid: Decimal::ZERO,
            notes: String::new(),
        }
    }

    pub fn with_amount_paid(mut self, amount_paid: Decimal) -> Self {
        self.amount_paid = amount_paid;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Collects every field violation instead of stopping at the first one.
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if self.customer_name.trim().is_empty() {
            errors.push(SaleField::CustomerName, "must not be empty");
        }
        if self.quantity < 1 {
            errors.push(
                SaleField::Quantity,
                format!("must be a positive integer, got {}", self.quantity),
            );
        }
        if self.amount_paid.is_sign_negative() && !self.amount_paid.is_zero() {
            errors.push(SaleField::AmountPaid, "must not be negative");
        } else if self.amount_paid.normalize().scale() > MONEY_SCALE {
            errors.push(
                SaleField::AmountPaid,
                format!("must have at most {MONEY_SCALE} decimal places"),
            );
        }
        errors.into_result()
    }

    /// Validates the draft and produces the priced, unpersisted sale.
    pub fn price(&self, calculator: &PricingCalculator) -> Result<PricedSale> {
        self.validate()?;
        let total_due = calculator.compute_total(self.quantity)?;
        let balance_remaining = calculator.compute_balance(total_due, self.amount_paid);
        Ok(PricedSale {
            customer_name: self.customer_name.trim().to_string(),
            quantity: self.quantity,
            sale_date: self.sale_date,
            amount_paid: self.amount_paid,
            notes: self.notes.trim().to_string(),
            total_due,
            balance_remaining,
        })
    }
}

/// A validated draft with its derived fields computed, ready to hand to a store.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedSale {
    pub customer_name: String,
    pub quantity: i64,
    pub sale_date: NaiveDate,
    pub amount_paid: Decimal,
    pub notes: String,
    pub total_due: Decimal,
    pub balance_remaining: Decimal,
}

/// One persisted sale as seen by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub id: Uuid,
    pub customer_name: String,
    pub quantity: i64,
    pub sale_date: NaiveDate,
    pub amount_paid: Decimal,
    #[serde(default)]
    pub notes: String,
    pub total_due: Decimal,
    pub balance_remaining: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SalesRecord {
    pub fn settlement(&self) -> Settlement {
        Settlement::of(self.balance_remaining)
    }

    pub fn is_settled(&self) -> bool {
        self.settlement() == Settlement::Settled
    }

    /// Editable fields of this record, suitable as the starting point of an update.
    pub fn to_draft(&self) -> SaleDraft {
        SaleDraft {
            customer_name: self.customer_name.clone(),
            quantity: self.quantity,
            sale_date: self.sale_date,
            amount_paid: self.amount_paid,
            notes: self.notes.clone(),
        }
    }
}

/// Whether a sale has been paid off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Settlement {
    Settled,
    Pending,
}

impl Settlement {
    pub fn of(balance_remaining: Decimal) -> Self {
        if balance_remaining.is_zero() {
            Settlement::Settled
        } else {
            Settlement::Pending
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Settlement::Settled => "settled",
            Settlement::Pending => "pending",
        }
    }
}

/// Live totals for a draft that may still be incomplete.
#[derive(Debug, Clone, PartialEq)]
pub struct SalePreview {
    pub customer_name: Option<String>,
    pub quantity: i64,
    pub total_due: Decimal,
    pub amount_paid: Decimal,
    pub balance_remaining: Decimal,
    pub settlement: Settlement,
}

impl SalePreview {
    pub fn of(draft: &SaleDraft, calculator: &PricingCalculator) -> Self {
        let total_due = calculator
            .compute_total(draft.quantity)
            .unwrap_or(Decimal::ZERO);
        let balance_remaining = calculator.compute_balance(total_due, draft.amount_paid);
        let name = draft.customer_name.trim();
        Self {
            customer_name: (!name.is_empty()).then(|| name.to_string()),
            quantity: draft.quantity.max(0),
            total_due,
            amount_paid: draft.amount_paid,
            balance_remaining,
            settlement: Settlement::of(balance_remaining),
        }
    }
}
