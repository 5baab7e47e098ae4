use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::storage::StoreError;

/// Editable sale fields that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleField {
    CustomerName,
    Quantity,
    AmountPaid,
    SaleDate,
}

impl SaleField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleField::CustomerName => "customer_name",
            SaleField::Quantity => "quantity",
            SaleField::AmountPaid => "amount_paid",
            SaleField::SaleDate => "sale_date",
        }
    }
}

impl fmt::Display for SaleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: SaleField,
    pub message: String,
}

/// Every field that failed validation for a single draft, in the order recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: SaleField, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> Vec<SaleField> {
        self.errors.iter().map(|err| err.field).collect()
    }

    pub fn contains(&self, field: SaleField) -> bool {
        self.errors.iter().any(|err| err.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Returns `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(SalesError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|err| format!("{}: {}", err.field, err.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Error type surfaced by every ledger, filter and report operation.
#[derive(Debug, Error)]
pub enum SalesError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("Sale not found: {0}")]
    NotFound(Uuid),
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Report rendering failed: {0}")]
    Render(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SalesError>;

impl From<StoreError> for SalesError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Missing(id) => SalesError::NotFound(id),
            other => SalesError::StoreUnavailable(other.to_string()),
        }
    }
}
