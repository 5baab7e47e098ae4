pub mod json_backend;
pub mod memory_backend;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::core::time::{calendar_day, midnight_utc};
use crate::domain::{PricedSale, SalesRecord};

pub use json_backend::{JsonRecordStore, STORE_SCHEMA_VERSION};
pub use memory_backend::MemoryRecordStore;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("record {0} does not exist")]
    Missing(Uuid),
    #[error("store data is corrupt: {0}")]
    Corrupt(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Ordering applied by [`RecordStore::find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    CreatedAtDescending,
    CreatedAtAscending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordQuery {
    pub order: SortOrder,
}

impl RecordQuery {
    pub fn newest_first() -> Self {
        Self {
            order: SortOrder::CreatedAtDescending,
        }
    }
}

/// Wire document exchanged with a record store. The sale date travels as a UTC instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSale {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub customer_name: String,
    pub quantity: i64,
    pub sale_date: DateTime<Utc>,
    pub amount_paid: Decimal,
    #[serde(default)]
    pub notes: String,
    pub total_due: Decimal,
    pub balance_remaining: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredSale {
    /// Encodes a priced sale, storing its date as midnight in `offset`.
    pub fn from_priced(id: Option<Uuid>, sale: PricedSale, offset: FixedOffset) -> Self {
        Self {
            id,
            customer_name: sale.customer_name,
            quantity: sale.quantity,
            sale_date: midnight_utc(sale.sale_date, offset),
            amount_paid: sale.amount_paid,
            notes: sale.notes,
            total_due: sale.total_due,
            balance_remaining: sale.balance_remaining,
            created_at: None,
            updated_at: None,
        }
    }

    /// Decodes a stored document, normalizing its date to a calendar day in `offset`.
    pub fn into_record(self, offset: FixedOffset) -> Result<SalesRecord> {
        let id = self
            .id
            .ok_or_else(|| StoreError::Corrupt("stored sale has no id".into()))?;
        let created_at = self
            .created_at
            .ok_or_else(|| StoreError::Corrupt(format!("sale {id} has no creation time")))?;
        Ok(SalesRecord {
            id,
            customer_name: self.customer_name,
            quantity: self.quantity,
            sale_date: calendar_day(self.sale_date, offset),
            amount_paid: self.amount_paid,
            notes: self.notes,
            total_due: self.total_due,
            balance_remaining: self.balance_remaining,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        })
    }
}

/// Abstraction over the remote persistence collaborator holding sales.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find(&self, query: &RecordQuery) -> Result<Vec<StoredSale>>;
    async fn get(&self, id: Uuid) -> Result<Option<StoredSale>>;
    /// Inserts when `id` is absent, otherwise overwrites. Assigns `id`/`created_at` on insert.
    async fn save(&self, sale: StoredSale) -> Result<StoredSale>;
    async fn destroy(&self, id: Uuid) -> Result<()>;
}

/// Orders documents for a query. Callers pass them oldest-inserted first; ties keep the
/// most recently inserted document ahead when sorting newest first.
pub(crate) fn sort_for_query(mut sales: Vec<StoredSale>, query: &RecordQuery) -> Vec<StoredSale> {
    match query.order {
        SortOrder::CreatedAtAscending => {
            sales.sort_by_key(|sale| sale.created_at);
        }
        SortOrder::CreatedAtDescending => {
            sales.reverse();
            sales.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
    }
    sales
}
