use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::time::{Clock, SystemClock};

use super::{sort_for_query, RecordQuery, RecordStore, Result, StoreError, StoredSale};

/// Volatile store kept in insertion order. Useful for tests and embedding.
pub struct MemoryRecordStore {
    sales: RwLock<Vec<StoredSale>>,
    clock: Arc<dyn Clock>,
    unavailable: AtomicBool,
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            sales: RwLock::new(Vec::new()),
            clock,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`] until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.sales.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sales.read().await.is_empty()
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store is offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find(&self, query: &RecordQuery) -> Result<Vec<StoredSale>> {
        self.ensure_available()?;
        let sales = self.sales.read().await.clone();
        Ok(sort_for_query(sales, query))
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredSale>> {
        self.ensure_available()?;
        let sales = self.sales.read().await;
        Ok(sales.iter().find(|sale| sale.id == Some(id)).cloned())
    }

    async fn save(&self, mut sale: StoredSale) -> Result<StoredSale> {
        self.ensure_available()?;
        let now = self.clock.now();
        let mut sales = self.sales.write().await;
        match sale.id {
            Some(id) => {
                let existing = sales
                    .iter_mut()
                    .find(|stored| stored.id == Some(id))
                    .ok_or(StoreError::Missing(id))?;
                sale.created_at = existing.created_at.or(Some(now));
                sale.updated_at = Some(now);
                *existing = sale.clone();
            }
            None => {
                sale.id = Some(Uuid::new_v4());
                sale.created_at = Some(now);
                sale.updated_at = Some(now);
                sales.push(sale.clone());
            }
        }
        Ok(sale)
    }

    async fn destroy(&self, id: Uuid) -> Result<()> {
        self.ensure_available()?;
        let mut sales = self.sales.write().await;
        let index = sales
            .iter()
            .position(|sale| sale.id == Some(id))
            .ok_or(StoreError::Missing(id))?;
        sales.remove(index);
        Ok(())
    }
}
