//! The sales ledger: validated CRUD over a record store plus a cached view.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::pricing::{PricingCalculator, DEFAULT_UNIT_PRICE};
use crate::core::services::filter_service;
use crate::core::services::report_service::{build_report, ReportData, ReportOptions};
use crate::core::time::local_offset;
use crate::domain::{SaleDraft, SalePreview, SalesRecord};
use crate::errors::{Result, SalesError};
use crate::storage::{RecordQuery, RecordStore, StoredSale};

/// Per-ledger pricing and calendar settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSettings {
    pub unit_price: Decimal,
    /// Offset whose midnight anchors stored sale dates.
    pub utc_offset: FixedOffset,
    pub locale: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            unit_price: DEFAULT_UNIT_PRICE,
            utc_offset: local_offset(),
            locale: "es-MX".into(),
        }
    }
}

#[derive(Debug)]
struct CacheState {
    records: Arc<Vec<SalesRecord>>,
    stale: bool,
    /// Bumped by every mutation; a load started under an older generation is not installed.
    generation: u64,
}

/// Caller-owned ledger context. Every write goes through the store and is followed by a
/// cache refresh; the cache is swapped wholesale so readers never see a partial list.
pub struct SalesLedger {
    store: Arc<dyn RecordStore>,
    settings: LedgerSettings,
    calculator: PricingCalculator,
    cache: RwLock<CacheState>,
}

impl SalesLedger {
    pub fn new(store: Arc<dyn RecordStore>, settings: LedgerSettings) -> Self {
        let calculator = PricingCalculator::new(settings.unit_price);
        Self {
            store,
            settings,
            calculator,
            cache: RwLock::new(CacheState {
                records: Arc::new(Vec::new()),
                stale: true,
                generation: 0,
            }),
        }
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    pub fn calculator(&self) -> &PricingCalculator {
        &self.calculator
    }

    /// Validates, prices and persists a new sale, returning the store-assigned record.
    pub async fn create(&self, draft: SaleDraft) -> Result<SalesRecord> {
        let priced = draft.price(&self.calculator)?;
        let document = StoredSale::from_priced(None, priced, self.settings.utc_offset);
        let saved = self.store.save(document).await?;
        let record = saved.into_record(self.settings.utc_offset)?;
        tracing::info!(
            id = %record.id,
            quantity = record.quantity,
            total_due = %record.total_due,
            balance_remaining = %record.balance_remaining,
            "sale created"
        );
        self.refresh_after_mutation().await;
        Ok(record)
    }

    /// Replaces every editable field of an existing sale and recomputes derived fields.
    pub async fn update(&self, id: Uuid, draft: SaleDraft) -> Result<SalesRecord> {
        let priced = draft.price(&self.calculator)?;
        self.fetch_existing(id).await?;
        let document = StoredSale::from_priced(Some(id), priced, self.settings.utc_offset);
        let saved = self.store.save(document).await?;
        let record = saved.into_record(self.settings.utc_offset)?;
        tracing::info!(
            id = %record.id,
            quantity = record.quantity,
            total_due = %record.total_due,
            balance_remaining = %record.balance_remaining,
            "sale updated"
        );
        self.refresh_after_mutation().await;
        Ok(record)
    }

    /// Destroys a sale. Deleting an id twice reports `NotFound` the second time.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.fetch_existing(id).await?;
        self.store.destroy(id).await?;
        tracing::info!(%id, "sale deleted");
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Reloads every sale, newest first, and replaces the cached view unless a mutation
    /// landed while the load was in flight.
    pub async fn list(&self) -> Result<Vec<SalesRecord>> {
        let started = self.cache.read().await.generation;
        let documents = self.store.find(&RecordQuery::newest_first()).await?;
        let records = documents
            .into_iter()
            .map(|document| document.into_record(self.settings.utc_offset))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        tracing::debug!(count = records.len(), "sales loaded");

        let mut cache = self.cache.write().await;
        if cache.generation == started {
            cache.records = Arc::new(records.clone());
            cache.stale = false;
        } else {
            tracing::debug!(
                started,
                current = cache.generation,
                "superseded sales load not cached"
            );
        }
        Ok(records)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<SalesRecord> {
        let document = self.fetch_existing(id).await?;
        Ok(document.into_record(self.settings.utc_offset)?)
    }

    /// Last loaded view of the store. Empty until the first successful `list`.
    pub async fn cached(&self) -> Arc<Vec<SalesRecord>> {
        Arc::clone(&self.cache.read().await.records)
    }

    /// True before the first load and whenever a post-mutation refresh failed.
    pub async fn is_stale(&self) -> bool {
        self.cache.read().await.stale
    }

    pub fn preview(&self, draft: &SaleDraft) -> SalePreview {
        SalePreview::of(draft, &self.calculator)
    }

    /// Cached sales that fall on the given `YYYY-MM-DD` day.
    pub async fn filter_by_date(&self, target: &str) -> Result<Vec<SalesRecord>> {
        let records = self.cached().await;
        filter_service::filter_by_date(&records, target, self.settings.utc_offset)
    }

    /// Report over the cached sales in their listed order.
    pub async fn report(&self, generated_at: DateTime<Utc>) -> Result<ReportData> {
        let records = self.cached().await;
        let options = ReportOptions::new(
            self.settings.unit_price,
            self.settings.locale.clone(),
            generated_at,
        );
        build_report(&records, &options)
    }

    async fn fetch_existing(&self, id: Uuid) -> Result<StoredSale> {
        self.store
            .get(id)
            .await?
            .ok_or(SalesError::NotFound(id))
    }

    async fn refresh_after_mutation(&self) {
        {
            let mut cache = self.cache.write().await;
            cache.generation = cache.generation.wrapping_add(1);
            cache.stale = true;
        }
        if let Err(err) = self.list().await {
            tracing::warn!(error = %err, "sales cache left stale after mutation");
        }
    }
}
