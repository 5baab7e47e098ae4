mod common;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use chrono::{FixedOffset, TimeZone, Utc};
use rust_decimal_macros::dec;
use sales_ledger::{
    errors::SaleField,
    storage::{MemoryRecordStore, RecordQuery, RecordStore, StoreError, StoredSale},
    LedgerSettings, SaleDraft, SalesError, SalesLedger, Settlement,
};
use tokio::sync::{oneshot, Notify};
use uuid::Uuid;

use common::{date, memory_ledger, step_clock, utc_settings};

#[tokio::test]
async fn create_prices_and_persists_the_sale() {
    let (ledger, store) = memory_ledger();
    let draft = SaleDraft::new("  Ana  ", 5, date(2024, 3, 1)).with_amount_paid(dec!(200));

    let record = ledger.create(draft).await.expect("create");

    assert_eq!(record.customer_name, "Ana");
    assert_eq!(record.total_due, dec!(450));
    assert_eq!(record.balance_remaining, dec!(250));
    assert_eq!(record.settlement(), Settlement::Pending);
    assert_eq!(store.len().await, 1);

    let cached = ledger.cached().await;
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].id, record.id);
    assert!(!ledger.is_stale().await);
}

#[tokio::test]
async fn overpayment_settles_without_negative_balance() {
    let (ledger, _store) = memory_ledger();
    let draft = SaleDraft::new("Ana", 2, date(2024, 3, 1)).with_amount_paid(dec!(500));

    let record = ledger.create(draft).await.expect("create");
    assert_eq!(record.balance_remaining, dec!(0));
    assert!(record.is_settled());
}

#[tokio::test]
async fn list_is_newest_first_and_stable() {
    let (ledger, _store) = memory_ledger();
    for name in ["Ana", "Luis", "Marta"] {
        ledger
            .create(SaleDraft::new(name, 1, date(2024, 3, 1)))
            .await
            .expect("create");
    }

    let first = ledger.list().await.expect("list");
    let second = ledger.list().await.expect("list again");

    let names: Vec<_> = first.iter().map(|r| r.customer_name.as_str()).collect();
    assert_eq!(names, vec!["Marta", "Luis", "Ana"]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn validation_reports_every_field_before_touching_the_store() {
    let (ledger, store) = memory_ledger();
    store.set_unavailable(true);

    let draft = SaleDraft::new("   ", 0, date(2024, 3, 1)).with_amount_paid(dec!(-5));
    let err = ledger.create(draft).await.expect_err("invalid draft");

    match err {
        SalesError::Validation(errors) => {
            assert!(errors.contains(SaleField::CustomerName));
            assert!(errors.contains(SaleField::Quantity));
            assert!(errors.contains(SaleField::AmountPaid));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn amount_with_too_many_decimals_is_rejected() {
    let (ledger, _store) = memory_ledger();
    let draft = SaleDraft::new("Ana", 1, date(2024, 3, 1)).with_amount_paid(dec!(10.125));

    let err = ledger.create(draft).await.expect_err("three decimals");
    assert!(matches!(err, SalesError::Validation(ref e) if e.contains(SaleField::AmountPaid)));
}

#[tokio::test]
async fn store_outage_surfaces_as_unavailable() {
    let (ledger, store) = memory_ledger();
    store.set_unavailable(true);

    let err = ledger
        .create(SaleDraft::new("Ana", 1, date(2024, 3, 1)))
        .await
        .expect_err("store offline");
    assert!(matches!(err, SalesError::StoreUnavailable(_)));

    let err = ledger.list().await.expect_err("store offline");
    assert!(matches!(err, SalesError::StoreUnavailable(_)));
}

#[tokio::test]
async fn update_recomputes_balance() {
    let (ledger, _store) = memory_ledger();
    let created = ledger
        .create(SaleDraft::new("Luis", 10, date(2024, 3, 1)))
        .await
        .expect("create");
    assert_eq!(created.balance_remaining, dec!(900));

    let draft = created.to_draft().with_amount_paid(dec!(900));
    let updated = ledger.update(created.id, draft).await.expect("update");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.total_due, dec!(900));
    assert_eq!(updated.balance_remaining, dec!(0));
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(ledger.cached().await[0].balance_remaining, dec!(0));
}

#[tokio::test]
async fn update_replaces_every_field() {
    let (ledger, _store) = memory_ledger();
    let created = ledger
        .create(
            SaleDraft::new("Ana", 2, date(2024, 3, 1))
                .with_amount_paid(dec!(50))
                .with_notes("entrega en tienda"),
        )
        .await
        .expect("create");

    let updated = ledger
        .update(created.id, SaleDraft::new("Ana Ruiz", 3, date(2024, 3, 4)))
        .await
        .expect("update");

    assert_eq!(updated.customer_name, "Ana Ruiz");
    assert_eq!(updated.notes, "");
    assert_eq!(updated.amount_paid, dec!(0));
    assert_eq!(updated.total_due, dec!(270));
    assert_eq!(updated.balance_remaining, dec!(270));
    assert_eq!(updated.sale_date, date(2024, 3, 4));
    assert_eq!(ledger.get_by_id(created.id).await.expect("get").notes, "");
}

#[tokio::test]
async fn update_of_unknown_id_is_not_found() {
    let (ledger, _store) = memory_ledger();
    let id = Uuid::new_v4();
    let err = ledger
        .update(id, SaleDraft::new("Ana", 1, date(2024, 3, 1)))
        .await
        .expect_err("unknown id");
    assert!(matches!(err, SalesError::NotFound(missing) if missing == id));
}

#[tokio::test]
async fn delete_then_get_and_delete_again_are_not_found() {
    let (ledger, _store) = memory_ledger();
    let record = ledger
        .create(SaleDraft::new("Ana", 1, date(2024, 3, 1)))
        .await
        .expect("create");

    ledger.delete(record.id).await.expect("delete");
    assert!(ledger.cached().await.is_empty());

    let err = ledger.get_by_id(record.id).await.expect_err("deleted");
    assert!(matches!(err, SalesError::NotFound(_)));

    let err = ledger.delete(record.id).await.expect_err("second delete");
    assert!(matches!(err, SalesError::NotFound(_)));
}

#[tokio::test]
async fn failed_refresh_leaves_cache_stale() {
    let inner = Arc::new(MemoryRecordStore::new());
    let store = Arc::new(ReloadFailingStore {
        inner,
        fail_find: AtomicBool::new(false),
    });
    let ledger = SalesLedger::new(store.clone(), common::utc_settings());
    assert!(ledger.is_stale().await);

    ledger
        .create(SaleDraft::new("Ana", 1, date(2024, 3, 1)))
        .await
        .expect("create");
    assert!(!ledger.is_stale().await);

    store.fail_find.store(true, Ordering::SeqCst);
    let record = ledger
        .create(SaleDraft::new("Luis", 1, date(2024, 3, 1)))
        .await
        .expect("write succeeds even though the reload fails");
    assert_eq!(record.customer_name, "Luis");
    assert!(ledger.is_stale().await);
    assert_eq!(ledger.cached().await.len(), 1);

    store.fail_find.store(false, Ordering::SeqCst);
    assert_eq!(ledger.list().await.expect("reload").len(), 2);
    assert!(!ledger.is_stale().await);
}

/// Accepts writes but can refuse full reloads.
struct ReloadFailingStore {
    inner: Arc<MemoryRecordStore>,
    fail_find: AtomicBool,
}

#[async_trait]
impl RecordStore for ReloadFailingStore {
    async fn find(&self, query: &RecordQuery) -> Result<Vec<StoredSale>, StoreError> {
        if self.fail_find.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reload refused".into()));
        }
        self.inner.find(query).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredSale>, StoreError> {
        self.inner.get(id).await
    }

    async fn save(&self, sale: StoredSale) -> Result<StoredSale, StoreError> {
        self.inner.save(sale).await
    }

    async fn destroy(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.destroy(id).await
    }
}

#[tokio::test]
async fn load_started_before_a_write_does_not_overwrite_the_cache() {
    let store = Arc::new(SlowReloadStore {
        inner: Arc::new(MemoryRecordStore::with_clock(step_clock())),
        gate: Mutex::new(None),
        entered: Notify::new(),
    });
    let ledger = Arc::new(SalesLedger::new(store.clone(), utc_settings()));
    ledger
        .create(SaleDraft::new("Ana", 1, date(2024, 3, 1)))
        .await
        .expect("create");

    let (release, gate) = oneshot::channel();
    *store.gate.lock().unwrap() = Some(gate);
    let slow = tokio::spawn({
        let ledger = Arc::clone(&ledger);
        async move { ledger.list().await }
    });
    store.entered.notified().await;

    ledger
        .create(SaleDraft::new("Luis", 1, date(2024, 3, 1)))
        .await
        .expect("create");
    assert_eq!(ledger.cached().await.len(), 2);

    release.send(()).unwrap();
    let outdated = slow.await.unwrap().expect("slow list");
    assert_eq!(outdated.len(), 1);
    assert_eq!(ledger.cached().await.len(), 2);
    assert!(!ledger.is_stale().await);
}

/// Snapshots the store, then holds the answer until released when a gate is armed.
struct SlowReloadStore {
    inner: Arc<MemoryRecordStore>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    entered: Notify,
}

#[async_trait]
impl RecordStore for SlowReloadStore {
    async fn find(&self, query: &RecordQuery) -> Result<Vec<StoredSale>, StoreError> {
        let snapshot = self.inner.find(query).await;
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            self.entered.notify_one();
            let _ = gate.await;
        }
        snapshot
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredSale>, StoreError> {
        self.inner.get(id).await
    }

    async fn save(&self, sale: StoredSale) -> Result<StoredSale, StoreError> {
        self.inner.save(sale).await
    }

    async fn destroy(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.destroy(id).await
    }
}

#[tokio::test]
async fn filter_ignores_stored_time_of_day() {
    let (ledger, store) = memory_ledger();
    let mut late = sample_document("Tarde");
    late.sale_date = Utc.with_ymd_and_hms(2024, 3, 1, 15, 30, 0).unwrap();
    store.save(late).await.expect("seed");

    let mut other = sample_document("Otro");
    other.sale_date = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
    store.save(other).await.expect("seed");

    ledger.list().await.expect("list");
    let matches = ledger.filter_by_date("2024-03-01").await.expect("filter");

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].customer_name, "Tarde");
    assert_eq!(matches[0].sale_date, date(2024, 3, 1));
}

#[tokio::test]
async fn filter_reads_timestamps_in_the_ledger_offset() {
    let store = Arc::new(MemoryRecordStore::with_clock(step_clock()));
    let settings = LedgerSettings {
        utc_offset: FixedOffset::west_opt(6 * 3600).unwrap(),
        ..utc_settings()
    };
    let ledger = SalesLedger::new(store, settings);
    ledger
        .create(SaleDraft::new("Ana", 1, date(2024, 3, 1)))
        .await
        .expect("create");

    // 02:00 UTC on the 2nd is still the evening of the 1st six hours west.
    let matches = ledger
        .filter_by_date("2024-03-02T02:00:00Z")
        .await
        .expect("filter");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].sale_date, date(2024, 3, 1));
    assert!(ledger
        .filter_by_date("2024-03-02")
        .await
        .expect("filter")
        .is_empty());
}

#[tokio::test]
async fn filter_rejects_unparseable_dates() {
    let (ledger, _store) = memory_ledger();
    let err = ledger.filter_by_date("March first").await.expect_err("bad date");
    assert!(matches!(err, SalesError::InvalidDate(_)));
}

#[tokio::test]
async fn report_sums_cached_sales() {
    let (ledger, _store) = memory_ledger();
    ledger
        .create(SaleDraft::new("Ana", 5, date(2024, 3, 1)).with_amount_paid(dec!(450)))
        .await
        .expect("create");
    ledger
        .create(SaleDraft::new("Luis", 10, date(2024, 3, 2)).with_amount_paid(dec!(300)))
        .await
        .expect("create");

    let generated_at = Utc.with_ymd_and_hms(2024, 3, 2, 18, 0, 0).unwrap();
    let report = ledger.report(generated_at).await.expect("report");

    assert_eq!(report.record_count, 2);
    assert_eq!(report.pending_count, 1);
    assert_eq!(report.totals.sum_total_due, "1350.00");
    assert_eq!(report.totals.sum_amount_paid, "750.00");
    assert_eq!(report.totals.sum_balance_remaining, "600.00");
    // Newest first: Luis was created last.
    assert_eq!(report.rows[0].customer_name, "Luis");
    assert_eq!(report.rows[0].settlement, Settlement::Pending);
    assert_eq!(report.rows[1].settlement, Settlement::Settled);
    assert_eq!(report.rows[1].sale_date, "1 de marzo de 2024");
    assert_eq!(report.generated_at, generated_at);
}

#[tokio::test]
async fn preview_handles_incomplete_drafts() {
    let (ledger, _store) = memory_ledger();
    let preview = ledger.preview(&SaleDraft::new("", 0, date(2024, 3, 1)));
    assert_eq!(preview.customer_name, None);
    assert_eq!(preview.total_due, dec!(0));

    let preview =
        ledger.preview(&SaleDraft::new("Ana", 3, date(2024, 3, 1)).with_amount_paid(dec!(100)));
    assert_eq!(preview.total_due, dec!(270));
    assert_eq!(preview.balance_remaining, dec!(170));
}

fn sample_document(name: &str) -> StoredSale {
    StoredSale {
        id: None,
        customer_name: name.into(),
        quantity: 1,
        sale_date: Utc::now(),
        amount_paid: dec!(0),
        notes: String::new(),
        total_due: dec!(90),
        balance_remaining: dec!(90),
        created_at: None,
        updated_at: None,
    }
}
