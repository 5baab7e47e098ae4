#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc, Mutex,
};

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;
use sales_ledger::{
    core::time::Clock, storage::MemoryRecordStore, LedgerSettings, SalesLedger,
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Returns a fresh directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Clock that advances one second on every reading.
pub struct StepClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl StepClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::seconds(tick)
    }
}

pub fn step_clock() -> Arc<StepClock> {
    Arc::new(StepClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    ))
}

pub fn utc_settings() -> LedgerSettings {
    LedgerSettings {
        unit_price: dec!(90),
        utc_offset: FixedOffset::east_opt(0).unwrap(),
        locale: "es-MX".into(),
    }
}

/// Ledger over a memory store, returning the store handle for direct manipulation.
pub fn memory_ledger() -> (SalesLedger, Arc<MemoryRecordStore>) {
    let store = Arc::new(MemoryRecordStore::with_clock(step_clock()));
    let ledger = SalesLedger::new(store.clone(), utc_settings());
    (ledger, store)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
