#![doc(test(attr(deny(warnings))))]

//! Sales Ledger tracks fixed-price unit sales: customer, quantity, payment and the
//! outstanding balance, with date filtering and report aggregation on top.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod report;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use crate::core::services::{LedgerSettings, SalesLedger};
pub use crate::domain::{SaleDraft, SalesRecord, Settlement};
pub use crate::errors::SalesError;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Sales Ledger tracing initialized.");
    });
}
