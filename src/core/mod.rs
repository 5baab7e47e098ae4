//! Pricing arithmetic, time helpers, path resolution and ledger services.

pub mod pricing;
pub mod services;
pub mod time;
pub mod utils;
