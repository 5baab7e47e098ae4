//! Sales domain models and persistence-friendly types.

pub mod sale;

pub use sale::{PricedSale, SaleDraft, SalePreview, SalesRecord, Settlement, MONEY_SCALE};
