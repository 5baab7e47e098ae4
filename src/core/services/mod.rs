pub mod filter_service;
pub mod ledger_service;
pub mod report_service;

pub use filter_service::{filter_by_date, filter_by_day, parse_target_date};
pub use ledger_service::{LedgerSettings, SalesLedger};
pub use report_service::{
    build_report, report_file_name, ReportData, ReportOptions, ReportRow, ReportTotals,
};
