//! Calendar-day projections over sales records.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};

use crate::core::time::calendar_day;
use crate::domain::SalesRecord;
use crate::errors::{Result, SalesError};

/// Parses a filter target. Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, whose
/// calendar day is read in the ledger's `offset`.
pub fn parse_target_date(raw: &str, offset: FixedOffset) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|instant| calendar_day(instant.with_timezone(&Utc), offset))
        .map_err(|_| SalesError::InvalidDate(format!("`{trimmed}` is not a YYYY-MM-DD date")))
}

/// Records whose sale date falls on `target`, in input order.
pub fn filter_by_date(
    records: &[SalesRecord],
    target: &str,
    offset: FixedOffset,
) -> Result<Vec<SalesRecord>> {
    let day = parse_target_date(target, offset)?;
    Ok(filter_by_day(records, day))
}

pub fn filter_by_day(records: &[SalesRecord], day: NaiveDate) -> Vec<SalesRecord> {
    records
        .iter()
        .filter(|record| same_calendar_day(record.sale_date, day))
        .cloned()
        .collect()
}

fn same_calendar_day(left: NaiveDate, right: NaiveDate) -> bool {
    (left.year(), left.month(), left.day()) == (right.year(), right.month(), right.day())
}
