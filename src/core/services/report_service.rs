//! Aggregates sales into display rows and grand totals for document renderers.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::pricing::DEFAULT_UNIT_PRICE;
use crate::currency::{format_money, DateFormatter, LongDateFormatter};
use crate::domain::{SalesRecord, Settlement};
use crate::errors::{Result, SalesError};

/// Inputs the aggregator needs besides the records themselves.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub unit_price: Decimal,
    pub locale: String,
    pub generated_at: DateTime<Utc>,
}

impl ReportOptions {
    pub fn new(unit_price: Decimal, locale: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            unit_price,
            locale: locale.into(),
            generated_at,
        }
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::new(DEFAULT_UNIT_PRICE, "es-MX", Utc::now())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub customer_name: String,
    pub quantity: i64,
    pub total_due: String,
    pub amount_paid: String,
    pub balance_remaining: String,
    pub sale_date: String,
    pub settlement: Settlement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub sum_total_due: String,
    pub sum_amount_paid: String,
    pub sum_balance_remaining: String,
}

/// Structure handed unchanged to a document renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub unit_price: String,
    pub generated_at: DateTime<Utc>,
    pub record_count: usize,
    pub pending_count: usize,
    pub rows: Vec<ReportRow>,
    pub totals: ReportTotals,
}

impl ReportData {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds rows in input order and sums every monetary column.
pub fn build_report(records: &[SalesRecord], options: &ReportOptions) -> Result<ReportData> {
    let formatter = LongDateFormatter::for_locale(&options.locale);
    let mut sum_total_due = Decimal::ZERO;
    let mut sum_amount_paid = Decimal::ZERO;
    let mut sum_balance_remaining = Decimal::ZERO;
    let mut rows = Vec::with_capacity(records.len());

    for record in records {
        sum_total_due = checked_sum(sum_total_due, record.total_due, "total_due")?;
        sum_amount_paid = checked_sum(sum_amount_paid, record.amount_paid, "amount_paid")?;
        sum_balance_remaining = checked_sum(
            sum_balance_remaining,
            record.balance_remaining,
            "balance_remaining",
        )?;
        rows.push(ReportRow {
            customer_name: record.customer_name.clone(),
            quantity: record.quantity,
            total_due: format_money(record.total_due),
            amount_paid: format_money(record.amount_paid),
            balance_remaining: format_money(record.balance_remaining),
            sale_date: formatter.format_date(record.sale_date),
            settlement: record.settlement(),
        });
    }

    let pending_count = rows
        .iter()
        .filter(|row| row.settlement == Settlement::Pending)
        .count();

    Ok(ReportData {
        unit_price: format_money(options.unit_price),
        generated_at: options.generated_at,
        record_count: rows.len(),
        pending_count,
        rows,
        totals: ReportTotals {
            sum_total_due: format_money(sum_total_due),
            sum_amount_paid: format_money(sum_amount_paid),
            sum_balance_remaining: format_money(sum_balance_remaining),
        },
    })
}

fn checked_sum(acc: Decimal, value: Decimal, column: &str) -> Result<Decimal> {
    acc.checked_add(value)
        .ok_or_else(|| SalesError::Render(format!("sum of {column} exceeds the representable range")))
}

/// File name for a rendered report, e.g. `report_2024-03-01.json`.
pub fn report_file_name(date: NaiveDate, extension: &str) -> String {
    format!("report_{}.{}", date.format("%Y-%m-%d"), extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn record(name: &str, quantity: i64, total: Decimal, paid: Decimal) -> SalesRecord {
        let now = Utc::now();
        SalesRecord {
            id: Uuid::new_v4(),
            customer_name: name.into(),
            quantity,
            sale_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            amount_paid: paid,
            notes: String::new(),
            total_due: total,
            balance_remaining: (total - paid).max(Decimal::ZERO),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn totals_and_flags_follow_records() {
        let records = vec![
            record("Ana", 5, dec!(450), dec!(450)),
            record("Luis", 10, dec!(900), dec!(300)),
        ];
        let report = build_report(&records, &ReportOptions::default()).expect("report");

        assert_eq!(report.totals.sum_total_due, "1350.00");
        assert_eq!(report.totals.sum_amount_paid, "750.00");
        assert_eq!(report.totals.sum_balance_remaining, "600.00");
        assert_eq!(report.rows[0].settlement, Settlement::Settled);
        assert_eq!(report.rows[1].settlement, Settlement::Pending);
        assert_eq!(report.pending_count, 1);
        assert_eq!(report.record_count, 2);
    }

    #[test]
    fn rows_keep_input_order_and_formatting() {
        let records = vec![
            record("Luis", 10, dec!(900), dec!(300)),
            record("Ana", 5, dec!(450), dec!(12.5)),
        ];
        let options = ReportOptions::new(dec!(90), "en-US", Utc::now());
        let report = build_report(&records, &options).expect("report");

        assert_eq!(report.rows[0].customer_name, "Luis");
        assert_eq!(report.rows[1].amount_paid, "12.50");
        assert_eq!(report.rows[1].total_due, "450.00");
        assert_eq!(report.rows[1].sale_date, "March 1, 2024");
        assert_eq!(report.unit_price, "90.00");
    }

    #[test]
    fn empty_input_produces_zero_totals() {
        let report = build_report(&[], &ReportOptions::default()).expect("report");
        assert!(report.is_empty());
        assert_eq!(report.totals.sum_total_due, "0.00");
        assert_eq!(report.totals.sum_balance_remaining, "0.00");
    }

    #[test]
    fn overflowing_totals_fail_instead_of_panicking() {
        let huge = Decimal::MAX;
        let records = vec![record("Ana", 1, huge, dec!(0)), record("Luis", 1, huge, dec!(0))];
        let err = build_report(&records, &ReportOptions::default()).expect_err("overflow");
        assert!(matches!(err, SalesError::Render(ref msg) if msg.contains("total_due")), "{err:?}");
    }

    #[test]
    fn file_name_embeds_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(report_file_name(date, "json"), "report_2024-03-01.json");
    }
}
