use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::MONEY_SCALE;

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const SPANISH_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Renders an amount with exactly two decimal places, rounding half away from zero.
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Formats dates for presentation.
pub trait DateFormatter: Send + Sync {
    fn format_date(&self, date: NaiveDate) -> String;
}

/// Long-form calendar date in a given language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongDateFormatter {
    English,
    Spanish,
    Iso,
}

impl LongDateFormatter {
    /// Picks a formatter from a BCP-47 style tag such as `es-MX` or `en_US`.
    pub fn for_locale(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "en" => LongDateFormatter::English,
            "es" => LongDateFormatter::Spanish,
            _ => LongDateFormatter::Iso,
        }
    }
}

impl DateFormatter for LongDateFormatter {
    fn format_date(&self, date: NaiveDate) -> String {
        let month = date.month0() as usize;
        match self {
            LongDateFormatter::English => {
                format!("{} {}, {}", ENGLISH_MONTHS[month], date.day(), date.year())
            }
            LongDateFormatter::Spanish => {
                format!("{} de {} de {}", date.day(), SPANISH_MONTHS[month], date.year())
            }
            LongDateFormatter::Iso => date.format("%Y-%m-%d").to_string(),
        }
    }
}
