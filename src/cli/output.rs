use colored::Colorize;
use std::fmt;

use crate::currency::format_money;
use crate::domain::{SalesRecord, Settlement};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "INFO",
        MessageKind::Success => "SUCCESS",
        MessageKind::Warning => "WARNING",
        MessageKind::Error => "ERROR",
        MessageKind::Section => "",
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let formatted = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        MessageKind::Info => text,
        _ => format!("{}: {}", label(kind), text),
    };

    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::Section => formatted.bold().to_string(),
        MessageKind::Info => formatted,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Error | MessageKind::Warning => eprintln!("{}", formatted),
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

const HEADERS: [&str; 7] = ["ID", "Customer", "Qty", "Total", "Paid", "Balance", "Date"];

fn sale_cells(record: &SalesRecord) -> [String; 7] {
    [
        record.id.to_string(),
        record.customer_name.clone(),
        record.quantity.to_string(),
        format_money(record.total_due),
        format_money(record.amount_paid),
        format_money(record.balance_remaining),
        record.sale_date.format("%Y-%m-%d").to_string(),
    ]
}

/// Renders sales as aligned rows. Settled rows are green and pending rows red.
pub fn render_sales_table(records: &[SalesRecord]) -> String {
    let rows: Vec<[String; 7]> = records.iter().map(sale_cells).collect();
    let mut widths: Vec<usize> = HEADERS.iter().map(|header| header.chars().count()).collect();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let layout = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(idx, (cell, width))| {
                // Numeric columns align right.
                if (2..=5).contains(&idx) {
                    format!("{:>width$}", cell, width = width)
                } else {
                    format!("{:<width$}", cell, width = width)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    let mut out = layout(&header).bold().to_string();
    out.push('\n');
    let rule_width = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    out.push_str(&"-".repeat(rule_width));

    for (record, cells) in records.iter().zip(&rows) {
        let line = layout(cells);
        let styled = match record.settlement() {
            Settlement::Settled => line.green().to_string(),
            Settlement::Pending => line.red().to_string(),
        };
        out.push('\n');
        out.push_str(&styled);
    }
    out
}

/// Multi-line detail view of one sale.
pub fn render_sale_detail(record: &SalesRecord) -> String {
    let mut lines = vec![
        format!("  ID        : {}", record.id),
        format!("  Customer  : {}", record.customer_name),
        format!("  Quantity  : {}", record.quantity),
        format!("  Total due : {}", format_money(record.total_due)),
        format!("  Paid      : {}", format_money(record.amount_paid)),
        format!("  Balance   : {}", format_money(record.balance_remaining)),
        format!("  Date      : {}", record.sale_date.format("%Y-%m-%d")),
        format!("  Status    : {}", record.settlement().label()),
    ];
    if !record.notes.is_empty() {
        lines.push(format!("  Notes     : {}", record.notes));
    }
    lines.join("\n")
}
