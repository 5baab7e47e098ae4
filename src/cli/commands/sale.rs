use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::pricing::parse_quantity;
use crate::core::services::parse_target_date;
use crate::currency::format_money;
use crate::domain::{SaleDraft, SalesRecord};
use crate::errors::{SaleField, ValidationErrors};

const ADD_USAGE: &str = "add <name> <quantity> [date] [paid] [notes]";
const EDIT_USAGE: &str = "edit <id> <name> <quantity> <date> <paid> [notes]";
const DELETE_USAGE: &str = "delete <id>";
const SHOW_USAGE: &str = "show <id>";
const FILTER_USAGE: &str = "filter <YYYY-MM-DD>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("add", "Record a new sale", ADD_USAGE, cmd_add),
        CommandEntry::new("edit", "Replace the fields of a sale", EDIT_USAGE, cmd_edit),
        CommandEntry::new("delete", "Delete a sale", DELETE_USAGE, cmd_delete),
        CommandEntry::new("show", "Show one sale", SHOW_USAGE, cmd_show),
        CommandEntry::new("list", "List sales, newest first", "list", cmd_list),
        CommandEntry::new("filter", "List sales made on one day", FILTER_USAGE, cmd_filter),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 || args.len() > 5 {
        return Err(CommandError::usage(ADD_USAGE));
    }
    let fields = DraftFields {
        name: args[0],
        quantity: args[1],
        date: args.get(2).copied(),
        paid: args.get(3).copied(),
        notes: args.get(4).copied(),
    };
    let draft = fields.into_draft(context)?;
    let record = context.block_on(context.ledger().create(draft))?;
    output::success(format!(
        "Sale {} recorded for {}: total {}, balance {}.",
        record.id,
        record.customer_name,
        format_money(record.total_due),
        format_money(record.balance_remaining)
    ));
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 5 || args.len() > 6 {
        return Err(CommandError::usage(EDIT_USAGE));
    }
    let id = parse_id(args[0])?;
    let fields = DraftFields {
        name: args[1],
        quantity: args[2],
        date: Some(args[3]),
        paid: Some(args[4]),
        notes: args.get(5).copied(),
    };
    let draft = fields.into_draft(context)?;
    let record = context.block_on(context.ledger().update(id, draft))?;
    output::success(format!(
        "Sale {} updated: total {}, balance {}.",
        record.id,
        format_money(record.total_due),
        format_money(record.balance_remaining)
    ));
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [raw] = args else {
        return Err(CommandError::usage(DELETE_USAGE));
    };
    let id = parse_id(raw)?;
    context.block_on(context.ledger().delete(id))?;
    output::success(format!("Sale {} deleted.", id));
    Ok(())
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [raw] = args else {
        return Err(CommandError::usage(SHOW_USAGE));
    };
    let id = parse_id(raw)?;
    let record = context.block_on(context.ledger().get_by_id(id))?;
    output::section(format!("Sale {}", record.id));
    output::info(output::render_sale_detail(&record));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if !args.is_empty() {
        return Err(CommandError::usage("list"));
    }
    let records = context.block_on(context.ledger().list())?;
    print_sales(&records);
    Ok(())
}

fn cmd_filter(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [target] = args else {
        return Err(CommandError::usage(FILTER_USAGE));
    };
    ensure_loaded(context)?;
    let records = context.block_on(context.ledger().filter_by_date(target))?;
    print_sales(&records);
    Ok(())
}

/// Loads the store into the ledger's cache unless a fresh view is already held.
pub(crate) fn ensure_loaded(context: &ShellContext) -> CommandResult {
    if context.block_on(context.ledger().is_stale()) {
        context.block_on(context.ledger().list())?;
    }
    Ok(())
}

fn print_sales(records: &[SalesRecord]) {
    if records.is_empty() {
        output::info("No sales recorded.");
        return;
    }
    output::info(output::render_sales_table(records));
    let pending = records.iter().filter(|record| !record.is_settled()).count();
    let outstanding: Decimal = records.iter().map(|record| record.balance_remaining).sum();
    output::info(format!(
        "{} sale(s), {} pending, {} outstanding.",
        records.len(),
        pending,
        format_money(outstanding)
    ));
}

fn parse_id(raw: &str) -> Result<Uuid, CommandError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| CommandError::InvalidArguments(format!("invalid sale id `{}`", raw)))
}

/// Raw sale arguments as typed on the command line.
struct DraftFields<'a> {
    name: &'a str,
    quantity: &'a str,
    date: Option<&'a str>,
    paid: Option<&'a str>,
    notes: Option<&'a str>,
}

impl DraftFields<'_> {
    /// Parses every field, reporting all unparseable ones together. Range checks are
    /// left to the ledger.
    fn into_draft(self, context: &ShellContext) -> Result<SaleDraft, CommandError> {
        let mut errors = ValidationErrors::new();

        let quantity = match parse_quantity(self.quantity) {
            Ok(quantity) => Some(quantity),
            Err(err) => {
                errors.push(SaleField::Quantity, err.to_string());
                None
            }
        };

        let sale_date = match self.date {
            None => Some(context.today()),
            Some(raw) => match parse_target_date(raw, context.ledger().settings().utc_offset) {
                Ok(date) => Some(date),
                Err(err) => {
                    errors.push(SaleField::SaleDate, err.to_string());
                    None
                }
            },
        };

        let amount_paid = match self.paid {
            None => Some(Decimal::ZERO),
            Some(raw) => match Decimal::from_str(raw.trim()) {
                Ok(amount) => Some(amount),
                Err(_) => {
                    errors.push(SaleField::AmountPaid, format!("`{}` is not an amount", raw));
                    None
                }
            },
        };

        match (quantity, sale_date, amount_paid) {
            (Some(quantity), Some(sale_date), Some(amount_paid)) => {
                Ok(SaleDraft::new(self.name, quantity, sale_date)
                    .with_amount_paid(amount_paid)
                    .with_notes(self.notes.unwrap_or_default()))
            }
            _ => {
                if self.name.trim().is_empty() {
                    errors.push(SaleField::CustomerName, "must not be empty");
                }
                errors.into_result()?;
                Err(CommandError::InvalidArguments("invalid sale fields".into()))
            }
        }
    }
}
