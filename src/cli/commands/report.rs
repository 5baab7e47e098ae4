use std::path::PathBuf;

use chrono::Utc;

use crate::cli::commands::sale::ensure_loaded;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::report::{write_report, JsonReportRenderer};

const REPORT_USAGE: &str = "report [dir]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "report",
        "Write a sales report for every recorded sale",
        REPORT_USAGE,
        cmd_report,
    )]
}

fn cmd_report(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let dir = match args {
        [] => context.config().resolve_report_dir(context.base_dir()),
        [dir] => PathBuf::from(*dir),
        _ => return Err(CommandError::usage(REPORT_USAGE)),
    };
    ensure_loaded(context)?;

    let report = context.block_on(context.ledger().report(Utc::now()))?;
    if report.is_empty() {
        output::warning("No sales recorded; the report has no rows.");
    }
    let path = write_report(&JsonReportRenderer, &report, &dir, context.today())?;
    output::success(format!(
        "Report with {} sale(s) ({} pending) written to {}",
        report.record_count,
        report.pending_count,
        path.display()
    ));
    output::info(format!(
        "Totals: due {}, paid {}, balance {}",
        report.totals.sum_total_due, report.totals.sum_amount_paid, report.totals.sum_balance_remaining
    ));
    Ok(())
}
