use sales_ledger::cli::{output, run_cli};

fn main() {
    sales_ledger::init();
    if let Err(err) = run_cli() {
        output::error(&err);
        std::process::exit(1);
    }
}
