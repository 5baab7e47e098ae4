use std::io::{self, BufRead};

use shell_words::split;

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::help;

const SCRIPT_ENV: &str = "SALES_LEDGER_CLI_SCRIPT";

/// Entry point of the `sales_ledger_cli` binary.
///
/// With `SALES_LEDGER_CLI_SCRIPT` set, commands are read from stdin one per line.
/// Otherwise the process arguments form a single command.
pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::OneShot
    };

    let mut context = ShellContext::new()?;
    match mode {
        CliMode::Script => run_script(&mut context),
        CliMode::OneShot => {
            let args: Vec<String> = std::env::args().skip(1).collect();
            run_once(&mut context, &args)
        }
    }
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        match handle_line(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

fn run_once(context: &mut ShellContext, args: &[String]) -> Result<(), CliError> {
    let Some((raw, rest)) = args.split_first() else {
        help::print_overview(&context.registry);
        return Ok(());
    };
    let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
    let command = raw.to_lowercase();
    match context.dispatch(&command, raw, &rest) {
        Ok(_) => Ok(()),
        Err(CommandError::Io(err)) => Err(CliError::Io(err)),
        Err(err) => Err(CliError::Command(err.to_string())),
    }
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = parse_command_line(line)?;
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    if raw.starts_with('#') {
        return Ok(LoopControl::Continue);
    }

    let command = raw.to_lowercase();
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    match context.dispatch(&command, raw, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        other => other,
    }
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, CommandError> {
    split(input).map_err(|err| CommandError::InvalidArguments(err.to_string()))
}
