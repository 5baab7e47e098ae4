use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::storage::STORE_SCHEMA_VERSION;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first() {
        None => {
            help::print_overview(&context.registry);
            Ok(())
        }
        Some(name) => match context.registry.get(&name.to_lowercase()) {
            Some(entry) => {
                help::print_command(entry);
                Ok(())
            }
            None => Err(CommandError::UnknownCommand(name.to_string())),
        },
    }
}

fn cmd_version(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    let settings = context.ledger().settings();
    output::section(format!("Sales Ledger {}", meta.version));
    output::info(format!("  Store schema : v{}", STORE_SCHEMA_VERSION));
    output::info(format!("  Build hash   : {}", meta.git_hash));
    output::info(format!("  Built at     : {}", meta.timestamp));
    output::info(format!("  Profile      : {}", meta.profile));
    output::info(format!("  Unit price   : {}", settings.unit_price));
    output::info(format!("  Locale       : {}", settings.locale));
    output::info(format!("  Data dir     : {}", context.base_dir().display()));
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
