pub mod commands;
pub mod core;
mod help;
pub mod output;
pub mod registry;
mod shell;

pub use shell::run_cli;
