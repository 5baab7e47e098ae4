//! Shell context, dispatch, and CLI error types.

use std::{
    future::Future,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};

use crate::{
    config::{Config, ConfigError, ConfigManager},
    core::services::SalesLedger,
    errors::SalesError,
    storage::{JsonRecordStore, StoreError},
};

use super::commands;
use super::output;
use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    /// Commands are read line by line from stdin.
    Script,
    /// A single command taken from the process arguments.
    OneShot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("Unknown command `{0}`. Use `help` to list commands.")]
    UnknownCommand(String),
    #[error(transparent)]
    Sales(#[from] SalesError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("exit requested")]
    ExitRequested,
}

/// Failures that stop the shell itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Command(String),
}

pub struct ShellContext {
    pub(crate) registry: CommandRegistry,
    pub(crate) running: bool,
    runtime: Runtime,
    ledger: SalesLedger,
    config: Config,
    base_dir: PathBuf,
}

impl ShellContext {
    pub fn new() -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        Self::with_config_manager(&config_manager)
    }

    pub fn with_config_manager(config_manager: &ConfigManager) -> Result<Self, CliError> {
        let config = config_manager.load()?;
        let base_dir = config_manager.base_dir().to_path_buf();
        let store_dir = config.resolve_store_dir(&base_dir);
        let store = JsonRecordStore::new(store_dir, Some(config.backup_retention))?;
        let ledger = SalesLedger::new(Arc::new(store), config.ledger_settings());
        let runtime = Builder::new_current_thread().enable_all().build()?;

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        tracing::debug!(base = %base_dir.display(), "shell context ready");
        Ok(Self {
            registry,
            running: true,
            runtime,
            ledger,
            config,
            base_dir,
        })
    }

    pub(crate) fn ledger(&self) -> &SalesLedger {
        &self.ledger
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Runs a ledger future to completion on the shell's runtime.
    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Current calendar day in the ledger's offset.
    pub(crate) fn today(&self) -> NaiveDate {
        Utc::now()
            .with_timezone(&self.ledger.settings().utc_offset)
            .date_naive()
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let handler = self
            .registry
            .handler(command)
            .ok_or_else(|| CommandError::UnknownCommand(raw.to_string()))?;
        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::Io(err) => Err(CliError::Io(err)),
            other => {
                tracing::debug!(error = %other, "command failed");
                output::error(other);
                Ok(())
            }
        }
    }
}

impl CommandError {
    pub(crate) fn usage(usage: &str) -> Self {
        CommandError::InvalidArguments(format!("usage: {}", usage))
    }
}
