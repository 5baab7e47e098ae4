use dirs::home_dir;
use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".sales_ledger";
const STORE_DIR: &str = "store";
const REPORTS_DIR: &str = "reports";

/// Returns the application data directory, defaulting to `~/.sales_ledger`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("SALES_LEDGER_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding the JSON record store under `base`.
pub fn store_dir_in(base: &std::path::Path) -> PathBuf {
    base.join(STORE_DIR)
}

/// Default destination for rendered reports under `base`.
pub fn reports_dir_in(base: &std::path::Path) -> PathBuf {
    base.join(REPORTS_DIR)
}
