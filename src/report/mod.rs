//! Document renderers consuming [`ReportData`].

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;

use crate::core::services::{report_file_name, ReportData};
use crate::errors::{Result, SalesError};

/// Turns aggregated report data into document bytes.
pub trait DocumentRenderer: Send + Sync {
    fn extension(&self) -> &str;
    fn render(&self, report: &ReportData) -> Result<Vec<u8>>;
}

/// Exports the report as pretty-printed JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReportRenderer;

impl DocumentRenderer for JsonReportRenderer {
    fn extension(&self) -> &str {
        "json"
    }

    fn render(&self, report: &ReportData) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(report).map_err(|err| SalesError::Render(err.to_string()))
    }
}

/// Renders `report` into `dir/report_<today>.<ext>` and returns the written path.
pub fn write_report(
    renderer: &dyn DocumentRenderer,
    report: &ReportData,
    dir: &Path,
    today: NaiveDate,
) -> Result<PathBuf> {
    let bytes = renderer.render(report)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(today, renderer.extension()));
    let tmp = path.with_extension(format!("{}.tmp", renderer.extension()));
    let mut file = File::create(&tmp)?;
    file.write_all(&bytes)?;
    file.flush()?;
    fs::rename(&tmp, &path)?;
    tracing::info!(path = %path.display(), rows = report.record_count, "report written");
    Ok(path)
}
