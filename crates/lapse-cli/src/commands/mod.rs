pub mod analyze;
pub mod anomalies;
pub mod completion;
pub mod summary;
pub mod threads;

use anyhow::Result;
use lapse_core::log::{LogReader, ParsedLog};
use std::path::Path;

/// Read and parse a log, failing when it holds no records
pub(crate) fn load_log(file: &Path) -> Result<ParsedLog> {
    tracing::debug!("Reading log file: {}", file.display());
    Ok(LogReader::from_file(file)?)
}

pub(crate) fn file_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
