use super::parser::{LineOutcome, SkipReason, parse_line};
use super::types::ParsedLog;
use crate::{Error, Result};
use std::path::Path;

pub struct LogReader;

impl LogReader {
    /// Read and parse a log file from the given path
    pub fn from_file(path: &Path) -> Result<ParsedLog> {
        tracing::debug!("Reading log file from: {}", path.display());

        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Parse an already-loaded log.
    ///
    /// Lines are split on `\n` and keep their terminator. Lines that are not text or
    /// hold no record are skipped. Returns [`Error::NoValidEntries`] when no line at all
    /// yields a record.
    pub fn from_bytes(bytes: &[u8]) -> Result<ParsedLog> {
        let mut log = ParsedLog::default();
        let mut decode_skips = 0usize;
        let mut unmatched = 0usize;

        for (idx, line) in bytes.split_inclusive(|b| *b == b'\n').enumerate() {
            log.line_count += 1;
            match parse_line(idx, line) {
                LineOutcome::Record(record) => log.records.push(record),
                LineOutcome::Skipped(SkipReason::Decode) => decode_skips += 1,
                LineOutcome::Skipped(SkipReason::NoMatch) => unmatched += 1,
            }
        }

        tracing::debug!(
            "Skipped {} undecodable and {} unmatched lines",
            decode_skips,
            unmatched
        );

        if log.is_empty() {
            tracing::warn!("Log contains no valid entries ({} lines)", log.line_count);
            return Err(Error::NoValidEntries);
        }

        tracing::info!(
            "Successfully parsed {} records from {} lines",
            log.len(),
            log.line_count
        );

        Ok(log)
    }

    /// Parse a log held in a string
    pub fn from_str(content: &str) -> Result<ParsedLog> {
        Self::from_bytes(content.as_bytes())
    }
}
