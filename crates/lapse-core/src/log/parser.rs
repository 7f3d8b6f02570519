//! Line-level record extraction.
//!
//! A record line carries a bracketed thread token somewhere in it, followed by a
//! `(sequence-session [entity])` block, the event name with its argument list, and the
//! measured duration:
//!
//! ```text
//! 2024-03-01 10:00:00.101 [1:100-AF01] DEBUG perf (100-7 [3]) readEvent(fd=3): 100 ms
//! ```
//!
//! Everything else in the line is ignored. Lines that are not valid UTF-8 or do not
//! contain the pattern yield no record. Numeric fields are ASCII digits only; digits
//! from other scripts do not match.

use super::types::EventRecord;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref RECORD_PATTERN: Regex = Regex::new(
        r"\[([0-9]+:[0-9]+-[A-F0-9]+)\].*?\(([0-9]+)-([0-9]+)\s+\[([0-9]+)\]\)\s+(\w+)\(.*?\):\s+([0-9]+)\s+ms"
    )
    .unwrap();
}

/// Why a line produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The line is not valid UTF-8
    Decode,
    /// The line does not contain a record
    NoMatch,
}

/// Result of feeding one raw line to the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Record(EventRecord),
    Skipped(SkipReason),
}

impl LineOutcome {
    pub fn into_record(self) -> Option<EventRecord> {
        match self {
            LineOutcome::Record(record) => Some(record),
            LineOutcome::Skipped(_) => None,
        }
    }
}

/// Parse a raw line, reporting why it was skipped when it holds no record
pub fn parse_line(line_index: usize, line: &[u8]) -> LineOutcome {
    let text = match std::str::from_utf8(line) {
        Ok(text) => text,
        Err(e) => {
            tracing::trace!("Line {} is not valid UTF-8: {}", line_index, e);
            return LineOutcome::Skipped(SkipReason::Decode);
        }
    };

    match RECORD_PATTERN.captures(text) {
        Some(caps) => match record_from_captures(line_index, &caps) {
            Some(record) => LineOutcome::Record(record),
            None => {
                tracing::trace!("Line {} has unrepresentable numeric fields", line_index);
                LineOutcome::Skipped(SkipReason::NoMatch)
            }
        },
        None => LineOutcome::Skipped(SkipReason::NoMatch),
    }
}

/// Parse a raw line into a record, or `None` if the line is skipped
pub fn parse(line_index: usize, line: &[u8]) -> Option<EventRecord> {
    parse_line(line_index, line).into_record()
}

/// Build a record from the first match. A numeric group that overflows `u64`
/// rejects the whole line.
fn record_from_captures(line_index: usize, caps: &Captures<'_>) -> Option<EventRecord> {
    let number = |group: usize| caps.get(group)?.as_str().parse::<u64>().ok();

    Some(EventRecord {
        line_index,
        thread_id: caps.get(1)?.as_str().to_string(),
        sequence: number(2)?,
        session_id: number(3)?,
        entity_id: number(4)?,
        event_type: caps.get(5)?.as_str().to_string(),
        duration_ms: number(6)?,
    })
}
