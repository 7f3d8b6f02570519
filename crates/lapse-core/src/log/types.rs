use serde::{Deserialize, Serialize};

/// A single duration measurement extracted from one log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Zero-based position of the source line in the input
    pub line_index: usize,
    pub thread_id: String,
    pub sequence: u64,
    pub session_id: u64,
    pub entity_id: u64,
    pub event_type: String,
    pub duration_ms: u64,
}

/// All records recovered from one input log, in line order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedLog {
    pub records: Vec<EventRecord>,
    /// Number of lines seen, including skipped ones
    pub line_count: usize,
}

impl ParsedLog {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
