mod aggregate;
mod anomaly;
mod report;
mod summary;
mod timeline;

pub use aggregate::{Aggregation, Groups, ThreadView, aggregate, mean, total};
pub use anomaly::{AnomalyDetector, AnomalyThresholds, FlaggedRecord, is_anomalous};
pub use report::{AnalysisConfig, AnalysisReport, Chart, ChartKind, analyze_log};
pub use summary::{
    BarChart, ChartBar, GroupTotal, SortMetric, SummaryAnalyzer, SummaryRow, TopTotalsAnalyzer,
    rank, summarize, summarize_groups, summary_chart, top_by_total,
};
pub use timeline::{Point, Series, Timeline, TimelineAnalyzer};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dimension used to group the records of a thread
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    EventType,
    Session,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::EventType => "Event Type",
            GroupBy::Session => "Session ID",
        }
    }
}

/// Key of a group of records
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupKey {
    Event(String),
    Session(u64),
    Thread(String),
}

impl GroupKey {
    /// Label used for chart series, e.g. `Session 7`
    pub fn label(&self) -> String {
        match self {
            GroupKey::Session(id) => format!("Session {}", id),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Event(name) | GroupKey::Thread(name) => f.write_str(name),
            GroupKey::Session(id) => write!(f, "{}", id),
        }
    }
}

/// A computation over the records of one thread
pub trait Analyzer {
    type Output;

    fn analyze(&self, view: &ThreadView<'_>) -> crate::Result<Self::Output>;
}
