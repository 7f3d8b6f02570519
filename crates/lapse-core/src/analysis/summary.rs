use super::aggregate::{Groups, mean, total};
use super::{Analyzer, GroupBy, GroupKey, ThreadView};
use crate::Result;
use crate::log::EventRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Aggregate statistics of one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub key: GroupKey,
    pub count: usize,
    pub total_duration_ms: u128,
    /// Rounded to two decimals
    pub avg_duration_ms: f64,
    pub max_duration_ms: u64,
}

/// Metric used to order summary rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMetric {
    #[default]
    Total,
    Average,
    Max,
    Count,
}

impl SortMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMetric::Total => "Total Duration (ms)",
            SortMetric::Average => "Avg Duration (ms)",
            SortMetric::Max => "Max Duration (ms)",
            SortMetric::Count => "Count",
        }
    }

    pub fn value(&self, row: &SummaryRow) -> f64 {
        match self {
            SortMetric::Total => row.total_duration_ms as f64,
            SortMetric::Average => row.avg_duration_ms,
            SortMetric::Max => row.max_duration_ms as f64,
            SortMetric::Count => row.count as f64,
        }
    }

    fn compare(&self, a: &SummaryRow, b: &SummaryRow) -> Ordering {
        match self {
            SortMetric::Total => a.total_duration_ms.cmp(&b.total_duration_ms),
            SortMetric::Average => a.avg_duration_ms.total_cmp(&b.avg_duration_ms),
            SortMetric::Max => a.max_duration_ms.cmp(&b.max_duration_ms),
            SortMetric::Count => a.count.cmp(&b.count),
        }
    }
}

/// Summarize a non-empty group
pub fn summarize(key: GroupKey, group: &[&EventRecord]) -> SummaryRow {
    debug_assert!(!group.is_empty(), "summary of an empty group");

    SummaryRow {
        key,
        count: group.len(),
        total_duration_ms: total(group),
        avg_duration_ms: round_hundredths(mean(group)),
        max_duration_ms: group.iter().map(|r| r.duration_ms).max().unwrap_or(0),
    }
}

/// One summary row per group, in discovery order
pub fn summarize_groups(groups: &Groups<'_>) -> Vec<SummaryRow> {
    groups
        .iter()
        .map(|(key, group)| summarize(key.clone(), group))
        .collect()
}

/// Sort rows by `metric`, largest first. Ties keep their incoming order.
pub fn rank(mut rows: Vec<SummaryRow>, metric: SortMetric) -> Vec<SummaryRow> {
    rows.sort_by(|a, b| metric.compare(b, a));
    rows
}

/// Total duration of one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub key: GroupKey,
    pub total_duration_ms: u128,
}

/// The `k` groups with the largest total duration, largest first
pub fn top_by_total(groups: &Groups<'_>, k: usize) -> Vec<GroupTotal> {
    let mut totals: Vec<GroupTotal> = groups
        .iter()
        .map(|(key, group)| GroupTotal {
            key: key.clone(),
            total_duration_ms: total(group),
        })
        .collect();

    totals.sort_by(|a, b| b.total_duration_ms.cmp(&a.total_duration_ms));
    totals.truncate(k);
    totals
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBar {
    pub key: GroupKey,
    pub value: f64,
}

/// Horizontal bar chart data, first bar on top
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub bars: Vec<ChartBar>,
}

/// Chart of the first `top_n` rows (already ranked) on `metric`
pub fn summary_chart(rows: &[SummaryRow], metric: SortMetric, top_n: usize) -> BarChart {
    BarChart {
        title: format!("Top {} Events by {}", top_n, metric.as_str()),
        x_label: metric.as_str().to_string(),
        bars: rows
            .iter()
            .take(top_n)
            .map(|row| ChartBar {
                key: row.key.clone(),
                value: metric.value(row),
            })
            .collect(),
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Ranked summary rows for one grouping of a thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryAnalyzer {
    group_by: GroupBy,
    sort_by: SortMetric,
}

impl SummaryAnalyzer {
    pub fn new(group_by: GroupBy, sort_by: SortMetric) -> Self {
        Self { group_by, sort_by }
    }
}

impl Analyzer for SummaryAnalyzer {
    type Output = Vec<SummaryRow>;

    fn analyze(&self, view: &ThreadView<'_>) -> Result<Self::Output> {
        tracing::debug!(
            "Summarizing thread {} by {} sorted on {}",
            view.thread_id,
            self.group_by.as_str(),
            self.sort_by.as_str()
        );

        let rows = rank(summarize_groups(view.groups(self.group_by)), self.sort_by);

        tracing::info!("Summary complete: {} groups", rows.len());

        Ok(rows)
    }
}

/// Slowest groups of a thread by total duration
#[derive(Debug, Clone, Copy)]
pub struct TopTotalsAnalyzer {
    group_by: GroupBy,
    top_n: usize,
}

impl TopTotalsAnalyzer {
    pub fn new(group_by: GroupBy, top_n: usize) -> Self {
        Self { group_by, top_n }
    }
}

impl Default for TopTotalsAnalyzer {
    fn default() -> Self {
        Self::new(GroupBy::EventType, 10)
    }
}

impl Analyzer for TopTotalsAnalyzer {
    type Output = BarChart;

    fn analyze(&self, view: &ThreadView<'_>) -> Result<Self::Output> {
        let bars = top_by_total(view.groups(self.group_by), self.top_n)
            .into_iter()
            .map(|t| ChartBar {
                key: t.key,
                value: t.total_duration_ms as f64,
            })
            .collect();

        Ok(BarChart {
            title: format!("Top {} Slowest by {}", self.top_n, self.group_by.as_str()),
            x_label: "Total Duration (ms)".to_string(),
            bars,
        })
    }
}
