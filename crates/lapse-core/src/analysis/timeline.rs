use super::{Analyzer, AnomalyDetector, GroupBy, GroupKey, ThreadView};
use crate::Result;
use serde::{Deserialize, Serialize};

/// One plotted measurement: line position against duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub line_index: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub key: GroupKey,
    pub label: String,
    pub points: Vec<Point>,
}

/// Scatter data for a thread. Anomalous records are pulled out of their group series
/// into `anomalies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub title: String,
    pub series: Vec<Series>,
    pub anomalies: Vec<Point>,
}

pub struct TimelineAnalyzer {
    group_by: GroupBy,
    detector: AnomalyDetector,
}

impl TimelineAnalyzer {
    pub fn new(group_by: GroupBy, detector: AnomalyDetector) -> Self {
        Self { group_by, detector }
    }
}

impl Analyzer for TimelineAnalyzer {
    type Output = Timeline;

    fn analyze(&self, view: &ThreadView<'_>) -> Result<Self::Output> {
        let mut anomalies = Vec::new();
        let mut series = Vec::new();

        for (key, group) in view.groups(self.group_by) {
            let mut points = Vec::with_capacity(group.len());
            for record in group {
                let point = Point {
                    line_index: record.line_index,
                    duration_ms: record.duration_ms,
                };
                if self.detector.check(view, record) {
                    anomalies.push(point);
                } else {
                    points.push(point);
                }
            }
            series.push(Series {
                key: key.clone(),
                label: key.label(),
                points,
            });
        }

        anomalies.sort_by_key(|p| p.line_index);

        Ok(Timeline {
            title: format!("Timeline (Thread: {})", view.thread_id),
            series,
            anomalies,
        })
    }
}
