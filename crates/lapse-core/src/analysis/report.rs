use super::{
    Analyzer, AnomalyDetector, AnomalyThresholds, BarChart, FlaggedRecord, GroupBy, SortMetric,
    SummaryAnalyzer, SummaryRow, ThreadView, Timeline, TimelineAnalyzer, TopTotalsAnalyzer,
    aggregate,
};
use crate::log::{EventRecord, ParsedLog};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Timeline,
    Bar,
}

/// Parameters of one analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Thread to analyze; the first thread id in sorted order when unset
    pub thread: Option<String>,
    pub group_by: GroupBy,
    pub chart: ChartKind,
    pub highlight_anomalies: bool,
    pub thresholds: AnomalyThresholds,
    pub sort_by: SortMetric,
    pub top_n: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thread: None,
            group_by: GroupBy::EventType,
            chart: ChartKind::Timeline,
            highlight_anomalies: true,
            thresholds: AnomalyThresholds::default(),
            sort_by: SortMetric::Total,
            top_n: 10,
        }
    }
}

impl AnalysisConfig {
    pub fn detector(&self) -> AnomalyDetector {
        if self.highlight_anomalies {
            AnomalyDetector::new(self.thresholds)
        } else {
            AnomalyDetector::disabled()
        }
    }

    /// The configured thread, or the first known thread id
    pub fn resolve_thread(&self, log: &ParsedLog) -> Result<String> {
        let aggregation = aggregate(&log.records);

        match &self.thread {
            Some(thread) if aggregation.thread_ids.contains(thread.as_str()) => {
                Ok(thread.clone())
            }
            Some(thread) => Err(Error::UnknownThread(thread.clone())),
            None => aggregation
                .thread_ids
                .first()
                .map(|id| id.to_string())
                .ok_or(Error::NoValidEntries),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Timeline(Timeline),
    Bar(BarChart),
}

/// Everything derived for the active thread in one pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub thread_id: String,
    pub thread_ids: Vec<String>,
    pub group_by: GroupBy,
    pub records: Vec<FlaggedRecord>,
    pub chart: Chart,
    /// Empty unless anomaly highlighting is on
    pub anomalies: Vec<EventRecord>,
    /// Event types of the thread, ranked by the configured metric
    pub summary: Vec<SummaryRow>,
}

/// Run a full analysis of `log` for the configured thread
pub fn analyze_log(log: &ParsedLog, config: &AnalysisConfig) -> Result<AnalysisReport> {
    if log.is_empty() {
        return Err(Error::NoValidEntries);
    }

    let thread_ids: Vec<String> = aggregate(&log.records)
        .thread_ids
        .into_iter()
        .map(str::to_string)
        .collect();
    let thread_id = config.resolve_thread(log)?;

    tracing::debug!(
        "Analyzing thread {} ({} threads in log)",
        thread_id,
        thread_ids.len()
    );

    let view = ThreadView::new(&log.records, &thread_id)?;
    let detector = config.detector();

    let records = detector.analyze(&view)?;
    let anomalies = records
        .iter()
        .filter(|f| f.anomalous)
        .map(|f| f.record.clone())
        .collect();

    let chart = match config.chart {
        ChartKind::Timeline => {
            Chart::Timeline(TimelineAnalyzer::new(config.group_by, detector).analyze(&view)?)
        }
        ChartKind::Bar => {
            Chart::Bar(TopTotalsAnalyzer::new(config.group_by, config.top_n).analyze(&view)?)
        }
    };

    let summary = SummaryAnalyzer::new(GroupBy::EventType, config.sort_by).analyze(&view)?;

    tracing::info!(
        "Analysis complete: thread {}, {} records, {} event types",
        thread_id,
        records.len(),
        summary.len()
    );

    Ok(AnalysisReport {
        thread_id,
        thread_ids,
        group_by: config.group_by,
        records,
        chart,
        anomalies,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::GroupKey;
    use crate::log::LogReader;

    const LOG: &str = "2024-03-01 10:00:00.101 [2:200-BEEF] (1-9 [1]) readEvent(fd=3): 40 ms\n\
                       2024-03-01 10:00:00.102 [1:100-AF01] (2-7 [3]) readEvent(fd=3): 100 ms\n\
                       2024-03-01 10:00:00.103 [1:100-AF01] (3-7 [3]) readEvent(fd=3): 120 ms\n\
                       2024-03-01 10:00:00.104 startup complete\n\
                       2024-03-01 10:00:00.105 [1:100-AF01] (4-8 [4]) writeEvent(fd=4): 300 ms\n\
                       2024-03-01 10:00:00.106 [1:100-AF01] (5-8 [3]) readEvent(fd=3): 2000 ms\n";

    #[test]
    fn test_default_thread_is_first_sorted() {
        let log = LogReader::from_str(LOG).unwrap();
        let report = analyze_log(&log, &AnalysisConfig::default()).unwrap();

        assert_eq!(report.thread_ids, ["1:100-AF01", "2:200-BEEF"]);
        assert_eq!(report.thread_id, "1:100-AF01");
        assert_eq!(report.records.len(), 4);
        assert!(report.records.iter().all(|f| f.record.thread_id == "1:100-AF01"));
    }

    #[test]
    fn test_unknown_thread_is_rejected() {
        let log = LogReader::from_str(LOG).unwrap();
        let config = AnalysisConfig {
            thread: Some("9:9-FF".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            analyze_log(&log, &config),
            Err(Error::UnknownThread(_))
        ));
    }

    #[test]
    fn test_empty_log_is_rejected() {
        let result = analyze_log(&ParsedLog::default(), &AnalysisConfig::default());
        assert!(matches!(result, Err(Error::NoValidEntries)));
    }

    #[test]
    fn test_summary_and_anomalies_are_thread_scoped() {
        let log = LogReader::from_str(LOG).unwrap();
        let config = AnalysisConfig {
            thresholds: AnomalyThresholds {
                factor: 2.0,
                min_duration_ms: 500.0,
            },
            ..Default::default()
        };
        let report = analyze_log(&log, &config).unwrap();

        assert_eq!(report.summary.len(), 2);
        let read = &report.summary[0];
        assert_eq!(read.key, GroupKey::Event("readEvent".into()));
        assert_eq!(read.count, 3);
        assert_eq!(read.total_duration_ms, 2220);
        assert_eq!(read.avg_duration_ms, 740.0);

        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.anomalies[0].line_index, 5);
    }

    #[test]
    fn test_highlight_off_hides_anomalies() {
        let log = LogReader::from_str(LOG).unwrap();
        let config = AnalysisConfig {
            highlight_anomalies: false,
            thresholds: AnomalyThresholds {
                factor: 2.0,
                min_duration_ms: 500.0,
            },
            ..Default::default()
        };
        let report = analyze_log(&log, &config).unwrap();

        assert!(report.anomalies.is_empty());
        match report.chart {
            Chart::Timeline(timeline) => {
                assert!(timeline.anomalies.is_empty());
                let points: usize = timeline.series.iter().map(|s| s.points.len()).sum();
                assert_eq!(points, 4);
            }
            Chart::Bar(_) => panic!("expected timeline chart"),
        }
    }

    #[test]
    fn test_bar_chart_by_session() {
        let log = LogReader::from_str(LOG).unwrap();
        let config = AnalysisConfig {
            chart: ChartKind::Bar,
            group_by: GroupBy::Session,
            ..Default::default()
        };
        let report = analyze_log(&log, &config).unwrap();

        match report.chart {
            Chart::Bar(bar) => {
                assert_eq!(bar.title, "Top 10 Slowest by Session ID");
                assert_eq!(bar.bars.len(), 2);
                assert_eq!(bar.bars[0].key, GroupKey::Session(8));
                assert_eq!(bar.bars[0].value, 2300.0);
                assert_eq!(bar.bars[1].value, 220.0);
            }
            Chart::Timeline(_) => panic!("expected bar chart"),
        }
    }

    #[test]
    fn test_report_serializes() {
        let log = LogReader::from_str(LOG).unwrap();
        let report = analyze_log(&log, &AnalysisConfig::default()).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["chart"]["kind"], "timeline");
        assert_eq!(json["records"][0]["event_type"], "readEvent");
        assert_eq!(json["records"][0]["anomalous"], false);
        assert_eq!(json["summary"][0]["key"], "readEvent");
    }
}
