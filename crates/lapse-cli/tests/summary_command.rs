use lapse_core::analysis::{GroupBy, GroupKey, SortMetric};
use std::path::PathBuf;

/// Helper to get path to test fixtures
fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(filename)
}

#[test]
fn test_summary_by_session_sorted_by_total() {
    let summary = lapse_cli::commands::summary::summarize_file(
        &fixture_path("debug.txt"),
        None,
        GroupBy::Session,
        SortMetric::Total,
        None,
        10,
    )
    .unwrap();

    assert_eq!(summary.thread_id, "1:100-AF01");
    assert_eq!(summary.rows.len(), 2);
    assert_eq!(summary.rows[0].key, GroupKey::Session(8));
    assert_eq!(summary.rows[0].total_duration_ms, 2300);
    assert_eq!(summary.rows[1].key, GroupKey::Session(7));
    assert_eq!(summary.rows[1].count, 3);
    assert_eq!(summary.rows[1].avg_duration_ms, 90.0);
    assert!(summary.chart.is_none());
}

#[test]
fn test_summary_sorted_by_max() {
    let summary = lapse_cli::commands::summary::summarize_file(
        &fixture_path("debug.txt"),
        Some("2:200-BEEF"),
        GroupBy::EventType,
        SortMetric::Max,
        None,
        10,
    )
    .unwrap();

    let keys: Vec<String> = summary.rows.iter().map(|r| r.key.to_string()).collect();
    assert_eq!(keys, ["writeEvent", "readEvent"]);
}

#[test]
fn test_summary_chart_is_limited() {
    let summary = lapse_cli::commands::summary::summarize_file(
        &fixture_path("debug.txt"),
        None,
        GroupBy::EventType,
        SortMetric::Total,
        Some(SortMetric::Average),
        1,
    )
    .unwrap();

    let chart = summary.chart.expect("chart requested");
    assert_eq!(chart.title, "Top 1 Events by Avg Duration (ms)");
    assert_eq!(chart.bars.len(), 1);
    assert_eq!(chart.bars[0].key, GroupKey::Event("readEvent".to_string()));
    assert_eq!(chart.bars[0].value, 740.0);
}

#[test]
fn test_summary_execute_succeeds_for_every_format() {
    for format in [
        lapse_cli::OutputFormat::Pretty,
        lapse_cli::OutputFormat::Json,
        lapse_cli::OutputFormat::Table,
    ] {
        let result = lapse_cli::commands::summary::execute(
            &fixture_path("debug.txt"),
            None,
            GroupBy::EventType,
            SortMetric::Count,
            Some(SortMetric::Total),
            5,
            format,
        );
        assert!(result.is_ok(), "summary failed for {}", format.as_str());
    }
}
