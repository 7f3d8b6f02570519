use super::analyze::print_bar_chart;
use super::{file_name, load_log};
use crate::OutputFormat;
use anyhow::Result;
use lapse_core::analysis::{
    AnalysisConfig, Analyzer, BarChart, GroupBy, SortMetric, SummaryAnalyzer, SummaryRow,
    ThreadView, summary_chart,
};
use std::path::Path;

/// Ranked summary of one thread, with optional chart of the top rows
#[derive(Debug, Clone, serde::Serialize)]
pub struct ThreadSummary {
    pub thread_id: String,
    pub group_by: GroupBy,
    pub sort_by: SortMetric,
    pub rows: Vec<SummaryRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<BarChart>,
}

pub fn summarize_file(
    file: &Path,
    thread: Option<&str>,
    group_by: GroupBy,
    sort_by: SortMetric,
    chart_metric: Option<SortMetric>,
    limit: usize,
) -> Result<ThreadSummary> {
    let log = load_log(file)?;
    let config = AnalysisConfig {
        thread: thread.map(str::to_string),
        ..Default::default()
    };
    let thread_id = config.resolve_thread(&log)?;
    let view = ThreadView::new(&log.records, &thread_id)?;

    let rows = SummaryAnalyzer::new(group_by, sort_by).analyze(&view)?;
    let chart = chart_metric.map(|metric| summary_chart(&rows, metric, limit));

    Ok(ThreadSummary {
        thread_id,
        group_by,
        sort_by,
        rows,
        chart,
    })
}

pub fn execute(
    file: &Path,
    thread: Option<&str>,
    group_by: GroupBy,
    sort_by: SortMetric,
    chart_metric: Option<SortMetric>,
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    tracing::info!("Summarizing log file: {}", file.display());

    let summary = summarize_file(file, thread, group_by, sort_by, chart_metric, limit)?;

    match format {
        OutputFormat::Json => output_json(&summary)?,
        OutputFormat::Table => output_table(&summary),
        OutputFormat::Pretty => output_pretty(&summary, file),
    }

    Ok(())
}

fn output_pretty(summary: &ThreadSummary, file: &Path) {
    use console::style;

    println!(
        "\n{}",
        style(format!("Duration Summary: {}", file_name(file)))
            .bold()
            .cyan()
    );
    println!(
        "  Thread {} by {}, sorted by {}\n",
        style(&summary.thread_id).green(),
        summary.group_by.as_str(),
        summary.sort_by.as_str()
    );

    println!(
        "  {:<24} {:>7} {:>14} {:>12} {:>12}",
        summary.group_by.as_str(),
        "Count",
        "Total (ms)",
        "Avg (ms)",
        "Max (ms)"
    );
    for row in &summary.rows {
        println!(
            "  {:<24} {:>7} {:>14} {:>12.2} {:>12}",
            row.key.to_string(),
            row.count,
            row.total_duration_ms,
            row.avg_duration_ms,
            row.max_duration_ms
        );
    }

    if let Some(chart) = &summary.chart {
        print_bar_chart(chart);
    }

    println!();
}

fn output_json(summary: &ThreadSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    println!("{}", json);
    Ok(())
}

fn output_table(summary: &ThreadSummary) {
    println!(
        "{},Count,Total Duration (ms),Avg Duration (ms),Max Duration (ms)",
        summary.group_by.as_str()
    );
    for row in &summary.rows {
        println!(
            "{},{},{},{:.2},{}",
            row.key, row.count, row.total_duration_ms, row.avg_duration_ms, row.max_duration_ms
        );
    }
}
