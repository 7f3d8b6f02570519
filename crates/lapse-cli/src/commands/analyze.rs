use super::{file_name, load_log};
use crate::OutputFormat;
use anyhow::Result;
use lapse_core::analysis::{AnalysisConfig, AnalysisReport, BarChart, Chart, Timeline, analyze_log};
use std::path::Path;

const BAR_WIDTH: usize = 40;

/// Analyze a log file and return structured results
pub fn analyze_file(file: &Path, config: &AnalysisConfig) -> Result<AnalysisReport> {
    let log = load_log(file)?;
    Ok(analyze_log(&log, config)?)
}

pub fn execute(file: &Path, config: &AnalysisConfig, format: OutputFormat) -> Result<()> {
    tracing::info!("Analyzing log file: {}", file.display());

    let report = analyze_file(file, config)?;

    match format {
        OutputFormat::Json => output_json(&report)?,
        OutputFormat::Table => output_table(&report),
        OutputFormat::Pretty => output_pretty(&report, file),
    }

    Ok(())
}

fn output_pretty(report: &AnalysisReport, file: &Path) {
    use console::style;

    println!(
        "\n{}",
        style(format!("Log Analysis: {}", file_name(file))).bold().cyan()
    );
    println!();
    println!("{}", style("Overview").bold());
    println!("  Thread:       {}", style(&report.thread_id).green());
    println!("  Threads:      {}", report.thread_ids.join(", "));
    println!("  Records:      {}", style(report.records.len()).yellow());

    match &report.chart {
        Chart::Timeline(timeline) => print_timeline(timeline),
        Chart::Bar(bar) => print_bar_chart(bar),
    }

    if !report.anomalies.is_empty() {
        println!("\n{}", style("Detected Anomalies").bold().red());
        println!(
            "  {:>8}  {:<24} {:>8}  {:>13}",
            "Index", "Event", "Session", "Duration (ms)"
        );
        for record in &report.anomalies {
            println!(
                "  {:>8}  {:<24} {:>8}  {:>13}",
                record.line_index, record.event_type, record.session_id, record.duration_ms
            );
        }
    }

    println!("\n{}", style("Event Duration Summary").bold());
    println!(
        "  {:<24} {:>7} {:>14} {:>12} {:>12}",
        "Event", "Count", "Total (ms)", "Avg (ms)", "Max (ms)"
    );
    for row in &report.summary {
        println!(
            "  {:<24} {:>7} {:>14} {:>12.2} {:>12}",
            row.key.to_string(),
            row.count,
            row.total_duration_ms,
            row.avg_duration_ms,
            row.max_duration_ms
        );
    }

    println!();
}

fn print_timeline(timeline: &Timeline) {
    use console::style;

    println!("\n{}", style(&timeline.title).bold());
    for series in &timeline.series {
        let durations = series.points.iter().map(|p| p.duration_ms);
        match (durations.clone().min(), durations.max()) {
            (Some(min), Some(max)) => println!(
                "  {:<24} {:>6} points  {} to {} ms",
                series.label,
                series.points.len(),
                min,
                max
            ),
            _ => println!("  {:<24} {:>6} points", series.label, 0),
        }
    }
    if !timeline.anomalies.is_empty() {
        let indices: Vec<String> = timeline
            .anomalies
            .iter()
            .map(|p| p.line_index.to_string())
            .collect();
        println!(
            "  {:<24} {:>6} points  at lines {}",
            style("Anomaly").red(),
            timeline.anomalies.len(),
            indices.join(", ")
        );
    }
}

pub(crate) fn print_bar_chart(chart: &BarChart) {
    use console::style;

    println!("\n{}", style(&chart.title).bold());
    let max = chart.bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
    for bar in &chart.bars {
        let width = if max > 0.0 {
            ((bar.value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        println!(
            "  {:<24} {} {:.2}",
            bar.key.to_string(),
            style("█".repeat(width)).green(),
            bar.value
        );
    }
    println!("  {}", style(&chart.x_label).dim());
}

fn output_json(report: &AnalysisReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

fn output_table(report: &AnalysisReport) {
    println!("Index,Thread,Sequence,Session,Entity,Event,Duration (ms),Anomaly");
    for flagged in &report.records {
        let r = &flagged.record;
        println!(
            "{},{},{},{},{},{},{},{}",
            r.line_index,
            r.thread_id,
            r.sequence,
            r.session_id,
            r.entity_id,
            r.event_type,
            r.duration_ms,
            flagged.anomalous
        );
    }

    println!();
    println!("Event,Count,Total Duration (ms),Avg Duration (ms),Max Duration (ms)");
    for row in &report.summary {
        println!(
            "{},{},{},{:.2},{}",
            row.key, row.count, row.total_duration_ms, row.avg_duration_ms, row.max_duration_ms
        );
    }
}
