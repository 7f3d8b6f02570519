use super::{file_name, load_log};
use crate::OutputFormat;
use anyhow::Result;
use lapse_core::analysis::{
    AnalysisConfig, Analyzer, AnomalyDetector, AnomalyThresholds, ThreadView,
};
use lapse_core::log::EventRecord;
use std::path::Path;

#[derive(Debug, Clone, serde::Serialize)]
pub struct AnomalyReport {
    pub thread_id: String,
    pub thresholds: AnomalyThresholds,
    pub record_count: usize,
    pub anomalies: Vec<EventRecord>,
}

pub fn find_anomalies(
    file: &Path,
    thread: Option<&str>,
    thresholds: AnomalyThresholds,
) -> Result<AnomalyReport> {
    let log = load_log(file)?;
    let config = AnalysisConfig {
        thread: thread.map(str::to_string),
        thresholds,
        ..Default::default()
    };
    let thread_id = config.resolve_thread(&log)?;
    let view = ThreadView::new(&log.records, &thread_id)?;

    let flagged = AnomalyDetector::new(thresholds).analyze(&view)?;
    let record_count = flagged.len();
    let anomalies = flagged
        .into_iter()
        .filter(|f| f.anomalous)
        .map(|f| f.record)
        .collect();

    Ok(AnomalyReport {
        thread_id,
        thresholds,
        record_count,
        anomalies,
    })
}

pub fn execute(
    file: &Path,
    thread: Option<&str>,
    thresholds: AnomalyThresholds,
    format: OutputFormat,
) -> Result<()> {
    tracing::info!("Scanning log file for anomalies: {}", file.display());

    let report = find_anomalies(file, thread, thresholds)?;

    match format {
        OutputFormat::Json => output_json(&report)?,
        OutputFormat::Table => output_table(&report),
        OutputFormat::Pretty => output_pretty(&report, file),
    }

    Ok(())
}

fn output_pretty(report: &AnomalyReport, file: &Path) {
    use console::style;

    println!(
        "\n{}",
        style(format!("Anomalies: {}", file_name(file))).bold().cyan()
    );
    println!(
        "  Thread {}: duration > {} ms and > {} x event average\n",
        style(&report.thread_id).green(),
        report.thresholds.min_duration_ms,
        report.thresholds.factor
    );

    if report.anomalies.is_empty() {
        println!(
            "  {}",
            style(format!(
                "No anomalies among {} records",
                report.record_count
            ))
            .dim()
        );
        println!();
        return;
    }

    println!(
        "  {:>8}  {:<24} {:>8}  {:>13}",
        "Index", "Event", "Session", "Duration (ms)"
    );
    for record in &report.anomalies {
        println!(
            "  {:>8}  {:<24} {:>8}  {}",
            record.line_index,
            record.event_type,
            record.session_id,
            style(format!("{:>13}", record.duration_ms)).red()
        );
    }

    println!();
}

fn output_json(report: &AnomalyReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

fn output_table(report: &AnomalyReport) {
    println!("Index,Event,Session,Duration (ms)");
    for record in &report.anomalies {
        println!(
            "{},{},{},{}",
            record.line_index, record.event_type, record.session_id, record.duration_ms
        );
    }
}
