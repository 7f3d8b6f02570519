use super::{file_name, load_log};
use crate::OutputFormat;
use anyhow::Result;
use lapse_core::analysis::{GroupKey, aggregate, total};
use lapse_core::log::ParsedLog;
use std::path::Path;

/// A thread found in the log
#[derive(Debug, Clone, serde::Serialize)]
pub struct ThreadInfo {
    pub thread_id: String,
    pub record_count: usize,
    pub total_duration_ms: u128,
}

/// Distinct threads of a log, sorted by id
pub fn list_threads(log: &ParsedLog) -> Vec<ThreadInfo> {
    let aggregation = aggregate(&log.records);

    aggregation
        .thread_ids
        .iter()
        .filter_map(|id| {
            let group = aggregation.by_thread.get(&GroupKey::Thread(id.to_string()))?;
            Some(ThreadInfo {
                thread_id: id.to_string(),
                record_count: group.len(),
                total_duration_ms: total(group),
            })
        })
        .collect()
}

pub fn execute(file: &Path, format: OutputFormat) -> Result<()> {
    let log = load_log(file)?;
    let threads = list_threads(&log);

    tracing::debug!("Found {} threads", threads.len());

    match format {
        OutputFormat::Json => output_json(&threads)?,
        OutputFormat::Table => output_table(&threads),
        OutputFormat::Pretty => output_pretty(&threads, &log, file),
    }

    Ok(())
}

fn output_pretty(threads: &[ThreadInfo], log: &ParsedLog, file: &Path) {
    use console::style;

    println!(
        "\n{}",
        style(format!("Threads: {}", file_name(file))).bold().cyan()
    );
    println!(
        "  {} records from {} lines\n",
        style(log.len()).yellow(),
        log.line_count
    );

    for thread in threads {
        println!(
            "  {}  {} records, {} ms total",
            style(&thread.thread_id).green(),
            thread.record_count,
            thread.total_duration_ms
        );
    }

    println!();
}

fn output_json(threads: &[ThreadInfo]) -> Result<()> {
    let json = serde_json::to_string_pretty(threads)?;
    println!("{}", json);
    Ok(())
}

fn output_table(threads: &[ThreadInfo]) {
    println!("Thread,Records,Total Duration (ms)");
    for thread in threads {
        println!(
            "{},{},{}",
            thread.thread_id, thread.record_count, thread.total_duration_ms
        );
    }
}
