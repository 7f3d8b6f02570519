use clap::{Args, ValueEnum};
use lapse_core::analysis::{AnomalyThresholds, ChartKind, GroupBy, SortMetric};

pub mod commands;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    Table,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Pretty => "pretty",
            OutputFormat::Json => "json",
            OutputFormat::Table => "table",
        }
    }
}

/// Grouping dimension for charts and summaries
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum GroupByArg {
    #[default]
    Event,
    Session,
}

impl From<GroupByArg> for GroupBy {
    fn from(arg: GroupByArg) -> Self {
        match arg {
            GroupByArg::Event => GroupBy::EventType,
            GroupByArg::Session => GroupBy::Session,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum SortArg {
    #[default]
    Total,
    Average,
    Max,
    Count,
}

impl From<SortArg> for SortMetric {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Total => SortMetric::Total,
            SortArg::Average => SortMetric::Average,
            SortArg::Max => SortMetric::Max,
            SortArg::Count => SortMetric::Count,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum ChartArg {
    #[default]
    Timeline,
    Bar,
}

impl From<ChartArg> for ChartKind {
    fn from(arg: ChartArg) -> Self {
        match arg {
            ChartArg::Timeline => ChartKind::Timeline,
            ChartArg::Bar => ChartKind::Bar,
        }
    }
}

/// Anomaly tunables shared by the commands that flag records
#[derive(Args, Clone, Copy, Debug)]
pub struct ThresholdArgs {
    /// Anomaly threshold as a multiple of the event type's average duration
    #[arg(long, env = "LAPSE_THRESHOLD", default_value_t = 3.0)]
    pub threshold: f64,

    /// Minimum duration in milliseconds for a record to count as an anomaly
    #[arg(long, env = "LAPSE_MIN_MS", default_value_t = 500.0)]
    pub min_ms: f64,
}

impl From<ThresholdArgs> for AnomalyThresholds {
    fn from(args: ThresholdArgs) -> Self {
        AnomalyThresholds {
            factor: args.threshold,
            min_duration_ms: args.min_ms,
        }
    }
}
