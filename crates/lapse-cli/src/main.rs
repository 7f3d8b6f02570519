use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use lapse_cli::commands;
use lapse_cli::{ChartArg, GroupByArg, OutputFormat, SortArg, ThresholdArgs};
use lapse_core::analysis::AnalysisConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lapse")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "A CLI tool for analyzing durations and anomalies in structured event logs",
    long_about = "Lapse reads event logs with per-operation durations, groups them by event type \
                  or session within a thread, ranks the slowest groups and flags records that \
                  run far above their event type's average."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// List the thread ids found in a log
    Threads {
        /// Path to the log file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Analyze one thread: chart data, anomalies and event summary
    Analyze {
        /// Path to the log file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Thread to analyze (defaults to the first thread id)
        #[arg(short, long)]
        thread: Option<String>,

        /// Chart to produce
        #[arg(long, value_enum, default_value_t = ChartArg::Timeline)]
        chart: ChartArg,

        /// Group records by event type or session
        #[arg(long, value_enum, default_value_t = GroupByArg::Event)]
        group_by: GroupByArg,

        /// Do not flag anomalies
        #[arg(long)]
        no_highlight: bool,

        #[command(flatten)]
        thresholds: ThresholdArgs,

        /// Sort the event summary by this metric
        #[arg(long, value_enum, default_value_t = SortArg::Total)]
        sort_by: SortArg,

        /// Number of groups in the bar chart
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Show per-group duration statistics for one thread
    Summary {
        /// Path to the log file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Thread to summarize (defaults to the first thread id)
        #[arg(short, long)]
        thread: Option<String>,

        /// Group records by event type or session
        #[arg(long, value_enum, default_value_t = GroupByArg::Event)]
        group_by: GroupByArg,

        /// Sort rows by this metric
        #[arg(long, value_enum, default_value_t = SortArg::Total)]
        sort_by: SortArg,

        /// Also chart the top rows on this metric
        #[arg(long, value_enum)]
        chart: Option<SortArg>,

        /// Number of rows to chart
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// List anomalous records of one thread
    Anomalies {
        /// Path to the log file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Thread to inspect (defaults to the first thread id)
        #[arg(short, long)]
        thread: Option<String>,

        #[command(flatten)]
        thresholds: ThresholdArgs,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match cli.command {
        Commands::Threads { file } => commands::threads::execute(&file, cli.format),
        Commands::Analyze {
            file,
            thread,
            chart,
            group_by,
            no_highlight,
            thresholds,
            sort_by,
            top,
        } => {
            let config = AnalysisConfig {
                thread,
                group_by: group_by.into(),
                chart: chart.into(),
                highlight_anomalies: !no_highlight,
                thresholds: thresholds.into(),
                sort_by: sort_by.into(),
                top_n: top,
            };
            commands::analyze::execute(&file, &config, cli.format)
        }
        Commands::Summary {
            file,
            thread,
            group_by,
            sort_by,
            chart,
            limit,
        } => commands::summary::execute(
            &file,
            thread.as_deref(),
            group_by.into(),
            sort_by.into(),
            chart.map(Into::into),
            limit,
            cli.format,
        ),
        Commands::Anomalies {
            file,
            thread,
            thresholds,
        } => commands::anomalies::execute(&file, thread.as_deref(), thresholds.into(), cli.format),
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("lapse=debug,lapse_cli=debug,lapse_core=debug")
    } else {
        EnvFilter::new("lapse=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
