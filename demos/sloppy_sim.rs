//! CLI driver for the sloppy counter simulation.
//!
//! Run with:
//! ```bash
//! cargo run --example sloppy_sim --features demo -- --workers 4 --sloppiness 5 --logging
//! ```
//!
//! Set `RUST_LOG=sciatto=debug` to see worker lifecycle events.

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use sciatto::config::SimConfig;
use sciatto::harness::{self, SimError};
use sciatto::observer::ProgressRecord;
use sciatto::render::{JsonRenderer, TableRenderer, TableStyle};

/// Output format for progress records and the final report.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// One-line plain text
    #[default]
    Plain,
    /// ASCII tables
    Table,
    /// One JSON document per record
    Json,
}

/// Sloppy counter simulation: worker threads batch increments locally and
/// flush to a shared total every `sloppiness` completed work units.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of worker threads
    #[arg(short, long, default_value = "2")]
    workers: usize,

    /// Units a worker batches locally before flushing
    #[arg(short, long, default_value = "10")]
    sloppiness: u64,

    /// Nominal duration of one work unit in milliseconds
    #[arg(short = 't', long, default_value = "10")]
    work_time: u64,

    /// Work units per worker
    #[arg(short, long, default_value = "100")]
    iterations: u64,

    /// Busy-spin instead of sleeping for each work unit
    #[arg(long)]
    cpu_bound: bool,

    /// Periodically print counter progress while the run is in flight
    #[arg(short, long)]
    logging: bool,

    /// Pin the RNG seed for reproducible I/O-bound timing
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    format: OutputFormat,
}

impl Args {
    fn to_config(&self) -> SimConfig {
        let mut config = SimConfig::default()
            .with_workers(self.workers)
            .with_sloppiness(self.sloppiness)
            .with_work_duration_ms(self.work_time)
            .with_iterations(self.iterations)
            .with_cpu_bound(self.cpu_bound)
            .with_logging(self.logging);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

fn print_progress(format: OutputFormat, record: &ProgressRecord) {
    match format {
        OutputFormat::Plain => {
            let pending: u64 = record.local.iter().sum();
            println!(
                "[{} ms] total={} pending={} local={:?}",
                record.elapsed_ms, record.shared_total, pending, record.local
            );
        }
        OutputFormat::Table => {
            println!("{}", TableRenderer::new().progress(record));
        }
        OutputFormat::Json => match JsonRenderer::new().render(record) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("render error: {err}"),
        },
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = args.to_config();

    println!(
        "Settings: workers={}, sloppiness={}, work_time={} ms, iterations={}, \
         cpu_bound={}, logging={}",
        config.worker_count,
        config.sloppiness,
        config.work_duration_ms,
        config.iterations_per_worker,
        config.cpu_bound,
        config.logging_enabled,
    );

    let format = args.format;
    let report = match harness::run_with_sink(&config, |record| print_progress(format, &record)) {
        Ok(report) => report,
        Err(err @ SimError::Config(_)) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("run aborted: {err}");
            return ExitCode::FAILURE;
        }
    };

    match format {
        OutputFormat::Plain => {
            println!("Final total: {} ({} ms)", report.final_total, report.elapsed_ms);
        }
        OutputFormat::Table => {
            println!("{}", TableRenderer::new().with_style(TableStyle::Rounded).report(&report));
        }
        OutputFormat::Json => match JsonRenderer::new().pretty(true).render(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("render error: {err}");
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}
