//! Top-K extraction benchmark runner
//!
//! Runs one extraction method on a pool of workers for each workload size
//! and prints the median time per size.

use anyhow::Result;
use clap::{CommandFactory, Parser, ValueEnum};
use harness::{Harness, RawConfig};
use std::io;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Csv,
}

#[derive(Parser)]
#[command(name = "topk-bench")]
#[command(version, about = "Benchmark top-K extraction of (id, score) pairs")]
#[command(after_help = "Methods: pq (priority-queue)  bounded priority queue, drained
         ip (in-place-sort)   in-place merge sort over parallel columns
         as (array-sort)      comparator sort over an array of records")]
struct Cli {
    /// Extraction method
    #[arg(required_unless_present = "config")]
    method: Option<String>,

    /// Number of concurrent workers
    #[arg(required_unless_present = "config", allow_negative_numbers = true)]
    threads: Option<i64>,

    /// Item counts to benchmark, run in the given order
    #[arg(allow_negative_numbers = true)]
    sizes: Vec<i64>,

    /// Read the whole request from a JSON file instead
    #[arg(short, long, conflicts_with_all = ["method", "threads", "sizes"])]
    config: Option<PathBuf>,

    /// Seed for the score generator
    #[arg(long)]
    seed: Option<u64>,

    /// Check every extraction against its ordering contract (untimed)
    #[arg(long)]
    verify: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

impl Cli {
    fn raw_config(&self) -> Result<RawConfig> {
        let mut raw = match &self.config {
            Some(path) => RawConfig::from_json_file(path)?,
            None => RawConfig::new(
                self.method.clone().unwrap_or_default(),
                self.threads.unwrap_or_default(),
                self.sizes.clone(),
            ),
        };
        if let Some(seed) = self.seed {
            raw.seed = seed;
        }
        raw.verify |= self.verify;
        Ok(raw)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("topk_bench=info".parse()?)
                .add_directive("harness=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let raw = cli.raw_config()?;

    let harness = match Harness::from_raw(&raw) {
        Ok(harness) => harness,
        Err(err) if err.is_config_error() => {
            eprintln!("{}\n", err);
            Cli::command().print_help()?;
            process::exit(2);
        }
        Err(err) => return Err(err.into()),
    };

    let config = harness.config();
    tracing::info!(seed = config.seed, verify = config.verify, "config loaded");

    match cli.format {
        Format::Text => {
            println!(
                "Starting {} threads with extraction method {} ({})",
                config.threads,
                config.method,
                config.method.description()
            );
            harness.run_each(|report| println!("{}", report.render_line()))?;
        }
        Format::Json => {
            let reports = harness.run()?;
            println!("{}", bench_stats::to_json(&reports)?);
        }
        Format::Csv => {
            let reports = harness.run()?;
            bench_stats::write_csv(&reports, io::stdout().lock())?;
        }
    }

    Ok(())
}
