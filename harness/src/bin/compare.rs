//! Method Comparison
//!
//! Runs every extraction method over the same workloads and thread count,
//! then names the fastest method per workload size.

use anyhow::Result;
use bench_stats::{group_digits, BenchmarkReport};
use clap::{CommandFactory, Parser};
use extract::Method;
use harness::{Harness, RawConfig};
use scoredoc::DEFAULT_SEED;
use std::io;
use std::process;

#[derive(Parser)]
#[command(name = "compare")]
#[command(version, about = "Compare all top-K extraction methods on the same workloads")]
struct Cli {
    /// Number of concurrent workers per method
    #[arg(allow_negative_numbers = true)]
    threads: i64,

    /// Item counts to benchmark
    #[arg(required = true, allow_negative_numbers = true)]
    sizes: Vec<i64>,

    /// Seed for the score generator
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Check every extraction against its ordering contract (untimed)
    #[arg(long)]
    verify: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("compare=info".parse()?)
                .add_directive("harness=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut harnesses = Vec::with_capacity(Method::ALL.len());
    for method in Method::ALL {
        let mut raw = RawConfig::new(method.name(), cli.threads, cli.sizes.clone());
        raw.seed = cli.seed;
        raw.verify = cli.verify;

        match Harness::from_raw(&raw) {
            Ok(harness) => harnesses.push(harness),
            Err(err) if err.is_config_error() => {
                eprintln!("{}\n", err);
                Cli::command().print_help()?;
                process::exit(2);
            }
            Err(err) => return Err(err.into()),
        }
    }

    println!("=== Method Comparison ===");
    println!("{} workers, seed {}\n", cli.threads, cli.seed);
    println!(
        "{:<16} {:>12} {:>12} {:>12}",
        "Method", "Items", "Median (ms)", "Items/ms"
    );
    println!("{:-<55}", "");

    let mut all: Vec<BenchmarkReport> = Vec::new();
    for harness in &harnesses {
        harness.run_each(|report| {
            println!(
                "{:<16} {:>12} {:>12} {:>12}",
                report.method,
                group_digits(report.workload_size as i64),
                group_digits(report.median_ms),
                group_digits(report.items_per_ms as i64),
            );
            all.push(report.clone());
        })?;
    }

    println!("\n=== Fastest ===");
    for &size in &workload_sizes(&all) {
        let best = all
            .iter()
            .filter(|r| r.workload_size == size)
            .min_by_key(|r| r.median_nanos);
        if let Some(best) = best {
            println!(
                "{:>12} items: {} ({} ms median)",
                group_digits(size as i64),
                best.method,
                group_digits(best.median_ms)
            );
        }
    }

    Ok(())
}

/// Workload sizes in first-seen order
fn workload_sizes(reports: &[BenchmarkReport]) -> Vec<usize> {
    let mut sizes = Vec::new();
    for report in reports {
        if !sizes.contains(&report.workload_size) {
            sizes.push(report.workload_size);
        }
    }
    sizes
}
