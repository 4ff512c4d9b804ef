//! Extraction Benchmark Harness
//!
//! Runs one extraction method on a fixed pool of workers, one job per worker
//! per workload size, and reduces the per-worker timings to a median.
//!
//! Each workload size goes through dispatch, a barrier on every worker's
//! result, aggregation and reporting before the next size starts.

use bench_stats::{BenchmarkReport, RunResult, Timings};
use extract::Method;
use scoredoc::{ScoreGenerator, DEFAULT_SEED};
use serde::Deserialize;
use std::any::Any;
use std::hint::black_box;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("invalid configuration: {field} = {value}: {reason}")]
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    UnknownMethod(#[from] extract::ParseMethodError),

    #[error("worker {worker_id} failed running {method} on {workload} items: {reason}")]
    WorkerFailed {
        method: Method,
        workload: usize,
        worker_id: usize,
        reason: String,
    },

    #[error("failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl BenchError {
    /// Raised before anything was dispatched; the caller should show usage
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BenchError::InvalidConfig { .. } | BenchError::UnknownMethod(_)
        )
    }
}

pub type BenchResult<T> = Result<T, BenchError>;

fn default_seed() -> u64 {
    DEFAULT_SEED
}

/// Unvalidated benchmark request, as given on the command line or in JSON
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawConfig {
    pub method: String,
    pub threads: i64,
    pub workload_sizes: Vec<i64>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub verify: bool,
}

impl RawConfig {
    pub fn new(method: impl Into<String>, threads: i64, workload_sizes: Vec<i64>) -> Self {
        Self {
            method: method.into(),
            threads,
            workload_sizes,
            seed: DEFAULT_SEED,
            verify: false,
        }
    }

    pub fn from_json_file(path: &Path) -> BenchResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| BenchError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn validate(&self) -> BenchResult<BenchConfig> {
        let method: Method = self.method.parse()?;

        let threads = usize::try_from(self.threads)
            .ok()
            .filter(|&t| t >= 1)
            .ok_or_else(|| BenchError::InvalidConfig {
                field: "threads".to_string(),
                value: self.threads.to_string(),
                reason: "must be a positive integer".to_string(),
            })?;

        if self.workload_sizes.is_empty() {
            return Err(BenchError::InvalidConfig {
                field: "workload_sizes".to_string(),
                value: "[]".to_string(),
                reason: "at least one workload size is required".to_string(),
            });
        }

        let mut workload_sizes = Vec::with_capacity(self.workload_sizes.len());
        for (i, &size) in self.workload_sizes.iter().enumerate() {
            if size < 1 || size > i64::from(u32::MAX) {
                return Err(BenchError::InvalidConfig {
                    field: format!("workload_sizes[{}]", i),
                    value: size.to_string(),
                    reason: format!("must be between 1 and {}", u32::MAX),
                });
            }
            workload_sizes.push(size as usize);
        }

        Ok(BenchConfig {
            method,
            threads,
            workload_sizes,
            seed: self.seed,
            verify: self.verify,
        })
    }
}

/// Validated benchmark request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    pub method: Method,
    pub threads: usize,
    pub workload_sizes: Vec<usize>,
    pub seed: u64,
    pub verify: bool,
}

/// One full measurement: extract (timed), optionally verify (untimed), then
/// time the generation-only baseline and subtract it.
pub fn run_worker(
    method: Method,
    seed: u64,
    count: usize,
    verify: bool,
    worker_id: usize,
) -> Result<RunResult, String> {
    let items = u32::try_from(count)
        .map_err(|_| format!("{} items exceeds the id range ({} max)", count, u32::MAX))?;

    let started = Instant::now();
    let ranked = method.extract(ScoreGenerator::new(seed, items));
    let gross = started.elapsed();
    black_box(&ranked);

    if verify {
        method.verify(&ranked, count).map_err(|e| e.to_string())?;
    }
    drop(ranked);

    let baseline = extract::baseline::measure(seed, items);
    Ok(RunResult::from_durations(worker_id, gross, baseline))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Worker pool plus the per-workload barrier
pub struct Harness {
    config: BenchConfig,
    pool: rayon::ThreadPool,
    dispatched: AtomicUsize,
}

impl Harness {
    pub fn new(config: BenchConfig) -> BenchResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|idx| format!("extract-worker-{}", idx))
            .build()?;

        Ok(Self {
            config,
            pool,
            dispatched: AtomicUsize::new(0),
        })
    }

    /// Validate first; nothing is built or dispatched for a bad request
    pub fn from_raw(raw: &RawConfig) -> BenchResult<Self> {
        Self::new(raw.validate()?)
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Total jobs handed to the pool so far
    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub fn run(&self) -> BenchResult<Vec<BenchmarkReport>> {
        self.run_each(|_| {})
    }

    /// Run every workload size in order, handing each report to `on_report`
    /// as soon as its barrier completes.
    pub fn run_each<F>(&self, mut on_report: F) -> BenchResult<Vec<BenchmarkReport>>
    where
        F: FnMut(&BenchmarkReport),
    {
        let mut reports = Vec::with_capacity(self.config.workload_sizes.len());
        for &workload in &self.config.workload_sizes {
            let report = self.run_workload(workload)?;
            on_report(&report);
            reports.push(report);
        }
        Ok(reports)
    }

    pub fn run_workload(&self, workload: usize) -> BenchResult<BenchmarkReport> {
        let method = self.config.method;
        let seed = self.config.seed;
        let verify = self.config.verify;

        let timings = self.collect(workload, move |worker_id| {
            run_worker(method, seed, workload, verify, worker_id)
        })?;

        let report = timings
            .report(method.name(), workload)
            .ok_or_else(|| BenchError::WorkerFailed {
                method,
                workload,
                worker_id: 0,
                reason: "no worker reported a result".to_string(),
            })?;

        info!(
            method = %method,
            workload,
            median_ms = report.median_ms,
            items_per_ms = report.items_per_ms,
            "workload complete"
        );
        Ok(report)
    }

    /// Dispatch `job` once per worker and block until all of them report.
    fn collect<F>(&self, workload: usize, job: F) -> BenchResult<Timings>
    where
        F: Fn(usize) -> Result<RunResult, String> + Send + Sync + 'static,
    {
        let method = self.config.method;
        let threads = self.config.threads;
        let job = Arc::new(job);
        let (tx, rx) = crossbeam_channel::bounded(threads);

        info!(method = %method, workload, threads, "dispatching workers");
        for worker_id in 0..threads {
            let tx = tx.clone();
            let job = Arc::clone(&job);
            self.dispatched.fetch_add(1, Ordering::Relaxed);
            self.pool.spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(worker_id)))
                    .unwrap_or_else(|payload| Err(panic_message(payload.as_ref())));
                // a closed channel only means the harness stopped listening
                let _ = tx.send((worker_id, outcome));
            });
        }
        drop(tx);

        let mut timings = Timings::with_capacity(threads);
        let mut failure: Option<(usize, String)> = None;
        for _ in 0..threads {
            let (worker_id, outcome) = rx.recv().map_err(|_| BenchError::WorkerFailed {
                method,
                workload,
                worker_id: timings.len(),
                reason: "worker exited without reporting".to_string(),
            })?;

            match outcome {
                Ok(result) => {
                    debug!(
                        worker_id,
                        gross_nanos = result.gross_nanos,
                        baseline_nanos = result.baseline_nanos,
                        elapsed_nanos = result.elapsed_nanos,
                        "worker finished"
                    );
                    if result.elapsed_nanos < 0 {
                        warn!(worker_id, workload, "baseline exceeded extraction time");
                    }
                    timings.record(result);
                }
                Err(reason) => {
                    error!(worker_id, workload, method = %method, %reason, "worker failed");
                    failure.get_or_insert((worker_id, reason));
                }
            }
        }

        match failure {
            Some((worker_id, reason)) => Err(BenchError::WorkerFailed {
                method,
                workload,
                worker_id,
                reason,
            }),
            None => Ok(timings),
        }
    }
}
