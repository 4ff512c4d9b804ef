//! Benchmark Timing Statistics
//!
//! Per-worker timings, median aggregation and report rendering.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::Duration;

pub const NANOS_PER_MS: i64 = 1_000_000;

/// One worker's measurement for one workload size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub worker_id: usize,
    pub gross_nanos: u64,    // generation + extraction
    pub baseline_nanos: u64, // generation only
    pub elapsed_nanos: i64,  // gross - baseline, may dip below zero on a noisy run
}

impl RunResult {
    pub fn from_durations(worker_id: usize, gross: Duration, baseline: Duration) -> Self {
        let gross_nanos = gross.as_nanos() as u64;
        let baseline_nanos = baseline.as_nanos() as u64;
        Self {
            worker_id,
            gross_nanos,
            baseline_nanos,
            elapsed_nanos: gross_nanos as i64 - baseline_nanos as i64,
        }
    }

    pub fn elapsed_ms(&self) -> i64 {
        self.elapsed_nanos / NANOS_PER_MS
    }
}

/// Middle value of the sorted input, or the mean of the two central values
/// when the length is even.
pub fn median(values: &[i64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2)
    } else {
        Some(sorted[mid])
    }
}

/// Items per millisecond, zero when the median rounds down to zero ms
pub fn items_per_ms(workload_size: usize, median_ms: i64) -> u64 {
    if median_ms <= 0 {
        return 0;
    }
    workload_size as u64 / median_ms as u64
}

/// Timing collector for one workload size
#[derive(Debug, Clone, Default)]
pub struct Timings {
    results: Vec<RunResult>,
}

impl Timings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(workers: usize) -> Self {
        Self {
            results: Vec::with_capacity(workers),
        }
    }

    pub fn record(&mut self, result: RunResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results in worker-id order, whatever order they completed in
    pub fn results(&self) -> Vec<RunResult> {
        let mut ordered = self.results.clone();
        ordered.sort_by_key(|r| r.worker_id);
        ordered
    }

    pub fn median_nanos(&self) -> Option<i64> {
        let elapsed: Vec<i64> = self.results.iter().map(|r| r.elapsed_nanos).collect();
        median(&elapsed)
    }

    /// Reduce to a report; `None` when nothing was recorded
    pub fn report(&self, method: &str, workload_size: usize) -> Option<BenchmarkReport> {
        let median_nanos = self.median_nanos()?;
        let median_ms = median_nanos / NANOS_PER_MS;
        let results = self.results();

        Some(BenchmarkReport {
            method: method.to_string(),
            threads: results.len(),
            workload_size,
            median_nanos,
            median_ms,
            items_per_ms: items_per_ms(workload_size, median_ms),
            per_worker_ms: results.iter().map(RunResult::elapsed_ms).collect(),
            workers: results,
        })
    }
}

/// Aggregated outcome of one workload size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub method: String,
    pub threads: usize,
    pub workload_size: usize,
    pub median_nanos: i64,
    pub median_ms: i64,
    pub items_per_ms: u64,
    pub per_worker_ms: Vec<i64>,
    pub workers: Vec<RunResult>,
}

impl BenchmarkReport {
    /// Human readable summary line
    pub fn render_line(&self) -> String {
        let worker_times = self
            .per_worker_ms
            .iter()
            .map(|ms| group_digits(*ms))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "  {:>10} items in median {:>7} ms, {:>5} items/ms. Worker times: {} ms",
            group_digits(self.workload_size as i64),
            group_digits(self.median_ms),
            group_digits(self.items_per_ms as i64),
            worker_times,
        )
    }
}

/// Format an integer with `,` between thousands groups
pub fn group_digits(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Flat per-worker row for CSV export
#[derive(Debug, Serialize)]
struct WorkerRow<'a> {
    method: &'a str,
    threads: usize,
    workload_size: usize,
    median_ms: i64,
    items_per_ms: u64,
    worker_id: usize,
    gross_nanos: u64,
    baseline_nanos: u64,
    elapsed_nanos: i64,
}

/// Write one CSV row per worker per report
pub fn write_csv<W: Write>(reports: &[BenchmarkReport], writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for report in reports {
        for worker in &report.workers {
            wtr.serialize(WorkerRow {
                method: &report.method,
                threads: report.threads,
                workload_size: report.workload_size,
                median_ms: report.median_ms,
                items_per_ms: report.items_per_ms,
                worker_id: worker.worker_id,
                gross_nanos: worker.gross_nanos,
                baseline_nanos: worker.baseline_nanos,
                elapsed_nanos: worker.elapsed_nanos,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_json(reports: &[BenchmarkReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(worker_id: usize, elapsed_ms: i64) -> RunResult {
        RunResult {
            worker_id,
            gross_nanos: (elapsed_ms * NANOS_PER_MS) as u64,
            baseline_nanos: 0,
            elapsed_nanos: elapsed_ms * NANOS_PER_MS,
        }
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[10, 30, 20]), Some(20));
        assert_eq!(median(&[10, 20, 30, 40]), Some(25));
        assert_eq!(median(&[7]), Some(7));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_median_resists_outlier() {
        assert_eq!(median(&[12, 11, 10_000, 13, 12]), Some(12));
    }

    #[test]
    fn test_run_result_subtracts_baseline() {
        let r = RunResult::from_durations(3, Duration::from_millis(50), Duration::from_millis(20));
        assert_eq!(r.worker_id, 3);
        assert_eq!(r.elapsed_nanos, 30 * NANOS_PER_MS);
        assert_eq!(r.elapsed_ms(), 30);

        let noisy = RunResult::from_durations(0, Duration::from_millis(5), Duration::from_millis(6));
        assert!(noisy.elapsed_nanos < 0);
    }

    #[test]
    fn test_throughput_clamps_to_zero() {
        assert_eq!(items_per_ms(1000, 0), 0);
        assert_eq!(items_per_ms(1000, -3), 0);
        assert_eq!(items_per_ms(10_000, 4), 2500);
    }

    #[test]
    fn test_report_orders_workers() {
        let mut timings = Timings::with_capacity(4);
        timings.record(run(2, 30));
        timings.record(run(0, 10));
        timings.record(run(3, 40));
        timings.record(run(1, 20));

        let report = timings.report("priority-queue", 10_000).unwrap();
        assert_eq!(report.threads, 4);
        assert_eq!(report.per_worker_ms, vec![10, 20, 30, 40]);
        assert_eq!(report.median_ms, 25);
        assert_eq!(report.items_per_ms, 400);
    }

    #[test]
    fn test_empty_timings_have_no_report() {
        assert!(Timings::new().report("array-sort", 10).is_none());
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1000), "1,000");
        assert_eq!(group_digits(1_234_567), "1,234,567");
        assert_eq!(group_digits(-12_345), "-12,345");
    }

    #[test]
    fn test_render_line() {
        let mut timings = Timings::new();
        timings.record(run(0, 1200));
        timings.record(run(1, 1300));
        let line = timings.report("array-sort", 1_000_000).unwrap().render_line();

        assert_eq!(
            line,
            "   1,000,000 items in median   1,250 ms,   800 items/ms. Worker times: 1,200, 1,300 ms"
        );
    }

    #[test]
    fn test_csv_rows_per_worker() {
        let mut timings = Timings::new();
        timings.record(run(0, 5));
        timings.record(run(1, 7));
        let report = timings.report("in-place-sort", 1000).unwrap();

        let mut buf = Vec::new();
        write_csv(&[report], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("method,threads,workload_size"));
        assert!(lines[1].starts_with("in-place-sort,2,1000,6,166,0,"));
    }

    #[test]
    fn test_json_roundtrip_keeps_workers() {
        let mut timings = Timings::new();
        timings.record(run(0, 9));
        let reports = vec![timings.report("priority-queue", 90).unwrap()];

        let json = to_json(&reports).unwrap();
        let parsed: Vec<BenchmarkReport> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, reports);
    }
}
