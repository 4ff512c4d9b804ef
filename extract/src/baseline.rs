//! Generation-only timing loop.
//!
//! Replays the score generator without extracting anything, so the cost of
//! producing the input can be subtracted from an extraction measurement.

use scoredoc::ScoreGenerator;
use std::hint::black_box;
use std::time::{Duration, Instant};

/// Time a full pass over `ScoreGenerator::new(seed, count)`
pub fn measure(seed: u64, count: u32) -> Duration {
    let started = Instant::now();
    for item in ScoreGenerator::new(seed, count) {
        // keeps the optimizer from dropping the loop
        black_box(item);
    }
    started.elapsed()
}
