//! Scored Document Stream
//!
//! Defines the `(id, score)` pair every extraction strategy consumes and the
//! seeded generator that produces them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed shared by every measurement unless the caller overrides it.
pub const DEFAULT_SEED: u64 = 87;

/// A candidate document and its relevance score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredItem {
    pub id: u32,
    pub score: f32,
}

impl ScoredItem {
    pub fn new(id: u32, score: f32) -> Self {
        Self { id, score }
    }
}

/// Deterministic stream of scored items
///
/// Ids are the 0-based emission index, scores are uniform in `[0, 1)`.
/// The count is a `u32` so every emitted id fits the id type.
/// Two generators built from the same `(seed, count)` yield bit-identical
/// sequences, so build a fresh one for every measurement.
#[derive(Debug)]
pub struct ScoreGenerator {
    seed: u64,
    count: u32,
    emitted: u32,
    rng: StdRng,
}

impl ScoreGenerator {
    pub fn new(seed: u64, count: u32) -> Self {
        Self {
            seed,
            count,
            emitted: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Start the same sequence again from the beginning
    pub fn replay(&self) -> Self {
        Self::new(self.seed, self.count)
    }
}

impl Iterator for ScoreGenerator {
    type Item = ScoredItem;

    fn next(&mut self) -> Option<ScoredItem> {
        if self.emitted >= self.count {
            return None;
        }
        let item = ScoredItem {
            id: self.emitted,
            score: self.rng.gen::<f32>(),
        };
        self.emitted += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.emitted) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ScoreGenerator {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let a: Vec<ScoredItem> = ScoreGenerator::new(DEFAULT_SEED, 1000).collect();
        let b: Vec<ScoredItem> = ScoreGenerator::new(DEFAULT_SEED, 1000).collect();

        assert_eq!(a.len(), 1000);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.score.to_bits(), y.score.to_bits());
        }
    }

    #[test]
    fn test_replay_restarts_mid_stream() {
        let mut gen = ScoreGenerator::new(7, 50);
        let head: Vec<ScoredItem> = gen.by_ref().take(10).collect();
        assert_eq!(gen.len(), 40);

        let replayed: Vec<ScoredItem> = gen.replay().take(10).collect();
        assert_eq!(head, replayed);
    }

    #[test]
    fn test_ids_and_score_range() {
        for (i, item) in ScoreGenerator::new(DEFAULT_SEED, 5000).enumerate() {
            assert_eq!(item.id as usize, i);
            assert!(item.score >= 0.0 && item.score < 1.0);
        }
    }

    #[test]
    fn test_seed_changes_sequence() {
        let a: Vec<ScoredItem> = ScoreGenerator::new(1, 100).collect();
        let b: Vec<ScoredItem> = ScoreGenerator::new(2, 100).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_full_id_range_length() {
        let gen = ScoreGenerator::new(DEFAULT_SEED, u32::MAX);
        assert_eq!(gen.len(), u32::MAX as usize);

        let mut tail = ScoreGenerator::new(DEFAULT_SEED, 3);
        tail.emitted = u32::MAX - 3;
        tail.count = u32::MAX;
        let ids: Vec<u32> = tail.map(|item| item.id).collect();
        assert_eq!(ids, vec![u32::MAX - 3, u32::MAX - 2, u32::MAX - 1]);
    }

    #[test]
    fn test_empty_generator() {
        let mut gen = ScoreGenerator::new(DEFAULT_SEED, 0);
        assert_eq!(gen.len(), 0);
        assert!(gen.next().is_none());
    }
}
