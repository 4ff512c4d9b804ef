//! Top-K Extraction Strategies
//!
//! Three interchangeable ways of turning a stream of scored items into a
//! fully ranked list, sharing the `Extractor` contract:
//!
//! - `PriorityQueueExtract`: bounded min-heap, drained lowest rank first
//! - `InPlaceExtract`: parallel id/score columns sorted by an in-place merge sort
//! - `ArraySortExtract`: array of records sorted with a comparator
//!
//! Each orders ties differently and that difference is part of what is being
//! compared.

pub mod baseline;
mod merge;
mod queue;

pub use merge::{ScoreColumns, SwapSort};
pub use queue::{ranks_below, TopQueue};

use scoredoc::ScoredItem;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Output of an extraction, in the strategy's native order
#[derive(Debug, Clone, PartialEq)]
pub enum Ranked {
    Items(Vec<ScoredItem>),
    Columns(ScoreColumns),
}

impl Ranked {
    pub fn len(&self) -> usize {
        match self {
            Ranked::Items(items) => items.len(),
            Ranked::Columns(columns) => columns.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: usize) -> Option<ScoredItem> {
        match self {
            Ranked::Items(items) => items.get(idx).copied(),
            Ranked::Columns(columns) => {
                let id = *columns.ids.get(idx)?;
                let score = *columns.scores.get(idx)?;
                Some(ScoredItem::new(id, score))
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ScoredItem> + '_ {
        (0..self.len()).filter_map(move |idx| self.get(idx))
    }
}

/// Extraction strategy
pub trait Extractor {
    fn extract<I>(&self, items: I) -> Ranked
    where
        I: ExactSizeIterator<Item = ScoredItem>;
}

/// Bounded priority queue sized to the whole input, fully drained
pub struct PriorityQueueExtract;

impl Extractor for PriorityQueueExtract {
    fn extract<I>(&self, items: I) -> Ranked
    where
        I: ExactSizeIterator<Item = ScoredItem>,
    {
        let mut queue = TopQueue::with_capacity(items.len());
        for item in items {
            queue.insert_with_overflow(item);
        }
        Ranked::Items(queue.drain_ranked())
    }
}

/// Parallel columns, ascending by score, ties unordered
pub struct InPlaceExtract;

impl Extractor for InPlaceExtract {
    fn extract<I>(&self, items: I) -> Ranked
    where
        I: ExactSizeIterator<Item = ScoredItem>,
    {
        let mut columns = ScoreColumns::with_capacity(items.len());
        for item in items {
            columns.push(item.id, item.score);
        }
        columns.sort();
        Ranked::Columns(columns)
    }
}

/// Record array, descending by score then descending by id
pub struct ArraySortExtract;

impl Extractor for ArraySortExtract {
    fn extract<I>(&self, items: I) -> Ranked
    where
        I: ExactSizeIterator<Item = ScoredItem>,
    {
        let mut records: Vec<ScoredItem> = items.collect();
        records.sort_by(|a, b| {
            if a.score == b.score {
                b.id.cmp(&a.id)
            } else if a.score < b.score {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        });
        Ranked::Items(records)
    }
}

/// Strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    PriorityQueue,
    InPlaceSort,
    ArraySort,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::PriorityQueue, Method::InPlaceSort, Method::ArraySort];

    pub fn name(&self) -> &'static str {
        match self {
            Method::PriorityQueue => "priority-queue",
            Method::InPlaceSort => "in-place-sort",
            Method::ArraySort => "array-sort",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Method::PriorityQueue => "pq",
            Method::InPlaceSort => "ip",
            Method::ArraySort => "as",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Method::PriorityQueue => "bounded priority queue, drained",
            Method::InPlaceSort => "in-place merge sort over parallel columns",
            Method::ArraySort => "comparator sort over an array of records",
        }
    }

    pub fn extract<I>(self, items: I) -> Ranked
    where
        I: ExactSizeIterator<Item = ScoredItem>,
    {
        match self {
            Method::PriorityQueue => PriorityQueueExtract.extract(items),
            Method::InPlaceSort => InPlaceExtract.extract(items),
            Method::ArraySort => ArraySortExtract.extract(items),
        }
    }

    /// Whether `previous` may directly precede `current` in this method's output
    fn in_order(self, previous: &ScoredItem, current: &ScoredItem) -> bool {
        match self {
            Method::PriorityQueue => !ranks_below(current, previous),
            Method::InPlaceSort => previous.score <= current.score,
            Method::ArraySort => {
                previous.score > current.score
                    || (previous.score == current.score && previous.id >= current.id)
            }
        }
    }

    /// Check `ranked` holds `expected` items in this method's documented order
    pub fn verify(self, ranked: &Ranked, expected: usize) -> Result<(), OrderViolation> {
        if ranked.len() != expected {
            return Err(OrderViolation::Length {
                method: self,
                expected,
                found: ranked.len(),
            });
        }

        let mut previous: Option<ScoredItem> = None;
        for (position, current) in ranked.iter().enumerate() {
            if let Some(prev) = previous {
                if !self.in_order(&prev, &current) {
                    return Err(OrderViolation::Misordered {
                        method: self,
                        position,
                        previous: prev,
                        current,
                    });
                }
            }
            previous = Some(current);
        }
        Ok(())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.name() == s || m.short_name() == s)
            .ok_or_else(|| ParseMethodError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("extraction method '{0}' is unknown (expected priority-queue|pq, in-place-sort|ip or array-sort|as)")]
pub struct ParseMethodError(pub String);

/// Extraction output that breaks the method's ordering contract
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderViolation {
    #[error("{method} returned {found} items, expected {expected}")]
    Length {
        method: Method,
        expected: usize,
        found: usize,
    },

    #[error("{method} misordered items at position {position}: {previous:?} before {current:?}")]
    Misordered {
        method: Method,
        position: usize,
        previous: ScoredItem,
        current: ScoredItem,
    },
}
