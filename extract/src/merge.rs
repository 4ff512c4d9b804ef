//! In-place merge sort driven purely by index comparisons and swaps.
//!
//! Merging rotates blocks with triple reversal and binary-search cuts, so
//! no auxiliary buffers are allocated. The sort is stable.

use std::cmp::Ordering;

const INSERTION_SORT_THRESHOLD: usize = 20;

/// Storage that can be sorted through `compare` and `swap` alone
pub trait SwapSort {
    fn compare(&self, i: usize, j: usize) -> Ordering;
    fn swap(&mut self, i: usize, j: usize);

    /// Sort the half-open range `from..to`
    fn sort_range(&mut self, from: usize, to: usize)
    where
        Self: Sized,
    {
        merge_sort(self, from, to);
    }
}

fn merge_sort<S: SwapSort>(s: &mut S, from: usize, to: usize) {
    if to - from < INSERTION_SORT_THRESHOLD {
        insertion_sort(s, from, to);
    } else {
        let mid = from + (to - from) / 2;
        merge_sort(s, from, mid);
        merge_sort(s, mid, to);
        merge_in_place(s, from, mid, to);
    }
}

fn insertion_sort<S: SwapSort>(s: &mut S, from: usize, to: usize) {
    for i in from + 1..to {
        let mut j = i;
        while j > from && s.compare(j - 1, j) == Ordering::Greater {
            s.swap(j - 1, j);
            j -= 1;
        }
    }
}

fn merge_in_place<S: SwapSort>(s: &mut S, mut from: usize, mid: usize, mut to: usize) {
    if from == mid || mid == to || s.compare(mid - 1, mid) != Ordering::Greater {
        return;
    }
    if to - from == 2 {
        s.swap(mid - 1, mid);
        return;
    }

    // trim prefixes/suffixes already in their final place
    while s.compare(from, mid) != Ordering::Greater {
        from += 1;
    }
    while s.compare(mid - 1, to - 1) != Ordering::Greater {
        to -= 1;
    }

    let (first_cut, second_cut, len22) = if mid - from > to - mid {
        let first_cut = from + (mid - from) / 2;
        let second_cut = lower_bound(s, mid, to, first_cut);
        (first_cut, second_cut, second_cut - mid)
    } else {
        let len22 = (to - mid) / 2;
        let second_cut = mid + len22;
        let first_cut = upper_bound(s, from, mid, second_cut);
        (first_cut, second_cut, len22)
    };

    rotate(s, first_cut, mid, second_cut);
    let new_mid = first_cut + len22;
    merge_in_place(s, from, first_cut, new_mid);
    merge_in_place(s, new_mid, second_cut, to);
}

/// First index in `from..to` not ordered before `val`
fn lower_bound<S: SwapSort>(s: &S, mut from: usize, to: usize, val: usize) -> usize {
    let mut len = to - from;
    while len > 0 {
        let half = len / 2;
        let mid = from + half;
        if s.compare(mid, val) == Ordering::Less {
            from = mid + 1;
            len -= half + 1;
        } else {
            len = half;
        }
    }
    from
}

/// First index in `from..to` ordered after `val`
fn upper_bound<S: SwapSort>(s: &S, mut from: usize, to: usize, val: usize) -> usize {
    let mut len = to - from;
    while len > 0 {
        let half = len / 2;
        let mid = from + half;
        if s.compare(val, mid) == Ordering::Less {
            len = half;
        } else {
            from = mid + 1;
            len -= half + 1;
        }
    }
    from
}

fn rotate<S: SwapSort>(s: &mut S, lo: usize, mid: usize, hi: usize) {
    if lo == mid || mid == hi {
        return;
    }
    if mid - lo == hi - mid {
        for offset in 0..mid - lo {
            s.swap(lo + offset, mid + offset);
        }
    } else {
        reverse(s, lo, mid);
        reverse(s, mid, hi);
        reverse(s, lo, hi);
    }
}

fn reverse<S: SwapSort>(s: &mut S, mut from: usize, mut to: usize) {
    while to > from + 1 {
        to -= 1;
        s.swap(from, to);
        from += 1;
    }
}

/// Parallel id/score columns, reordered together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreColumns {
    pub ids: Vec<u32>,
    pub scores: Vec<f32>,
}

impl ScoreColumns {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            scores: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, id: u32, score: f32) {
        self.ids.push(id);
        self.scores.push(score);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ascending by score; equal scores keep no particular id order
    pub fn sort(&mut self) {
        let len = self.len();
        self.sort_range(0, len);
    }
}

impl SwapSort for ScoreColumns {
    #[inline]
    fn compare(&self, i: usize, j: usize) -> Ordering {
        let (a, b) = (self.scores[i], self.scores[j]);
        if a == b {
            Ordering::Equal
        } else if a < b {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }

    #[inline]
    fn swap(&mut self, i: usize, j: usize) {
        self.scores.swap(i, j);
        self.ids.swap(i, j);
    }
}
