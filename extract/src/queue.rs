//! Fixed-capacity binary min-heap of scored items.
//!
//! Storage is reserved once up front and the live size is tracked explicitly,
//! so no sentinel values are needed to pad unused slots.

use scoredoc::ScoredItem;

/// `a` ranks below `b` when it scores lower, or on equal scores when its id
/// is higher.
#[inline]
pub fn ranks_below(a: &ScoredItem, b: &ScoredItem) -> bool {
    if a.score == b.score {
        a.id > b.id
    } else {
        a.score < b.score
    }
}

/// Bounded top-K collector; the root is always the lowest-ranked retained item
#[derive(Debug, Clone)]
pub struct TopQueue {
    heap: Vec<ScoredItem>,
    capacity: usize,
}

impl TopQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Lowest-ranked retained item
    pub fn top(&self) -> Option<&ScoredItem> {
        self.heap.first()
    }

    /// Insert `item`, evicting the current minimum when full.
    ///
    /// Returns the item that fell out of the queue: `None` while there is
    /// room, the displaced minimum when `item` does not rank below it, or
    /// `item` itself when it was rejected.
    pub fn insert_with_overflow(&mut self, item: ScoredItem) -> Option<ScoredItem> {
        if !self.is_full() {
            self.heap.push(item);
            self.sift_up(self.heap.len() - 1);
            return None;
        }

        match self.heap.first() {
            Some(min) if !ranks_below(&item, min) => {
                let displaced = std::mem::replace(&mut self.heap[0], item);
                self.sift_down(0);
                Some(displaced)
            }
            _ => Some(item),
        }
    }

    /// Remove and return the lowest-ranked item
    pub fn pop(&mut self) -> Option<ScoredItem> {
        let last = self.heap.len().checked_sub(1)?;
        self.heap.swap(0, last);
        let min = self.heap.pop();
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        min
    }

    /// Pop everything, lowest rank first
    pub fn drain_ranked(mut self) -> Vec<ScoredItem> {
        let mut ranked = Vec::with_capacity(self.heap.len());
        while let Some(item) = self.pop() {
            ranked.push(item);
        }
        ranked
    }

    fn sift_up(&mut self, mut idx: usize) {
        let item = self.heap[idx];
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if !ranks_below(&item, &self.heap[parent]) {
                break;
            }
            self.heap[idx] = self.heap[parent];
            idx = parent;
        }
        self.heap[idx] = item;
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.heap.len();
        let item = self.heap[idx];
        loop {
            let left = 2 * idx + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && ranks_below(&self.heap[right], &self.heap[left]) {
                right
            } else {
                left
            };
            if !ranks_below(&self.heap[child], &item) {
                break;
            }
            self.heap[idx] = self.heap[child];
            idx = child;
        }
        self.heap[idx] = item;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u32, score: f32) -> ScoredItem {
        ScoredItem::new(id, score)
    }

    #[test]
    fn test_ranks_below() {
        assert!(ranks_below(&item(0, 0.1), &item(1, 0.2)));
        assert!(!ranks_below(&item(1, 0.2), &item(0, 0.1)));
        // equal scores: higher id ranks below
        assert!(ranks_below(&item(9, 0.5), &item(2, 0.5)));
        assert!(!ranks_below(&item(2, 0.5), &item(9, 0.5)));
        assert!(!ranks_below(&item(4, 0.5), &item(4, 0.5)));
    }

    #[test]
    fn test_pop_order() {
        let mut queue = TopQueue::with_capacity(8);
        for (id, score) in [(0, 0.4), (1, 0.9), (2, 0.1), (3, 0.7), (4, 0.3)] {
            assert!(queue.insert_with_overflow(item(id, score)).is_none());
        }
        assert_eq!(queue.len(), 5);
        assert_eq!(queue.top().map(|t| t.id), Some(2));

        let ids: Vec<u32> = queue.drain_ranked().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 4, 0, 3, 1]);
    }

    #[test]
    fn test_overflow_keeps_best() {
        let mut queue = TopQueue::with_capacity(3);
        queue.insert_with_overflow(item(0, 0.5));
        queue.insert_with_overflow(item(1, 0.2));
        queue.insert_with_overflow(item(2, 0.8));
        assert!(queue.is_full());

        // better than the minimum: displaces it
        assert_eq!(queue.insert_with_overflow(item(3, 0.6)), Some(item(1, 0.2)));
        // worse than the minimum: rejected
        assert_eq!(queue.insert_with_overflow(item(4, 0.1)), Some(item(4, 0.1)));

        let ranked = queue.drain_ranked();
        assert_eq!(ranked, vec![item(0, 0.5), item(3, 0.6), item(2, 0.8)]);
    }

    #[test]
    fn test_overflow_tie_prefers_lower_id() {
        let mut queue = TopQueue::with_capacity(1);
        queue.insert_with_overflow(item(5, 0.5));

        // lower id on a tie does not rank below the root, so it replaces it
        assert_eq!(queue.insert_with_overflow(item(3, 0.5)), Some(item(5, 0.5)));
        // higher id on a tie ranks below and is rejected
        assert_eq!(queue.insert_with_overflow(item(8, 0.5)), Some(item(8, 0.5)));
        assert_eq!(queue.top(), Some(&item(3, 0.5)));
    }

    #[test]
    fn test_zero_capacity_rejects() {
        let mut queue = TopQueue::with_capacity(0);
        assert_eq!(queue.capacity(), 0);
        assert!(queue.is_full());
        assert_eq!(queue.insert_with_overflow(item(0, 0.9)), Some(item(0, 0.9)));
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_no_reallocation_when_full() {
        let mut queue = TopQueue::with_capacity(64);
        let cap_before = queue.heap.capacity();
        for id in 0..64 {
            queue.insert_with_overflow(item(id, (id % 7) as f32));
        }
        assert_eq!(queue.heap.capacity(), cap_before);
    }
}
