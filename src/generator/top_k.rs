// src/generator/top_k.rs

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// An item with its score and arrival position.
#[derive(Debug)]
struct Ranked<T> {
    score: f64,
    seq: u64,
    item: T,
}

impl<T> Ranked<T> {
    /// Higher score ranks first; on ties the earlier arrival ranks first.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rank_cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.rank_cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank_cmp(other)
    }
}

/// Keeps the `k` best-scoring items of a stream in O(k) memory.
///
/// Equivalent to a stable descending sort followed by truncation.
#[derive(Debug)]
pub struct TopK<T> {
    k: usize,
    seen: u64,
    // Min-heap: the root is the weakest retained item.
    heap: BinaryHeap<Reverse<Ranked<T>>>,
}

impl<T> TopK<T> {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            seen: 0,
            heap: BinaryHeap::with_capacity(k.min(1 << 20)),
        }
    }

    pub fn push(&mut self, score: f64, item: T) {
        let entry = Ranked {
            score,
            seq: self.seen,
            item,
        };
        self.seen += 1;

        if self.k == 0 {
            return;
        }
        if self.heap.len() < self.k {
            self.heap.push(Reverse(entry));
            return;
        }
        if let Some(mut weakest) = self.heap.peek_mut() {
            if entry > weakest.0 {
                *weakest = Reverse(entry);
            }
        }
    }

    /// Number of items pushed so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Retained items, best first.
    pub fn into_ranked(self) -> Vec<T> {
        // Ascending order of Reverse is descending rank.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(entry)| entry.item)
            .collect()
    }

    /// Retained items in the order they were pushed.
    pub fn into_arrival_order(self) -> Vec<T> {
        let mut entries: Vec<Ranked<T>> = self.heap.into_iter().map(|Reverse(e)| e).collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_best_in_descending_order() {
        let mut top = TopK::new(3);
        for (score, name) in [(1.0, "a"), (5.0, "b"), (3.0, "c"), (4.0, "d"), (2.0, "e")] {
            top.push(score, name);
        }
        assert_eq!(top.seen(), 5);
        assert_eq!(top.into_ranked(), vec!["b", "d", "c"]);
    }

    #[test]
    fn test_ties_keep_arrival_order() {
        let mut top = TopK::new(2);
        for name in ["first", "second", "third"] {
            top.push(1.0, name);
        }
        assert_eq!(top.into_ranked(), vec!["first", "second"]);
    }

    #[test]
    fn test_matches_stable_sort() {
        let scores: Vec<f64> = (0..200).map(|i| ((i * 37) % 23) as f64).collect();
        let mut top = TopK::new(15);
        for (i, &s) in scores.iter().enumerate() {
            top.push(s, i);
        }

        let mut expected: Vec<usize> = (0..scores.len()).collect();
        expected.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        expected.truncate(15);

        assert_eq!(top.into_ranked(), expected);
    }

    #[test]
    fn test_arrival_order_and_zero_capacity() {
        let mut top = TopK::new(2);
        top.push(1.0, 'x');
        top.push(3.0, 'y');
        top.push(2.0, 'z');
        assert_eq!(top.into_arrival_order(), vec!['y', 'z']);

        let mut none = TopK::new(0);
        none.push(1.0, 'x');
        assert!(none.is_empty());
        assert_eq!(none.seen(), 1);
    }
}
