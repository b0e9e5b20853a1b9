//! Stable in-place merge sorts over a queue's links
//!
//! Two independent sorts are provided, both stable and allocation-free:
//!
//! - [`QueueStorage::sort`]: natural merge sort. One pass splits the queue into
//!   maximal ordered runs, then runs are merged pairwise, pass after pass.
//!   Already-sorted input costs a single scan.
//! - [`QueueStorage::list_sort`]: the binary-carry merge sort from
//!   [`intrusive_circular_list::list_sort`]. No run detection; elements are
//!   merged into power-of-two runs as they are consumed.
//!
//! Both report the number of comparisons they made as [`SortStats`].
//!
//! # Time Complexity
//!
//! | Operation   | Best  | Worst      |
//! |-------------|-------|------------|
//! | `sort`      | O(n)  | O(n log n) |
//! | `list_sort` | O(n log n) | O(n log n) |

use std::cmp::Ordering;

use intrusive_circular_list::{merge, restore_ring, LinkStorage};
use log::debug;

use crate::storage::{value_of, NodeKey, Queue, QueueStorage, Slots};
use crate::OPS;

/// Order in which a sort, merge or filter arranges values.
///
/// Values compare byte-wise, like `strcmp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Smallest value first
    #[default]
    Ascending,
    /// Largest value first
    Descending,
}

impl Direction {
    /// `Descending` if `descend` is set.
    pub fn from_descend(descend: bool) -> Self {
        if descend {
            Direction::Descending
        } else {
            Direction::Ascending
        }
    }

    /// Orders `a` relative to `b`; `Less` means `a` comes first.
    #[inline]
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            Direction::Ascending => a.cmp(b),
            Direction::Descending => b.cmp(a),
        }
    }

    /// True if every adjacent pair of `values` is in this order.
    pub fn is_sorted<I, S>(self, values: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = values.into_iter();
        let Some(mut prev) = values.next() else {
            return true;
        };
        for value in values {
            if self.compare(prev.as_ref(), value.as_ref()) == Ordering::Greater {
                return false;
            }
            prev = value;
        }
        true
    }
}

/// Comparison accounting for one sort or merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortStats {
    /// Number of value comparisons performed
    pub comparisons: usize,
}

impl SortStats {
    /// `K = log2(n) - (comparisons - 1) / n`, the gap between the information
    /// theoretic bound and the comparisons actually spent per element. Larger
    /// is better. Returns 0 for an empty input.
    pub fn k_value(&self, n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        let n = n as f64;
        n.log2() - self.comparisons.saturating_sub(1) as f64 / n
    }
}

/// Counts comparisons while ordering slots by `direction`.
pub(crate) struct Comparator {
    direction: Direction,
    comparisons: usize,
}

impl Comparator {
    pub(crate) fn new(direction: Direction) -> Self {
        Comparator {
            direction,
            comparisons: 0,
        }
    }

    #[inline]
    pub(crate) fn compare(&mut self, slots: &Slots, a: NodeKey, b: NodeKey) -> Ordering {
        self.comparisons += 1;
        self.direction
            .compare(value_of(slots, a), value_of(slots, b))
    }

    pub(crate) fn stats(&self) -> SortStats {
        SortStats {
            comparisons: self.comparisons,
        }
    }
}

impl QueueStorage {
    /// Sorts `queue` with a natural merge sort.
    ///
    /// Equal values keep their relative order. Empty, single-element and
    /// absent queues are left alone.
    ///
    /// # Example
    ///
    /// ```rust
    /// use linked_queue_sort::{Direction, QueueStorage};
    ///
    /// let mut storage = QueueStorage::new();
    /// let queue = storage.new_queue();
    /// for value in ["banana", "apple", "cherry"] {
    ///     storage.insert_tail(queue, value).unwrap();
    /// }
    ///
    /// storage.sort(queue, Direction::Ascending);
    /// assert_eq!(storage.to_vec(queue), vec!["apple", "banana", "cherry"]);
    /// ```
    pub fn sort(&mut self, queue: Queue, direction: Direction) -> SortStats {
        let Some(head) = self.head(queue) else {
            return SortStats::default();
        };
        if OPS.is_empty(&self.slots, head) || OPS.is_singular(&self.slots, head) {
            return SortStats::default();
        }

        let mut counter = Comparator::new(direction);
        let mut cmp = |slots: &Slots, a: NodeKey, b: NodeKey| counter.compare(slots, a, b);
        let slots = &mut self.slots;

        // Split into maximal runs. Each run becomes a chain; run heads are
        // stacked through `prev`, most recent run on top.
        let mut runs: Option<NodeKey> = None;
        let mut run_count = 0usize;
        let mut start = OPS.next(slots, head);
        while start != head {
            let mut end = start;
            loop {
                let next = OPS.next(slots, end);
                if next == head || cmp(slots, end, next) == Ordering::Greater {
                    break;
                }
                end = next;
            }

            let after = OPS.next(slots, end);
            slots.set_prev(start, runs);
            slots.set_next(end, None);
            runs = Some(start);
            run_count += 1;
            start = after;
        }

        // Merge neighbouring runs until one is left. The earlier run is the
        // left operand so ties keep their original order.
        let mut passes = 0usize;
        while let Some(top) = runs {
            if slots.prev(top).is_none() {
                break;
            }

            let mut current = Some(top);
            let mut merged_top: Option<NodeKey> = None;
            while let Some(later) = current {
                let Some(earlier) = slots.prev(later) else {
                    break;
                };
                let rest = slots.prev(earlier);
                let merged = merge(slots, Some(earlier), Some(later), &mut cmp);
                match merged_top {
                    Some(above) => slots.set_prev(above, merged),
                    None => runs = merged,
                }
                merged_top = merged;
                current = rest;
            }
            // An odd run out is carried over to the next pass
            match merged_top {
                Some(above) => slots.set_prev(above, current),
                None => runs = current,
            }
            passes += 1;
        }

        restore_ring(slots, head, runs);

        let stats = counter.stats();
        debug!(
            "natural merge sort: {run_count} runs, {passes} passes, {} comparisons",
            stats.comparisons
        );
        stats
    }

    /// Sorts `queue` with the binary-carry merge sort.
    ///
    /// Same contract as [`sort`](Self::sort): stable, in place, and a no-op on
    /// empty, single-element or absent queues.
    pub fn list_sort(&mut self, queue: Queue, direction: Direction) -> SortStats {
        let Some(head) = self.head(queue) else {
            return SortStats::default();
        };

        let mut counter = Comparator::new(direction);
        intrusive_circular_list::list_sort(&mut self.slots, head, |slots: &Slots, a, b| {
            counter.compare(slots, a, b)
        });

        let stats = counter.stats();
        debug!("list_sort: {} comparisons", stats.comparisons);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_of(values: &[&str]) -> (QueueStorage, Queue) {
        let mut storage = QueueStorage::new();
        let queue = storage.new_queue();
        for value in values {
            storage.insert_tail(queue, value).unwrap();
        }
        (storage, queue)
    }

    #[test]
    fn test_direction_compare() {
        assert_eq!(Direction::Ascending.compare("a", "b"), Ordering::Less);
        assert_eq!(Direction::Descending.compare("a", "b"), Ordering::Greater);
        assert_eq!(Direction::Descending.compare("a", "a"), Ordering::Equal);
        assert_eq!(Direction::from_descend(true), Direction::Descending);
        assert_eq!(Direction::default(), Direction::Ascending);
    }

    #[test]
    fn test_direction_is_byte_order() {
        // Uppercase sorts before lowercase, prefixes before extensions
        assert_eq!(Direction::Ascending.compare("Z", "a"), Ordering::Less);
        assert_eq!(Direction::Ascending.compare("ab", "abc"), Ordering::Less);
    }

    #[test]
    fn test_is_sorted() {
        assert!(Direction::Ascending.is_sorted(["a", "b", "b"]));
        assert!(!Direction::Ascending.is_sorted(["b", "a"]));
        assert!(Direction::Descending.is_sorted(vec!["c".to_string(), "a".to_string()]));
        assert!(Direction::Descending.is_sorted(Vec::<String>::new()));
    }

    #[test]
    fn test_k_value() {
        let stats = SortStats { comparisons: 17 };
        assert!((stats.k_value(8) - 1.0).abs() < 1e-9);
        assert_eq!(SortStats::default().k_value(0), 0.0);
    }

    #[test]
    fn test_sort_example() {
        let (mut storage, queue) = queue_of(&["banana", "apple", "cherry"]);
        storage.sort(queue, Direction::Ascending);
        assert_eq!(storage.to_vec(queue), vec!["apple", "banana", "cherry"]);
        assert!(storage.check_invariants(queue));
    }

    #[test]
    fn test_sort_descending() {
        let (mut storage, queue) = queue_of(&["b", "d", "a", "c", "e"]);
        storage.sort(queue, Direction::Descending);
        assert_eq!(storage.to_vec(queue), vec!["e", "d", "c", "b", "a"]);
        assert!(storage.check_invariants(queue));
    }

    #[test]
    fn test_sort_presorted_single_scan() {
        let (mut storage, queue) = queue_of(&["a", "b", "c", "d"]);
        let stats = storage.sort(queue, Direction::Ascending);
        assert_eq!(stats.comparisons, 3);
        assert_eq!(storage.to_vec(queue), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_sort_odd_run_count() {
        // Runs: [c] [b] [a] [d e] [a]
        let (mut storage, queue) = queue_of(&["c", "b", "a", "d", "e", "a"]);
        storage.sort(queue, Direction::Ascending);
        assert_eq!(storage.to_vec(queue), vec!["a", "a", "b", "c", "d", "e"]);
        assert!(storage.check_invariants(queue));
    }

    #[test]
    fn test_sort_trivial_queues() {
        let (mut storage, queue) = queue_of(&[]);
        assert_eq!(storage.sort(queue, Direction::Ascending), SortStats::default());
        assert_eq!(storage.list_sort(queue, Direction::Ascending), SortStats::default());

        let (mut storage, queue) = queue_of(&["x"]);
        storage.sort(queue, Direction::Descending);
        storage.list_sort(queue, Direction::Descending);
        assert_eq!(storage.to_vec(queue), vec!["x"]);
        assert!(storage.check_invariants(queue));

        storage.free(queue);
        assert_eq!(storage.sort(queue, Direction::Ascending), SortStats::default());
    }

    #[test]
    fn test_list_sort_both_directions() {
        let input = ["pear", "fig", "apple", "kiwi", "date", "fig", "lime"];

        let (mut storage, queue) = queue_of(&input);
        storage.list_sort(queue, Direction::Ascending);
        assert_eq!(
            storage.to_vec(queue),
            vec!["apple", "date", "fig", "fig", "kiwi", "lime", "pear"]
        );
        assert!(storage.check_invariants(queue));

        storage.list_sort(queue, Direction::Descending);
        assert_eq!(
            storage.to_vec(queue),
            vec!["pear", "lime", "kiwi", "fig", "fig", "date", "apple"]
        );
        assert!(storage.check_invariants(queue));
    }

    #[test]
    fn test_sorts_are_stable() {
        // Equal values are told apart by where their slot sits in the arena,
        // which insertion order determines.
        let input = ["b", "a", "b", "a", "c", "a", "b"];
        for use_list_sort in [false, true] {
            let (mut storage, queue) = queue_of(&input);
            let before: Vec<NodeKey> = OPS.entries(&storage.slots, queue.0).collect();

            if use_list_sort {
                storage.list_sort(queue, Direction::Ascending);
            } else {
                storage.sort(queue, Direction::Ascending);
            }

            let after: Vec<NodeKey> = OPS.entries(&storage.slots, queue.0).collect();
            let mut expected: Vec<(usize, NodeKey)> = before.iter().copied().enumerate().collect();
            expected.sort_by(|x, y| input[x.0].cmp(input[y.0]));
            let expected: Vec<NodeKey> = expected.into_iter().map(|(_, key)| key).collect();
            assert_eq!(after, expected, "list_sort = {use_list_sort}");
        }
    }
}
