//! Monotonic filters
//!
//! [`descend`](QueueStorage::descend) keeps only the elements that no later
//! element exceeds, leaving a non-increasing queue: the chain of suffix maxima.
//! [`ascend`](QueueStorage::ascend) is the mirror image and keeps the suffix
//! minima.
//!
//! A single walk from the tail towards the head does the work. While the
//! element before the current one is strictly out of order with it, that
//! element is deleted and the comparison repeats against the new predecessor.
//! Every element is deleted at most once, so the walk is O(n) overall.

use std::cmp::Ordering;

use log::debug;

use crate::sort::Direction;
use crate::storage::{value_of, Queue, QueueStorage};
use crate::OPS;

impl QueueStorage {
    /// Removes every element that has a strictly greater element somewhere
    /// after it. Returns the resulting size.
    pub fn descend(&mut self, queue: Queue) -> usize {
        self.filter_monotonic(queue, Direction::Descending)
    }

    /// Removes every element that has a strictly smaller element somewhere
    /// after it. Returns the resulting size.
    pub fn ascend(&mut self, queue: Queue) -> usize {
        self.filter_monotonic(queue, Direction::Ascending)
    }

    /// Removes the minimum number of elements needed to leave `queue` ordered
    /// by `direction`, always keeping the tail. Equal neighbours are kept.
    ///
    /// Returns the resulting size, 0 for an absent queue.
    pub fn filter_monotonic(&mut self, queue: Queue, direction: Direction) -> usize {
        let Some(head) = self.head(queue) else {
            return 0;
        };

        let mut removed = 0usize;
        let mut node = OPS.prev(&self.slots, head);
        while node != head {
            let before = OPS.prev(&self.slots, node);
            if before == head {
                break;
            }

            let order = direction.compare(
                value_of(&self.slots, node),
                value_of(&self.slots, before),
            );
            if order == Ordering::Less {
                self.release(before);
                removed += 1;
            } else {
                node = before;
            }
        }

        let size = self.size(queue);
        debug!("{direction:?} filter removed {removed}, kept {size}");
        size
    }
}
