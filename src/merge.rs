//! K-way merge of sorted queues
//!
//! The queues to merge are listed in a [`ContextChain`]: a circular list of
//! [`QueueContext`] records built on the same link machinery as the queues.
//! [`QueueStorage::merge_all`] merges them with an interval-doubling
//! tournament. At interval 1 it merges contexts (0, 1), (2, 3), ...; at
//! interval 2 it merges (0, 2), (4, 6), ...; and so on until everything has
//! been folded into the first queue.
//!
//! Each round touches every element once, and there are ⌈log2 k⌉ rounds, so
//! merging k queues of N elements in total costs O(N log k) comparisons.

use intrusive_circular_list::{break_ring, merge, restore_ring, Link, LinkStorage, Linked};
use log::{debug, trace};
use rustc_hash::FxHashSet;
use slotmap::{new_key_type, SlotMap};

use crate::error::QueueError;
use crate::sort::{Comparator, Direction, SortStats};
use crate::storage::{NodeKey, Queue, QueueStorage, Slots};
use crate::OPS;

new_key_type! {
    /// Key of a record in a [`ContextChain`]
    pub struct ContextKey;
}

/// One queue taking part in a k-way merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueContext {
    /// Rank of the context in its chain, starting at 0
    pub id: usize,
    /// The queue this context refers to
    pub queue: Queue,
}

#[derive(Debug)]
enum ChainEntry {
    Sentinel,
    Context(QueueContext),
}

#[derive(Debug)]
struct ChainSlot {
    link: Link<ContextKey>,
    entry: ChainEntry,
}

impl Linked<ContextKey> for ChainSlot {
    fn link(&self) -> &Link<ContextKey> {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link<ContextKey> {
        &mut self.link
    }
}

/// Ordered chain of queue contexts handed to
/// [`merge_all`](QueueStorage::merge_all).
///
/// The chain only refers to queues; it never owns or frees them.
#[derive(Debug)]
pub struct ContextChain {
    slots: SlotMap<ContextKey, ChainSlot>,
    head: ContextKey,
}

impl ContextChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        let mut slots = SlotMap::with_key();
        let head = slots.insert(ChainSlot {
            link: Link::new(),
            entry: ChainEntry::Sentinel,
        });
        OPS.make_circular(&mut slots, head);
        ContextChain { slots, head }
    }

    /// Appends `queue` to the chain and returns its context id.
    pub fn push(&mut self, queue: Queue) -> usize {
        let id = self.len();
        let key = self.slots.insert(ChainSlot {
            link: Link::new(),
            entry: ChainEntry::Context(QueueContext { id, queue }),
        });
        OPS.insert_before(&mut self.slots, self.head, key);
        id
    }

    /// Number of contexts.
    pub fn len(&self) -> usize {
        OPS.count(&self.slots, self.head) - 1
    }

    /// True if the chain has no contexts.
    pub fn is_empty(&self) -> bool {
        OPS.is_empty(&self.slots, self.head)
    }

    /// Iterates over the contexts in chain order.
    pub fn contexts(&self) -> impl Iterator<Item = &QueueContext> + '_ {
        OPS.entries(&self.slots, self.head)
            .filter_map(move |key| self.context(key))
    }

    /// The first context, whose queue receives the merged elements.
    pub fn first(&self) -> Option<&QueueContext> {
        self.contexts().next()
    }

    fn first_key(&self) -> ContextKey {
        OPS.next(&self.slots, self.head)
    }

    fn context(&self, key: ContextKey) -> Option<&QueueContext> {
        match &self.slots.get(key)?.entry {
            ChainEntry::Context(context) => Some(context),
            ChainEntry::Sentinel => None,
        }
    }

    fn queue_head(&self, key: ContextKey) -> Option<NodeKey> {
        self.context(key).map(|context| context.queue.0)
    }

    /// Walks `steps` contexts forward.
    fn advance(&self, mut key: ContextKey, steps: usize) -> ContextKey {
        for _ in 0..steps {
            key = OPS.next(&self.slots, key);
        }
        key
    }
}

impl Default for ContextChain {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueStorage {
    /// Merges every queue of `chain` into the chain's first queue.
    ///
    /// Each queue must already be sorted by `direction`. Afterwards the first
    /// queue holds all elements in order and every other queue is empty. The
    /// merge is stable: among equal values, elements of earlier queues come
    /// first. Returns the size of the first queue, 0 for an empty chain.
    ///
    /// # Errors
    ///
    /// [`QueueError::UnknownQueue`] if a context refers to a freed queue and
    /// [`QueueError::DuplicateQueue`] if a queue is listed twice. Nothing is
    /// modified in either case.
    ///
    /// # Example
    ///
    /// ```rust
    /// use linked_queue_sort::{ContextChain, Direction, QueueStorage};
    ///
    /// let mut storage = QueueStorage::new();
    /// let mut chain = ContextChain::new();
    /// for values in [["a", "d"], ["b", "e"], ["c", "f"]] {
    ///     let queue = storage.new_queue();
    ///     for value in values {
    ///         storage.insert_tail(queue, value).unwrap();
    ///     }
    ///     chain.push(queue);
    /// }
    ///
    /// assert_eq!(storage.merge_all(&chain, Direction::Ascending), Ok(6));
    /// let first = chain.first().unwrap().queue;
    /// assert_eq!(storage.to_vec(first), vec!["a", "b", "c", "d", "e", "f"]);
    /// ```
    pub fn merge_all(&mut self, chain: &ContextChain, direction: Direction) -> Result<usize, QueueError> {
        self.merge_all_with_stats(chain, direction)
            .map(|(size, _)| size)
    }

    /// Like [`merge_all`](Self::merge_all), also reporting comparisons.
    pub fn merge_all_with_stats(
        &mut self,
        chain: &ContextChain,
        direction: Direction,
    ) -> Result<(usize, SortStats), QueueError> {
        let mut seen = FxHashSet::default();
        for context in chain.contexts() {
            if !self.contains(context.queue) {
                return Err(QueueError::UnknownQueue);
            }
            if !seen.insert(context.queue) {
                return Err(QueueError::DuplicateQueue);
            }
        }

        let Some(first) = chain.first().map(|context| context.queue) else {
            return Ok((0, SortStats::default()));
        };
        let count = chain.len();

        for context in chain.contexts() {
            break_ring(&mut self.slots, context.queue.0);
        }

        let mut counter = Comparator::new(direction);
        let mut cmp = |slots: &Slots, a: NodeKey, b: NodeKey| counter.compare(slots, a, b);

        let mut interval = 1;
        while interval < count {
            let mut index = 0;
            let mut left = chain.first_key();
            let mut right = chain.advance(left, interval);

            while index + interval < count {
                if let (Some(into), Some(from)) = (chain.queue_head(left), chain.queue_head(right)) {
                    let (a, b) = (self.slots.next(into), self.slots.next(from));
                    let merged = merge(&mut self.slots, a, b, &mut cmp);
                    self.slots.set_next(into, merged);
                    OPS.make_circular(&mut self.slots, from);
                    trace!("interval {interval}: merged context {} into {index}", index + interval);
                }

                if index + 2 * interval >= count {
                    break;
                }
                left = chain.advance(left, 2 * interval);
                right = chain.advance(right, 2 * interval);
                index += 2 * interval;
            }
            interval *= 2;
        }

        // Rebuild the surviving queue's back links
        let merged = self.slots.next(first.0);
        restore_ring(&mut self.slots, first.0, merged);

        let stats = counter.stats();
        let size = self.size(first);
        debug!(
            "merged {count} queues into {size} elements with {} comparisons",
            stats.comparisons
        );
        Ok((size, stats))
    }
}
