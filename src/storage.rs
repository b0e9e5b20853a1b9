//! Arena storage for queue nodes
//!
//! Every queue lives in a [`QueueStorage`]: a `slotmap` arena whose slots are
//! either a queue's sentinel or one of its elements. Links between slots are
//! generational [`NodeKey`]s, so a freed queue's handle is detected instead of
//! dangling.
//!
//! # Design
//!
//! - Each slot embeds an [`intrusive_circular_list::Link`], making the arena a
//!   [`LinkStorage`](intrusive_circular_list::LinkStorage) that the list
//!   operations and sorts work on directly
//! - A [`Queue`] is the key of its sentinel slot
//! - Sharing one arena between queues lets merges move elements from queue to
//!   queue by relinking keys, never by copying strings
//!
//! # Example
//!
//! ```rust
//! use linked_queue_sort::QueueStorage;
//!
//! let mut storage = QueueStorage::new();
//! let queue = storage.new_queue();
//! storage.insert_tail(queue, "a").unwrap();
//! assert_eq!(storage.size(queue), 1);
//!
//! storage.free(queue);
//! assert!(!storage.contains(queue));
//! assert_eq!(storage.size(queue), 0);
//! ```

use intrusive_circular_list::{CircularListOps, Link, Linked};
use slotmap::{new_key_type, SlotMap};

use crate::OPS;

new_key_type! {
    /// Key of a slot in a [`QueueStorage`]
    pub struct NodeKey;
}

/// What a slot holds.
#[derive(Debug)]
pub(crate) enum SlotKind {
    /// Anchor of a queue, carries no value
    Sentinel,
    /// A queue element owning its string
    Element(String),
}

#[derive(Debug)]
pub(crate) struct Slot {
    link: Link<NodeKey>,
    pub(crate) kind: SlotKind,
}

impl Slot {
    pub(crate) fn sentinel() -> Self {
        Slot {
            link: Link::new(),
            kind: SlotKind::Sentinel,
        }
    }

    pub(crate) fn element(value: String) -> Self {
        Slot {
            link: Link::new(),
            kind: SlotKind::Element(value),
        }
    }
}

impl Linked<NodeKey> for Slot {
    #[inline]
    fn link(&self) -> &Link<NodeKey> {
        &self.link
    }

    #[inline]
    fn link_mut(&mut self) -> &mut Link<NodeKey> {
        &mut self.link
    }
}

pub(crate) type Slots = SlotMap<NodeKey, Slot>;

/// Value of an element slot. Sentinels read as the empty string; the sorts
/// never compare them.
#[inline]
pub(crate) fn value_of(slots: &Slots, key: NodeKey) -> &str {
    match &slots[key].kind {
        SlotKind::Element(value) => value,
        SlotKind::Sentinel => {
            debug_assert!(false, "sentinel compared as an element");
            ""
        }
    }
}

/// Handle to a queue inside a [`QueueStorage`].
///
/// Handles are cheap to copy. Once the queue is [`free`](QueueStorage::free)d
/// every operation treats the handle as an absent queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Queue(pub(crate) NodeKey);

/// Arena owning a set of queues and all of their elements.
#[derive(Debug, Default)]
pub struct QueueStorage {
    pub(crate) slots: Slots,
}

impl QueueStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage with room for `capacity` slots (elements plus one
    /// sentinel per queue) before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: SlotMap::with_capacity_and_key(capacity),
        }
    }

    /// Creates an empty queue.
    pub fn new_queue(&mut self) -> Queue {
        let head = self.slots.insert(Slot::sentinel());
        OPS.make_circular(&mut self.slots, head);
        Queue(head)
    }

    /// Releases every element of `queue` and the queue itself.
    ///
    /// Freeing an absent queue is a no-op.
    pub fn free(&mut self, queue: Queue) {
        let Some(head) = self.head(queue) else {
            return;
        };

        let mut current = OPS.next(&self.slots, head);
        while current != head {
            let next = OPS.next(&self.slots, current);
            self.slots.remove(current);
            current = next;
        }
        self.slots.remove(head);
    }

    /// True if `queue` has not been freed.
    pub fn contains(&self, queue: Queue) -> bool {
        self.head(queue).is_some()
    }

    /// Sentinel key of a live queue.
    #[inline]
    pub(crate) fn head(&self, queue: Queue) -> Option<NodeKey> {
        match self.slots.get(queue.0) {
            Some(Slot {
                kind: SlotKind::Sentinel,
                ..
            }) => Some(queue.0),
            _ => None,
        }
    }

    /// Iterates over the values of `queue` from head to tail.
    ///
    /// An absent queue yields nothing.
    pub fn values(&self, queue: Queue) -> impl Iterator<Item = &str> + '_ {
        self.head(queue)
            .into_iter()
            .flat_map(move |head| OPS.entries(&self.slots, head))
            .map(move |key| value_of(&self.slots, key))
    }

    /// Collects the values of `queue` from head to tail.
    pub fn to_vec(&self, queue: Queue) -> Vec<String> {
        self.values(queue).map(str::to_owned).collect()
    }

    /// Checks the circular doubly-linked invariant and that the ring holds
    /// exactly one sentinel. An absent queue is trivially consistent.
    pub fn check_invariants(&self, queue: Queue) -> bool {
        let Some(head) = self.head(queue) else {
            return true;
        };
        OPS.is_consistent(&self.slots, head)
            && OPS.entries(&self.slots, head).all(|key| {
                matches!(self.slots[key].kind, SlotKind::Element(_))
            })
    }

    /// Unlinks `key` and removes its slot, returning the string it owned.
    pub(crate) fn release(&mut self, key: NodeKey) -> Option<String> {
        OPS.remove(&mut self.slots, key);
        match self.slots.remove(key)?.kind {
            SlotKind::Element(value) => Some(value),
            SlotKind::Sentinel => None,
        }
    }
}
