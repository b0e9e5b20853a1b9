//! Intrusive circular doubly-linked list over keyed storage.
//!
//! Nodes live in an arena (a `SlotMap`, a `Vec`, anything implementing
//! [`LinkStorage`]) and carry an embedded [`Link`] whose `next`/`prev` fields
//! are arena keys instead of raw pointers. A list is anchored by a sentinel
//! node that carries no payload.
//!
//! # Circular lists
//!
//! - An empty list is a sentinel whose `next` and `prev` point to itself
//! - Every linked node satisfies `next.prev == node` and `prev.next == node`
//! - Splicing, insertion and removal are O(1)
//! - Iteration wraps around, so it must stop when it returns to the sentinel
//!
//! # Transient chains
//!
//! The sorting and merging routines in [`chain`] and [`list_sort`] break the
//! ring into a `None`-terminated singly-linked chain while they work and rebuild
//! the ring before returning. Only those routines ever observe a broken ring.
//!
//! # Example
//!
//! ```rust
//! use intrusive_circular_list::{CircularListOps, Link, LinkStorage};
//!
//! struct Arena {
//!     links: Vec<Link<usize>>,
//! }
//!
//! impl LinkStorage for Arena {
//!     type Key = usize;
//!
//!     fn link(&self, key: usize) -> &Link<usize> {
//!         &self.links[key]
//!     }
//!
//!     fn link_mut(&mut self, key: usize) -> &mut Link<usize> {
//!         &mut self.links[key]
//!     }
//! }
//!
//! let mut arena = Arena { links: vec![Link::new(); 3] };
//! let ops = CircularListOps::new();
//!
//! // Slot 0 is the sentinel
//! ops.make_circular(&mut arena, 0);
//! ops.insert_before(&mut arena, 0, 1);
//! ops.insert_before(&mut arena, 0, 2);
//!
//! assert_eq!(ops.count(&arena, 0), 3);
//! assert_eq!(ops.entries(&arena, 0).collect::<Vec<_>>(), vec![1, 2]);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod chain;
pub mod list_sort;

pub use chain::{break_ring, merge, merge_final, restore_ring};
pub use list_sort::list_sort;

use core::fmt;

// =============================================================================
// Link
// =============================================================================

/// Link embedded in every node of a circular list.
///
/// When unlinked, both `next` and `prev` are `None`.
/// When linked (even as a lone sentinel), both hold valid keys.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Link<K> {
    next: Option<K>,
    prev: Option<K>,
}

impl<K: Copy> Link<K> {
    /// Creates a new unlinked `Link`.
    #[inline]
    pub const fn new() -> Link<K> {
        Link {
            next: None,
            prev: None,
        }
    }

    /// Checks whether the link is part of a list.
    #[inline]
    pub fn is_linked(&self) -> bool {
        self.next.is_some()
    }

    /// Gets the next key.
    #[inline]
    pub fn next(&self) -> Option<K> {
        self.next
    }

    /// Gets the previous key.
    #[inline]
    pub fn prev(&self) -> Option<K> {
        self.prev
    }

    /// Sets the next key.
    #[inline]
    pub fn set_next(&mut self, next: Option<K>) {
        self.next = next;
    }

    /// Sets the previous key.
    #[inline]
    pub fn set_prev(&mut self, prev: Option<K>) {
        self.prev = prev;
    }

    /// Clears both fields without touching the neighbours.
    #[inline]
    pub fn force_unlink(&mut self) {
        self.next = None;
        self.prev = None;
    }
}

impl<K: Copy> Default for Link<K> {
    #[inline]
    fn default() -> Self {
        Link::new()
    }
}

impl<K> fmt::Debug for Link<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.next.is_some() {
            write!(f, "Link(linked)")
        } else {
            write!(f, "Link(unlinked)")
        }
    }
}

// =============================================================================
// Storage seam
// =============================================================================

/// Implemented by node types that embed a [`Link`].
pub trait Linked<K> {
    /// Returns the embedded link.
    fn link(&self) -> &Link<K>;

    /// Returns the embedded link mutably.
    fn link_mut(&mut self) -> &mut Link<K>;
}

/// Storage that maps keys to links.
///
/// Every routine in this crate is written against this trait, so any arena
/// whose nodes share the [`Link`] shape can reuse the list operations and the
/// sorts.
///
/// Accessing a key that is not in the storage is a logic error and may panic.
pub trait LinkStorage {
    /// Key type addressing a node.
    type Key: Copy + Eq + fmt::Debug;

    /// Returns the link of `key`.
    fn link(&self, key: Self::Key) -> &Link<Self::Key>;

    /// Returns the link of `key` mutably.
    fn link_mut(&mut self, key: Self::Key) -> &mut Link<Self::Key>;

    /// Next key of `key`, `None` at the end of a transient chain.
    #[inline]
    fn next(&self, key: Self::Key) -> Option<Self::Key> {
        self.link(key).next()
    }

    /// Previous key of `key`.
    #[inline]
    fn prev(&self, key: Self::Key) -> Option<Self::Key> {
        self.link(key).prev()
    }

    #[inline]
    fn set_next(&mut self, key: Self::Key, next: Option<Self::Key>) {
        self.link_mut(key).set_next(next);
    }

    #[inline]
    fn set_prev(&mut self, key: Self::Key, prev: Option<Self::Key>) {
        self.link_mut(key).set_prev(prev);
    }
}

#[cfg(feature = "arena-storage")]
impl<K, V> LinkStorage for slotmap::SlotMap<K, V>
where
    K: slotmap::Key,
    V: Linked<K>,
{
    type Key = K;

    #[inline]
    fn link(&self, key: K) -> &Link<K> {
        self[key].link()
    }

    #[inline]
    fn link_mut(&mut self, key: K) -> &mut Link<K> {
        self[key].link_mut()
    }
}

// =============================================================================
// CircularListOps
// =============================================================================

/// Operations for manipulating circular doubly-linked lists.
///
/// All operations except [`count`](Self::count) and iteration are O(1).
///
/// The ring-walking operations expect every node they visit to be linked;
/// calling them on an unlinked node panics.
#[derive(Clone, Copy, Default)]
pub struct CircularListOps;

impl CircularListOps {
    /// Creates a new `CircularListOps`.
    #[inline]
    pub const fn new() -> Self {
        CircularListOps
    }

    /// Checks if a node is linked.
    #[inline]
    pub fn is_linked<S: LinkStorage>(&self, store: &S, key: S::Key) -> bool {
        store.link(key).is_linked()
    }

    /// Next node in the ring.
    #[inline]
    pub fn next<S: LinkStorage>(&self, store: &S, key: S::Key) -> S::Key {
        store.next(key).expect("node is not linked")
    }

    /// Previous node in the ring.
    #[inline]
    pub fn prev<S: LinkStorage>(&self, store: &S, key: S::Key) -> S::Key {
        store.prev(key).expect("node is not linked")
    }

    /// Makes a single node into a ring of one.
    ///
    /// For a sentinel this is the empty list.
    #[inline]
    pub fn make_circular<S: LinkStorage>(&self, store: &mut S, key: S::Key) {
        let link = store.link_mut(key);
        link.set_next(Some(key));
        link.set_prev(Some(key));
    }

    /// True if `head` is a sentinel with no elements.
    #[inline]
    pub fn is_empty<S: LinkStorage>(&self, store: &S, head: S::Key) -> bool {
        store.next(head) == Some(head)
    }

    /// True if `head` is a sentinel with exactly one element.
    #[inline]
    pub fn is_singular<S: LinkStorage>(&self, store: &S, head: S::Key) -> bool {
        !self.is_empty(store, head) && store.next(head) == store.prev(head)
    }

    /// Inserts `new` after `at`.
    ///
    /// `at` must be linked and `new` must not be.
    #[inline]
    pub fn insert_after<S: LinkStorage>(&self, store: &mut S, at: S::Key, new: S::Key) {
        debug_assert!(store.link(at).is_linked(), "at is not linked");
        debug_assert!(!store.link(new).is_linked(), "new is already linked");

        let next = self.next(store, at);

        store.set_next(at, Some(new));
        store.set_prev(new, Some(at));
        store.set_next(new, Some(next));
        store.set_prev(next, Some(new));
    }

    /// Inserts `new` before `at`.
    ///
    /// `at` must be linked and `new` must not be.
    #[inline]
    pub fn insert_before<S: LinkStorage>(&self, store: &mut S, at: S::Key, new: S::Key) {
        let prev = self.prev(store, at);
        self.insert_after(store, prev, new);
    }

    /// Removes a node from its ring and marks it unlinked.
    ///
    /// Returns `true` if the node was alone in its ring.
    #[inline]
    pub fn remove<S: LinkStorage>(&self, store: &mut S, key: S::Key) -> bool {
        let next = self.next(store, key);
        let prev = self.prev(store, key);

        store.link_mut(key).force_unlink();
        if next == key {
            true
        } else {
            store.set_next(prev, Some(next));
            store.set_prev(next, Some(prev));
            false
        }
    }

    /// Moves a linked node so that it directly follows `at`.
    #[inline]
    pub fn move_after<S: LinkStorage>(&self, store: &mut S, key: S::Key, at: S::Key) {
        self.remove(store, key);
        self.insert_after(store, at, key);
    }

    /// Splices two rings together, returning an entry point into the result.
    ///
    /// After the call the nodes of `b` sit just before `a`.
    #[inline]
    pub fn splice<S: LinkStorage>(
        &self,
        store: &mut S,
        a: Option<S::Key>,
        b: Option<S::Key>,
    ) -> Option<S::Key> {
        match (a, b) {
            (None, None) => None,
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (Some(a), Some(b)) => {
                // Before:
                //   ... <-> a_prev <-> a <-> ...
                //   ... <-> b_prev <-> b <-> ...
                //
                // After:
                //   ... <-> a_prev <-> b <-> ... <-> b_prev <-> a <-> ...
                let a_prev = self.prev(store, a);
                let b_prev = self.prev(store, b);

                store.set_next(a_prev, Some(b));
                store.set_prev(b, Some(a_prev));

                store.set_next(b_prev, Some(a));
                store.set_prev(a, Some(b_prev));

                Some(a)
            }
        }
    }

    /// Reverses the ring containing `head` by swapping every node's fields.
    pub fn reverse<S: LinkStorage>(&self, store: &mut S, head: S::Key) {
        let mut current = head;
        loop {
            let link = store.link_mut(current);
            let next = link.next().expect("node is not linked");
            let prev = link.prev();
            link.set_prev(Some(next));
            link.set_next(prev);

            current = next;
            if current == head {
                break;
            }
        }
    }

    /// Counts the nodes in the ring, `start` included.
    ///
    /// This is O(n).
    pub fn count<S: LinkStorage>(&self, store: &S, start: S::Key) -> usize {
        let mut count = 1;
        let mut current = self.next(store, start);

        while current != start {
            count += 1;
            current = self.next(store, current);
        }

        count
    }

    /// Iterates over the ring in `next` order, skipping the sentinel `head`.
    pub fn entries<'a, S: LinkStorage>(&self, store: &'a S, head: S::Key) -> Entries<'a, S> {
        Entries {
            store,
            head,
            current: self.next(store, head),
        }
    }

    /// Checks `next.prev == node` and `prev.next == node` for every node of
    /// the ring starting at `head`.
    pub fn is_consistent<S: LinkStorage>(&self, store: &S, head: S::Key) -> bool {
        let mut current = head;
        loop {
            let (Some(next), Some(prev)) = (store.next(current), store.prev(current)) else {
                return false;
            };
            if store.prev(next) != Some(current) || store.next(prev) != Some(current) {
                return false;
            }

            current = next;
            if current == head {
                return true;
            }
        }
    }
}

/// Iterator over the element keys of a ring, returned by
/// [`CircularListOps::entries`].
pub struct Entries<'a, S: LinkStorage> {
    store: &'a S,
    head: S::Key,
    current: S::Key,
}

impl<S: LinkStorage> Iterator for Entries<'_, S> {
    type Item = S::Key;

    fn next(&mut self) -> Option<S::Key> {
        if self.current == self.head {
            return None;
        }
        let key = self.current;
        self.current = self.store.next(key).expect("node is not linked");
        Some(key)
    }
}

// =============================================================================
// Tests
// =============================================================================
