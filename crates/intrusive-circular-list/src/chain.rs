//! Transient singly-linked chains.
//!
//! A chain is a run of nodes connected through `next` only and terminated by
//! `None`. The `prev` fields of chain nodes are free for the caller to use;
//! the sorts use the `prev` of a chain's first node to stack chains on top of
//! each other.
//!
//! [`merge`] is the single two-way merge used by every sort and by the k-way
//! merge. It takes from the left chain on ties, which is what makes the sorts
//! stable.

use core::cmp::Ordering;

use crate::LinkStorage;

/// Turns the ring anchored at `head` into a chain.
///
/// The last element's `next` becomes `None`. Returns the first element, or
/// `None` for an empty ring. `head.next` keeps pointing at the first element
/// so the chain can be found again through the sentinel.
pub fn break_ring<S: LinkStorage>(store: &mut S, head: S::Key) -> Option<S::Key> {
    let last = store.prev(head).expect("node is not linked");
    store.set_next(last, None);
    store.next(head)
}

/// Closes `first..` back into a ring anchored at `head`, rebuilding every
/// `prev` field along the way.
///
/// A `None` chain leaves `head` as an empty ring.
pub fn restore_ring<S: LinkStorage>(store: &mut S, head: S::Key, first: Option<S::Key>) {
    match first {
        Some(first) => restore_tail(store, head, head, first),
        None => {
            store.set_next(head, Some(head));
            store.set_prev(head, Some(head));
        }
    }
}

/// Appends nodes to the end of a chain under construction.
struct ChainBuilder<K> {
    head: Option<K>,
    tail: Option<K>,
}

impl<K: Copy> ChainBuilder<K> {
    fn new() -> Self {
        ChainBuilder {
            head: None,
            tail: None,
        }
    }

    #[inline]
    fn push<S: LinkStorage<Key = K>>(&mut self, store: &mut S, node: K) {
        match self.tail {
            Some(tail) => store.set_next(tail, Some(node)),
            None => self.head = Some(node),
        }
        self.tail = Some(node);
    }

    /// Attaches `rest` after the last pushed node and returns the chain.
    fn finish<S: LinkStorage<Key = K>>(self, store: &mut S, rest: Option<K>) -> Option<K> {
        match self.tail {
            Some(tail) => {
                store.set_next(tail, rest);
                self.head
            }
            None => rest,
        }
    }
}

/// Merges two sorted chains into one sorted chain.
///
/// `cmp(store, a, b)` orders two nodes. Nodes of `a` come first on ties.
/// Either chain may be empty. Only `next` fields are written.
pub fn merge<S, F>(store: &mut S, a: Option<S::Key>, b: Option<S::Key>, cmp: &mut F) -> Option<S::Key>
where
    S: LinkStorage,
    F: FnMut(&S, S::Key, S::Key) -> Ordering,
{
    let mut out = ChainBuilder::new();
    let (mut a, mut b) = (a, b);

    while let (Some(x), Some(y)) = (a, b) {
        // if equal, take 'a' -- important for sort stability
        if cmp(store, x, y) != Ordering::Greater {
            out.push(store, x);
            a = store.next(x);
        } else {
            out.push(store, y);
            b = store.next(y);
        }
    }

    out.finish(store, a.or(b))
}

/// Merges two non-empty sorted chains straight into the ring anchored at
/// `head`, rebuilding `prev` links in the same pass.
///
/// This is the last merge of a sort: it saves the separate
/// [`restore_ring`] walk over the merged output.
pub fn merge_final<S, F>(store: &mut S, head: S::Key, a: S::Key, b: S::Key, cmp: &mut F)
where
    S: LinkStorage,
    F: FnMut(&S, S::Key, S::Key) -> Ordering,
{
    let mut tail = head;
    let (mut a, mut b) = (a, b);

    let rest = loop {
        // if equal, take 'a' -- important for sort stability
        if cmp(store, a, b) != Ordering::Greater {
            store.set_next(tail, Some(a));
            store.set_prev(a, Some(tail));
            tail = a;
            match store.next(a) {
                Some(next) => a = next,
                None => break b,
            }
        } else {
            store.set_next(tail, Some(b));
            store.set_prev(b, Some(tail));
            tail = b;
            match store.next(b) {
                Some(next) => b = next,
                None => break a,
            }
        }
    };

    // Finish linking the remainder onto tail
    restore_tail(store, head, tail, rest);
}

fn restore_tail<S: LinkStorage>(store: &mut S, head: S::Key, mut tail: S::Key, rest: S::Key) {
    let mut current = Some(rest);
    while let Some(node) = current {
        store.set_next(tail, Some(node));
        store.set_prev(node, Some(tail));
        tail = node;
        current = store.next(node);
    }

    // And the final links to make a circular doubly-linked list
    store.set_next(tail, Some(head));
    store.set_prev(head, Some(tail));
}
