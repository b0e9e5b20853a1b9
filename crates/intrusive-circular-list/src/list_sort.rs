//! Bottom-up merge sort with a binary-carry merge schedule.
//!
//! Modeled on the Linux kernel's `lib/list_sort.c`. Input elements are pushed
//! one at a time onto a stack of pending sorted runs. The stack is threaded
//! through the `prev` field of each run's first node, and the runs are
//! `None`-terminated chains through `next`.
//!
//! The number of elements pushed so far, `count`, drives the schedule: its
//! trailing one-bits count the pending runs that are already paired up, and
//! if any bit is set above the lowest clear bit, the two runs at that depth
//! have the same power-of-two size and are merged before the next push.
//! Merges therefore only ever combine equal-sized runs, and the pending runs
//! are left over at the end in strictly increasing size.
//!
//! The sort is stable and does no allocation.

use core::cmp::Ordering;

use crate::chain::{merge, merge_final};
use crate::LinkStorage;

/// Where a pending run is recorded: the `pending` variable itself, or the
/// `prev` field of the first node of the run above it.
#[derive(Clone, Copy)]
enum Slot<K> {
    Top,
    Below(K),
}

impl<K: Copy> Slot<K> {
    #[inline]
    fn get<S: LinkStorage<Key = K>>(self, store: &S, pending: Option<K>) -> Option<K> {
        match self {
            Slot::Top => pending,
            Slot::Below(node) => store.prev(node),
        }
    }

    #[inline]
    fn set<S: LinkStorage<Key = K>>(self, store: &mut S, pending: &mut Option<K>, run: Option<K>) {
        match self {
            Slot::Top => *pending = run,
            Slot::Below(node) => store.set_prev(node, run),
        }
    }
}

/// Sorts the circular list anchored at sentinel `head` in place.
///
/// `cmp(store, a, b)` orders two element keys; any state it captures plays the
/// role of a caller-supplied context. Elements that compare equal keep their
/// relative order.
///
/// Lists of zero or one elements are left untouched. On return the ring is
/// fully doubly-linked again.
///
/// # Example
///
/// ```rust
/// use intrusive_circular_list::{list_sort, CircularListOps, Link, LinkStorage};
///
/// struct Arena {
///     links: Vec<Link<usize>>,
///     values: Vec<u32>,
/// }
///
/// impl LinkStorage for Arena {
///     type Key = usize;
///     fn link(&self, key: usize) -> &Link<usize> {
///         &self.links[key]
///     }
///     fn link_mut(&mut self, key: usize) -> &mut Link<usize> {
///         &mut self.links[key]
///     }
/// }
///
/// let mut arena = Arena {
///     links: vec![Link::new(); 4],
///     values: vec![0, 30, 10, 20],
/// };
/// let ops = CircularListOps::new();
/// ops.make_circular(&mut arena, 0);
/// for key in 1..4 {
///     ops.insert_before(&mut arena, 0, key);
/// }
///
/// list_sort(&mut arena, 0, |a: &Arena, x, y| a.values[x].cmp(&a.values[y]));
///
/// let sorted: Vec<u32> = ops.entries(&arena, 0).map(|k| arena.values[k]).collect();
/// assert_eq!(sorted, vec![10, 20, 30]);
/// ```
pub fn list_sort<S, F>(store: &mut S, head: S::Key, mut cmp: F)
where
    S: LinkStorage,
    F: FnMut(&S, S::Key, S::Key) -> Ordering,
{
    let Some(first) = store.next(head) else {
        return;
    };
    let Some(last) = store.prev(head) else {
        return;
    };
    // Zero or one elements
    if first == head || first == last {
        return;
    }

    // Convert to a null-terminated singly-linked list.
    store.set_next(last, None);

    let mut list = Some(first);
    let mut pending: Option<S::Key> = None;
    let mut count: usize = 0;

    while let Some(node) = list {
        // Find the least-significant clear bit in count
        let mut tail = Slot::Top;
        let mut bits = count;
        while bits & 1 == 1 {
            if let Some(run) = tail.get(store, pending) {
                tail = Slot::Below(run);
            }
            bits >>= 1;
        }

        // Do the indicated merge
        if bits != 0 {
            if let Some(a) = tail.get(store, pending) {
                let b = store.prev(a);
                let below = b.and_then(|b| store.prev(b));
                let merged = merge(store, b, Some(a), &mut cmp);
                // Install the merged result in place of the inputs
                if let Some(merged) = merged {
                    store.set_prev(merged, below);
                }
                tail.set(store, &mut pending, merged);
            }
        }

        // Move one element from input list to pending
        store.set_prev(node, pending);
        pending = Some(node);
        list = store.next(node);
        store.set_next(node, None);
        count += 1;
    }

    // End of input; merge together all the pending lists.
    let mut list = pending;
    let mut pending = pending.and_then(|run| store.prev(run));
    loop {
        let Some(run) = pending else {
            crate::chain::restore_ring(store, head, list);
            return;
        };
        let Some(next) = store.prev(run) else {
            break;
        };
        list = merge(store, Some(run), list, &mut cmp);
        pending = Some(next);
    }

    // The final merge, rebuilding prev links
    match (pending, list) {
        (Some(a), Some(b)) => merge_final(store, head, a, b, &mut cmp),
        (a, b) => crate::chain::restore_ring(store, head, a.or(b)),
    }
}
