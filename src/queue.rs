//! Queue operations: insertion, removal and structural transforms
//!
//! # Time Complexity
//!
//! | Operation                | Complexity |
//! |--------------------------|------------|
//! | `insert_head`/`insert_tail` | O(len of string) |
//! | `remove_head`/`remove_tail` | O(len of string) |
//! | `size`                   | O(n)       |
//! | `delete_middle`          | O(n)       |
//! | `delete_duplicates`      | O(n)       |
//! | `swap_adjacent_pairs`    | O(n)       |
//! | `reverse`                | O(n)       |
//! | `reverse_in_groups`      | O(n)       |
//!
//! The element count is not cached, so `size` walks the whole queue.

use log::trace;

use crate::element::{copy_out, Element};
use crate::error::QueueError;
use crate::storage::{value_of, NodeKey, Queue, QueueStorage, Slot};
use crate::OPS;

/// Copies `s` into a fresh buffer, reporting allocation failure instead of
/// aborting.
fn copy_value(s: &str) -> Result<String, QueueError> {
    let mut value = String::new();
    value
        .try_reserve_exact(s.len())
        .map_err(|_| QueueError::AllocFailed)?;
    value.push_str(s);
    Ok(value)
}

impl QueueStorage {
    /// Inserts a copy of `s` at the head of `queue`.
    ///
    /// # Errors
    ///
    /// [`QueueError::UnknownQueue`] for an absent queue and
    /// [`QueueError::AllocFailed`] if the copy cannot be allocated. The queue is
    /// unchanged in both cases.
    pub fn insert_head(&mut self, queue: Queue, s: &str) -> Result<(), QueueError> {
        let head = self.head(queue).ok_or(QueueError::UnknownQueue)?;
        let key = self.slots.insert(Slot::element(copy_value(s)?));
        OPS.insert_after(&mut self.slots, head, key);
        Ok(())
    }

    /// Inserts a copy of `s` at the tail of `queue`.
    ///
    /// # Errors
    ///
    /// Same as [`insert_head`](Self::insert_head).
    pub fn insert_tail(&mut self, queue: Queue, s: &str) -> Result<(), QueueError> {
        let head = self.head(queue).ok_or(QueueError::UnknownQueue)?;
        let key = self.slots.insert(Slot::element(copy_value(s)?));
        OPS.insert_before(&mut self.slots, head, key);
        Ok(())
    }

    /// Detaches the first element of `queue` and hands it to the caller.
    ///
    /// If `out` is given, the value is copied into it as a NUL-terminated byte
    /// string of at most `out.len() - 1` bytes; longer values are truncated.
    ///
    /// Returns `None` for an empty or absent queue.
    pub fn remove_head(&mut self, queue: Queue, out: Option<&mut [u8]>) -> Option<Element> {
        let head = self.head(queue)?;
        if OPS.is_empty(&self.slots, head) {
            return None;
        }
        let key = OPS.next(&self.slots, head);
        self.detach(key, out)
    }

    /// Detaches the last element of `queue`. See [`remove_head`](Self::remove_head).
    pub fn remove_tail(&mut self, queue: Queue, out: Option<&mut [u8]>) -> Option<Element> {
        let head = self.head(queue)?;
        if OPS.is_empty(&self.slots, head) {
            return None;
        }
        let key = OPS.prev(&self.slots, head);
        self.detach(key, out)
    }

    fn detach(&mut self, key: NodeKey, out: Option<&mut [u8]>) -> Option<Element> {
        let value = self.release(key)?;
        if let Some(buf) = out {
            copy_out(&value, buf);
        }
        Some(Element::new(value))
    }

    /// Number of elements in `queue`, 0 if it is absent.
    pub fn size(&self, queue: Queue) -> usize {
        match self.head(queue) {
            Some(head) => OPS.count(&self.slots, head) - 1,
            None => 0,
        }
    }

    /// True if `queue` has no elements or is absent.
    pub fn is_empty(&self, queue: Queue) -> bool {
        self.head(queue)
            .map_or(true, |head| OPS.is_empty(&self.slots, head))
    }

    /// Deletes the element at index `n / 2` (0-based).
    ///
    /// The middle is found with a fast/slow walk from the first element.
    /// Returns `false` for an empty or absent queue.
    pub fn delete_middle(&mut self, queue: Queue) -> bool {
        let Some(head) = self.head(queue) else {
            return false;
        };
        if OPS.is_empty(&self.slots, head) {
            return false;
        }

        let mut slow = OPS.next(&self.slots, head);
        let mut fast = slow;
        loop {
            let after = OPS.next(&self.slots, fast);
            if fast == head || after == head {
                break;
            }
            slow = OPS.next(&self.slots, slow);
            fast = OPS.next(&self.slots, after);
        }

        self.release(slow);
        true
    }

    /// Deletes every element whose value equals a neighbour's, keeping only
    /// values that occur exactly once.
    ///
    /// Duplicates are only detected between consecutive elements, so the queue
    /// is expected to be sorted first; an unsorted queue loses only its
    /// adjacent repeats. Returns `false` only for an absent queue.
    pub fn delete_duplicates(&mut self, queue: Queue) -> bool {
        let Some(head) = self.head(queue) else {
            return false;
        };

        let mut node = OPS.next(&self.slots, head);
        while node != head {
            let mut run_end = node;
            let mut next = OPS.next(&self.slots, node);
            while next != head && value_of(&self.slots, next) == value_of(&self.slots, node) {
                run_end = next;
                next = OPS.next(&self.slots, next);
            }

            if run_end != node {
                let mut current = node;
                loop {
                    let after = OPS.next(&self.slots, current);
                    self.release(current);
                    if current == run_end {
                        break;
                    }
                    current = after;
                }
            }
            node = next;
        }
        true
    }

    /// Swaps the elements at positions (0, 1), (2, 3), ...
    ///
    /// A trailing unpaired element stays where it is.
    pub fn swap_adjacent_pairs(&mut self, queue: Queue) {
        let Some(head) = self.head(queue) else {
            return;
        };

        let mut node = OPS.next(&self.slots, head);
        while node != head {
            let next = OPS.next(&self.slots, node);
            if next == head {
                break;
            }
            OPS.move_after(&mut self.slots, node, next);
            node = OPS.next(&self.slots, node);
        }
    }

    /// Reverses `queue` in place.
    pub fn reverse(&mut self, queue: Queue) {
        if let Some(head) = self.head(queue) {
            OPS.reverse(&mut self.slots, head);
        }
    }

    /// Reverses every full group of `k` consecutive elements.
    ///
    /// A trailing group shorter than `k` keeps its order. `k <= 1` is a no-op.
    pub fn reverse_in_groups(&mut self, queue: Queue, k: usize) {
        let Some(head) = self.head(queue) else {
            return;
        };
        if k <= 1 {
            return;
        }

        let mut remaining = self.size(queue);
        let mut anchor = head;
        while remaining >= k {
            // The group's first element ends up last and anchors the next group
            let first = OPS.next(&self.slots, anchor);
            for _ in 1..k {
                let next = OPS.next(&self.slots, first);
                OPS.move_after(&mut self.slots, next, anchor);
            }
            trace!("reversed group of {k}, {remaining} elements left before it");
            remaining -= k;
            anchor = first;
        }
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
    fn test_insert_head_and_tail_order() {
        let mut storage = QueueStorage::new();
        let queue = storage.new_queue();
        storage.insert_tail(queue, "b").unwrap();
        storage.insert_head(queue, "a").unwrap();
        storage.insert_tail(queue, "c").unwrap();

        assert_eq!(storage.to_vec(queue), vec!["a", "b", "c"]);
        assert!(storage.check_invariants(queue));
    }

    #[test]
    fn test_insert_copies_the_string() {
        let mut storage = QueueStorage::new();
        let queue = storage.new_queue();
        let mut source = String::from("abc");
        storage.insert_tail(queue, &source).unwrap();
        source.push('d');

        assert_eq!(storage.to_vec(queue), vec!["abc"]);
    }

    #[test]
    fn test_insert_into_absent_queue() {
        let mut storage = QueueStorage::new();
        let queue = storage.new_queue();
        storage.free(queue);

        assert_eq!(storage.insert_head(queue, "a"), Err(QueueError::UnknownQueue));
        assert_eq!(storage.insert_tail(queue, "a"), Err(QueueError::UnknownQueue));
    }

    #[test]
    fn test_remove_head_and_tail() {
        let (mut storage, queue) = queue_of(&["one", "two", "three"]);

        let head = storage.remove_head(queue, None).unwrap();
        assert_eq!(head.value(), "one");
        let tail = storage.remove_tail(queue, None).unwrap();
        assert_eq!(tail.value(), "three");

        assert_eq!(storage.to_vec(queue), vec!["two"]);
        assert!(storage.check_invariants(queue));
    }

    #[test]
    fn test_remove_copies_into_buffer() {
        let (mut storage, queue) = queue_of(&["hello", "hi"]);

        let mut buf = [0xffu8; 3];
        let removed = storage.remove_head(queue, Some(&mut buf[..])).unwrap();
        assert_eq!(removed.value(), "hello");
        assert_eq!(&buf, b"he\0");

        let mut buf = [0xffu8; 16];
        storage.remove_tail(queue, Some(&mut buf[..])).unwrap();
        assert_eq!(&buf[..3], b"hi\0");
    }

    #[test]
    fn test_remove_from_empty() {
        let (mut storage, queue) = queue_of(&[]);
        let mut buf = [0xffu8; 4];

        assert!(storage.remove_head(queue, Some(&mut buf[..])).is_none());
        assert!(storage.remove_tail(queue, None).is_none());
        // Buffer untouched when nothing is removed
        assert_eq!(buf, [0xff; 4]);
    }

    #[test]
    fn test_size() {
        let (mut storage, queue) = queue_of(&["a", "b", "c"]);
        assert_eq!(storage.size(queue), 3);
        assert!(!storage.is_empty(queue));

        storage.free(queue);
        assert_eq!(storage.size(queue), 0);
        assert!(storage.is_empty(queue));
    }

    #[test]
    fn test_delete_middle_positions() {
        // index n / 2 for n = 1..=6
        let cases: [(&[&str], &[&str]); 6] = [
            (&["0"], &[]),
            (&["0", "1"], &["0"]),
            (&["0", "1", "2"], &["0", "2"]),
            (&["0", "1", "2", "3"], &["0", "1", "3"]),
            (&["0", "1", "2", "3", "4"], &["0", "1", "3", "4"]),
            (&["0", "1", "2", "3", "4", "5"], &["0", "1", "2", "4", "5"]),
        ];
        for (input, expected) in cases {
            let (mut storage, queue) = queue_of(input);
            assert!(storage.delete_middle(queue));
            assert_eq!(storage.to_vec(queue), expected, "input {input:?}");
            assert!(storage.check_invariants(queue));
        }
    }

    #[test]
    fn test_delete_middle_empty() {
        let (mut storage, queue) = queue_of(&[]);
        assert!(!storage.delete_middle(queue));

        storage.free(queue);
        assert!(!storage.delete_middle(queue));
    }

    #[test]
    fn test_delete_duplicates() {
        let (mut storage, queue) = queue_of(&["a", "a", "b", "c", "c", "c"]);
        assert!(storage.delete_duplicates(queue));
        assert_eq!(storage.to_vec(queue), vec!["b"]);
        assert!(storage.check_invariants(queue));
    }

    #[test]
    fn test_delete_duplicates_edges() {
        let (mut storage, queue) = queue_of(&[]);
        assert!(storage.delete_duplicates(queue));

        let (mut storage, queue) = queue_of(&["x", "x"]);
        assert!(storage.delete_duplicates(queue));
        assert!(storage.to_vec(queue).is_empty());

        let (mut storage, queue) = queue_of(&["a", "b", "b", "c"]);
        assert!(storage.delete_duplicates(queue));
        assert_eq!(storage.to_vec(queue), vec!["a", "c"]);

        storage.free(queue);
        assert!(!storage.delete_duplicates(queue));
    }

    #[test]
    fn test_delete_duplicates_unsorted_only_adjacent() {
        let (mut storage, queue) = queue_of(&["a", "b", "a", "a"]);
        assert!(storage.delete_duplicates(queue));
        assert_eq!(storage.to_vec(queue), vec!["a", "b"]);
    }

    #[test]
    fn test_swap_adjacent_pairs() {
        let (mut storage, queue) = queue_of(&["1", "2", "3", "4", "5"]);
        storage.swap_adjacent_pairs(queue);
        assert_eq!(storage.to_vec(queue), vec!["2", "1", "4", "3", "5"]);
        assert!(storage.check_invariants(queue));

        let (mut storage, queue) = queue_of(&["1", "2", "3", "4"]);
        storage.swap_adjacent_pairs(queue);
        assert_eq!(storage.to_vec(queue), vec!["2", "1", "4", "3"]);

        let (mut storage, queue) = queue_of(&["1"]);
        storage.swap_adjacent_pairs(queue);
        assert_eq!(storage.to_vec(queue), vec!["1"]);
    }

    #[test]
    fn test_reverse() {
        let (mut storage, queue) = queue_of(&["a", "b", "c", "d"]);
        storage.reverse(queue);
        assert_eq!(storage.to_vec(queue), vec!["d", "c", "b", "a"]);
        assert!(storage.check_invariants(queue));

        let (mut storage, queue) = queue_of(&[]);
        storage.reverse(queue);
        assert!(storage.to_vec(queue).is_empty());
    }

    #[test]
    fn test_reverse_in_groups() {
        let (mut storage, queue) = queue_of(&["1", "2", "3", "4", "5"]);
        storage.reverse_in_groups(queue, 2);
        assert_eq!(storage.to_vec(queue), vec!["2", "1", "4", "3", "5"]);
        assert!(storage.check_invariants(queue));

        let (mut storage, queue) = queue_of(&["1", "2", "3", "4", "5", "6", "7", "8"]);
        storage.reverse_in_groups(queue, 3);
        assert_eq!(
            storage.to_vec(queue),
            vec!["3", "2", "1", "6", "5", "4", "7", "8"]
        );
        assert!(storage.check_invariants(queue));
    }

    #[test]
    fn test_reverse_in_groups_degenerate_k() {
        let (mut storage, queue) = queue_of(&["1", "2", "3"]);
        storage.reverse_in_groups(queue, 0);
        storage.reverse_in_groups(queue, 1);
        assert_eq!(storage.to_vec(queue), vec!["1", "2", "3"]);

        storage.reverse_in_groups(queue, 4);
        assert_eq!(storage.to_vec(queue), vec!["1", "2", "3"]);

        storage.reverse_in_groups(queue, 3);
        assert_eq!(storage.to_vec(queue), vec!["3", "2", "1"]);
    }
}
