//! Linked String Queues with In-Place Merge Sorts
//!
//! This crate provides a queue of owned strings stored as a circular
//! doubly-linked list, together with sorting and restructuring algorithms that
//! work directly on the list's links: no auxiliary array and no allocation
//! while sorting.
//!
//! # Features
//!
//! - **Queue**: O(1) insert/remove at both ends, O(n) size, swap, reverse,
//!   reverse in groups, delete middle, delete duplicates
//! - **Natural Merge Sort** ([`QueueStorage::sort`]): stable, splits the list
//!   into ascending runs and merges them pairwise; n - 1 comparisons on sorted
//!   input
//! - **Bit-Accumulator Merge Sort** ([`QueueStorage::list_sort`]): stable,
//!   always merges equal-sized power-of-two runs, as the Linux kernel's
//!   `list_sort`; the generic version works on any
//!   [`LinkStorage`](intrusive_circular_list::LinkStorage)
//! - **Monotonic Filters** ([`QueueStorage::descend`],
//!   [`QueueStorage::ascend`]): O(n) suffix maxima / minima
//! - **K-way Merge** ([`QueueStorage::merge_all`]): O(N log k) merge of k sorted
//!   queues listed in a [`ContextChain`]
//!
//! All queues of a [`QueueStorage`] share one arena, so merging queues moves
//! keys and never copies strings.
//!
//! # Example
//!
//! ```rust
//! use linked_queue_sort::{Direction, QueueStorage};
//!
//! let mut storage = QueueStorage::new();
//! let queue = storage.new_queue();
//! for value in ["banana", "apple", "cherry"] {
//!     storage.insert_tail(queue, value).unwrap();
//! }
//!
//! storage.sort(queue, Direction::Ascending);
//!
//! let mut buf = [0u8; 4];
//! let element = storage.remove_head(queue, Some(&mut buf[..])).unwrap();
//! assert_eq!(element.value(), "apple");
//! assert_eq!(&buf, b"app\0");
//! assert_eq!(storage.size(queue), 2);
//! ```

use intrusive_circular_list::CircularListOps;

pub mod element;
pub mod error;
pub mod filter;
pub mod merge;
pub mod queue;
pub mod sort;
pub mod storage;

pub use element::Element;
pub use error::QueueError;
pub use merge::{ContextChain, ContextKey, QueueContext};
pub use sort::{Direction, SortStats};
pub use storage::{NodeKey, Queue, QueueStorage};

/// List operations shared by every module
pub(crate) const OPS: CircularListOps = CircularListOps::new();
