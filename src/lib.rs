//! Slab-backed doubly-linked text queues with in-place sorting, merging,
//! and filtering.
//!
//! # Design
//!
//! A classic linked queue owns its nodes through raw pointers; removal from
//! the middle, splicing, and moving nodes between queues all become pointer
//! surgery that nothing checks. This crate separates storage from structure
//! instead:
//!
//! ```text
//! Pool  (slab::Slab)  - owns every node, hands out stable NodeIds
//! Queue               - coordinates ids: head, tail, embedded prev/next links
//! ```
//!
//! Benefits:
//! - **Stable ids**: remove from the middle without invalidating other ids
//! - **O(1) splicing**: concatenate or cut queues without touching payloads
//! - **Ownership transfer**: moving an element between queues is
//!   `unlink` + `link_back` over one shared pool, never an aliased pointer
//! - **Checked access**: a stale id yields `None`, not undefined behavior
//!
//! # Quick start
//!
//! ```
//! use textq::{Direction, Pool, Queue};
//!
//! let mut pool = Pool::new();
//! let mut queue = Queue::new();
//!
//! for text in ["pear", "apple", "fig"] {
//!     queue.try_push_back(&mut pool, text).unwrap();
//! }
//!
//! queue.sort(&mut pool, Direction::Ascending);
//!
//! assert_eq!(queue.pop_front(&mut pool).unwrap().as_str(), "apple");
//! assert_eq!(queue.len(), 2);
//! ```
//!
//! Or, for the common one-queue case, [`OwnedQueue`] bundles the pool and
//! frees everything on drop:
//!
//! ```
//! use textq::OwnedQueue;
//!
//! let mut queue = OwnedQueue::new();
//! queue.try_push_front("world").unwrap();
//! queue.try_push_front("hello").unwrap();
//! assert_eq!(queue.pop_front().unwrap().as_str(), "hello");
//! ```
//!
//! # Merging queues
//!
//! Queues sharing a pool can exchange elements freely; [`merge_queues`]
//! relinks every element of a group of queues into the first one, sorted:
//!
//! ```
//! use textq::{merge_queues, Direction, Pool, Queue};
//!
//! let mut pool = Pool::new();
//! let mut queues: Vec<Queue> = (0..3).map(|_| Queue::new()).collect();
//!
//! for (i, text) in ["b", "c", "a", "f", "e", "d"].iter().enumerate() {
//!     queues[i % 3].try_push_back(&mut pool, text).unwrap();
//! }
//!
//! let total = merge_queues(&mut pool, &mut queues, Direction::Ascending);
//! assert_eq!(total, 6);
//! assert_eq!(queues[0].len(), 6);
//! ```
//!
//! # Critical invariant: same pool
//!
//! Every operation on a queue must use the pool its elements live in, and
//! queues exchanging elements must share one pool. Lookups are
//! bounds-checked, so mixing pools cannot corrupt memory, but link
//! operations will panic on ids the pool does not know. Same discipline as
//! the `slab` crate.
//!
//! # Operations
//!
//! | Operation | Cost | Notes |
//! |-----------|------|-------|
//! | `try_push_front` / `try_push_back` | O(1) | fails only on a bounded pool at capacity |
//! | `pop_front` / `pop_back` / `remove` | O(1) | `_into` variants add a truncating copy-out |
//! | `append` / `prepend` | O(1) | splice, the source queue ends empty |
//! | `split_off` | O(n) | in the split-off half |
//! | `reverse` / `reverse_k` / `swap_pairs` | O(n) | in place |
//! | `delete_middle` | O(n) | fast/slow two-pointer walk |
//! | `dedup` | O(n) | sorted input; removes *all* members of a duplicate run |
//! | `sort` | O(n log n) | merge sort, not stable |
//! | `retain_monotonic` | O(n) | tail-to-head monotonic filter |
//! | [`merge_queues`] | O(n log n) | k-way, relinks into the first queue |
//!
//! # Concurrency
//!
//! None. Everything is single-threaded and synchronous; operations run to
//! completion and leave the queue invariant restored. Embedding this in a
//! concurrent system means serializing access to a pool and every queue
//! over it.

#![warn(missing_docs)]

pub mod merge;
pub mod node;
pub mod order;
pub mod owned;
pub mod pool;
pub mod queue;
pub mod text;

pub use merge::merge_queues;
pub use node::NodeId;
pub use order::Direction;
pub use owned::OwnedQueue;
pub use pool::{Full, Pool};
pub use queue::{Cursor, Iter, Keys, Queue};
pub use text::Payload;
