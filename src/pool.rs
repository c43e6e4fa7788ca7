//! Node arena shared by any number of queues.
//!
//! A [`Pool`] owns every node; queues coordinate [`NodeId`]s into it. This
//! split is what makes moving an element between queues an ownership
//! transfer: the node stays put in the pool while `unlink`/`link_*` rewire
//! which queue reaches it.
//!
//! # Same-pool invariant
//!
//! A queue must always be used with the pool its nodes were inserted into.
//! Mixing pools is not memory-unsafe (lookups are bounds-checked), but the
//! results are meaningless and link operations will panic on ids the other
//! pool does not know. This is the caller's responsibility, same discipline
//! as the `slab` crate.

use core::fmt;

use slab::Slab;

use crate::node::{Node, NodeId};
use crate::text::Payload;

/// Error returned when a bounded pool is at capacity.
///
/// The insertion had no effect; the caller still owns the text it tried to
/// insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full;

impl fmt::Display for Full {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool is full")
    }
}

impl std::error::Error for Full {}

/// Arena of queue nodes with stable indices.
///
/// Backed by [`slab::Slab`]: O(1) insert/remove/get, removed slots are
/// reused, and an id stays valid until its node is removed.
///
/// # Example
///
/// ```
/// use textq::{Pool, Queue};
///
/// let mut pool = Pool::new();
/// let mut queue = Queue::new();
///
/// let id = queue.try_push_back(&mut pool, "hello").unwrap();
/// assert_eq!(pool.get(id).unwrap().as_str(), "hello");
/// ```
#[derive(Debug)]
pub struct Pool {
    nodes: Slab<Node>,
    limit: Option<usize>,
}

impl Pool {
    /// Creates an unbounded pool.
    #[inline]
    pub fn new() -> Self {
        Self {
            nodes: Slab::new(),
            limit: None,
        }
    }

    /// Creates an unbounded pool with space preallocated for `capacity`
    /// nodes.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
            limit: None,
        }
    }

    /// Creates a bounded pool holding at most `capacity` live nodes.
    ///
    /// Insertions beyond the bound fail with [`Full`] and leave every queue
    /// unchanged.
    #[inline]
    pub fn bounded(capacity: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
            limit: Some(capacity),
        }
    }

    /// Returns the number of live nodes across all queues using this pool.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no nodes are live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the insertion bound, or `None` for an unbounded pool.
    #[inline]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the payload of a live node.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Payload> {
        self.nodes.get(id.0).map(|node| &node.value)
    }

    // ========================================================================
    // Crate-internal node access
    // ========================================================================

    /// Allocates a node, returning its id.
    #[inline]
    pub(crate) fn try_insert(&mut self, node: Node) -> Result<NodeId, Full> {
        if let Some(limit) = self.limit
            && self.nodes.len() >= limit
        {
            return Err(Full);
        }

        Ok(NodeId(self.nodes.insert(node)))
    }

    /// Removes a node, returning it if it was live.
    #[inline]
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.try_remove(id.0)
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Returns a node without a bounds check.
    ///
    /// # Safety
    ///
    /// `id` must be live in this pool.
    #[inline]
    pub(crate) unsafe fn node_unchecked(&self, id: NodeId) -> &Node {
        unsafe { self.nodes.get(id.0).unwrap_unchecked() }
    }

    /// Returns a node mutably without a bounds check.
    ///
    /// # Safety
    ///
    /// `id` must be live in this pool.
    #[inline]
    pub(crate) unsafe fn node_unchecked_mut(&mut self, id: NodeId) -> &mut Node {
        unsafe { self.nodes.get_mut(id.0).unwrap_unchecked() }
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}
