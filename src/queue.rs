//! Doubly-linked text queue over a shared node pool.
//!
//! A [`Queue`] tracks head, tail, and length; nodes live in a [`Pool`] and
//! embed their own links. Any number of queues can share one pool, which is
//! what lets the multi-queue operations relink elements across queue
//! boundaries without copying.
//!
//! Two layers of API:
//!
//! - **Element operations** allocate and free nodes: `try_push_*`, `pop_*`,
//!   `remove`, `clear`, and the structural transforms.
//! - **Link operations** only rewire: `link_*`, `unlink`, `append`,
//!   `prepend`, `split_off`, `move_to_*`. Use `unlink` + `link_*` to move a
//!   node between queues sharing a pool; the node's id stays valid.
//!
//! # Queue invariant
//!
//! For every node in a queue, its `next` neighbor's `prev` points back at it
//! and vice versa, with the queue's head and tail terminating both
//! directions. Every mutation below restores this before returning.

use crate::node::{Node, NodeId};
use crate::pool::{Full, Pool};
use crate::text::Payload;

/// A doubly-linked queue of text payloads.
///
/// Plain coordination data: the queue does not own the pool, and dropping a
/// `Queue` does not free its nodes; call [`clear`](Queue::clear) or use
/// [`OwnedQueue`](crate::OwnedQueue), which bundles both and frees on drop.
///
/// # Example
///
/// ```
/// use textq::{Pool, Queue};
///
/// let mut pool = Pool::new();
/// let mut queue = Queue::new();
///
/// queue.try_push_back(&mut pool, "b").unwrap();
/// queue.try_push_front(&mut pool, "a").unwrap();
///
/// assert_eq!(queue.len(), 2);
/// assert_eq!(queue.pop_front(&mut pool).unwrap().as_str(), "a");
/// assert_eq!(queue.pop_back(&mut pool).unwrap().as_str(), "b");
/// ```
#[derive(Debug)]
pub struct Queue {
    head: NodeId,
    tail: NodeId,
    len: usize,
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl Queue {
    /// Creates an empty queue.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: NodeId::NONE,
            tail: NodeId::NONE,
            len: 0,
        }
    }

    /// Returns the number of elements in the queue.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the queue is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the first element's id, or `None` if empty.
    #[inline]
    pub fn front_key(&self) -> Option<NodeId> {
        if self.head.is_none() {
            None
        } else {
            Some(self.head)
        }
    }

    /// Returns the last element's id, or `None` if empty.
    #[inline]
    pub fn back_key(&self) -> Option<NodeId> {
        if self.tail.is_none() {
            None
        } else {
            Some(self.tail)
        }
    }

    /// Returns the first element's payload.
    #[inline]
    pub fn front<'a>(&self, pool: &'a Pool) -> Option<&'a Payload> {
        if self.head.is_none() {
            None
        } else {
            // Safety: head is live when not NONE
            Some(unsafe { &pool.node_unchecked(self.head).value })
        }
    }

    /// Returns the last element's payload.
    #[inline]
    pub fn back<'a>(&self, pool: &'a Pool) -> Option<&'a Payload> {
        if self.tail.is_none() {
            None
        } else {
            // Safety: tail is live when not NONE
            Some(unsafe { &pool.node_unchecked(self.tail).value })
        }
    }

    /// Returns `true` if `id` is currently the head of this queue.
    #[inline]
    pub fn is_head(&self, id: NodeId) -> bool {
        self.head == id
    }

    /// Returns `true` if `id` is currently the tail of this queue.
    #[inline]
    pub fn is_tail(&self, id: NodeId) -> bool {
        self.tail == id
    }

    /// Returns the id of the node after `id`.
    ///
    /// Returns `None` if `id` is the tail or not live.
    #[inline]
    pub fn next_key(&self, pool: &Pool, id: NodeId) -> Option<NodeId> {
        let next = pool.node(id)?.next;
        if next.is_none() { None } else { Some(next) }
    }

    /// Returns the id of the node before `id`.
    ///
    /// Returns `None` if `id` is the head or not live.
    #[inline]
    pub fn prev_key(&self, pool: &Pool, id: NodeId) -> Option<NodeId> {
        let prev = pool.node(id)?.prev;
        if prev.is_none() { None } else { Some(prev) }
    }

    // ========================================================================
    // Element insertion (allocate + link)
    // ========================================================================

    /// Copies `text` into a new element linked at the front.
    ///
    /// # Errors
    ///
    /// Returns `Err(Full)` if the pool is bounded and at capacity; the queue
    /// is unchanged.
    #[inline]
    pub fn try_push_front(&mut self, pool: &mut Pool, text: &str) -> Result<NodeId, Full> {
        let id = pool.try_insert(Node::new(Payload::new(text)))?;
        self.link_front(pool, id);
        Ok(id)
    }

    /// Copies `text` into a new element linked at the back.
    ///
    /// # Errors
    ///
    /// Returns `Err(Full)` if the pool is bounded and at capacity; the queue
    /// is unchanged.
    #[inline]
    pub fn try_push_back(&mut self, pool: &mut Pool, text: &str) -> Result<NodeId, Full> {
        let id = pool.try_insert(Node::new(Payload::new(text)))?;
        self.link_back(pool, id);
        Ok(id)
    }

    /// Copies `text` into a new element linked after `after`.
    ///
    /// # Errors
    ///
    /// Returns `Err(Full)` if the pool is bounded and at capacity.
    ///
    /// # Panics
    ///
    /// Panics if `after` is not live in the pool.
    #[inline]
    pub fn try_insert_after(
        &mut self,
        pool: &mut Pool,
        after: NodeId,
        text: &str,
    ) -> Result<NodeId, Full> {
        let id = pool.try_insert(Node::new(Payload::new(text)))?;
        self.link_after(pool, after, id);
        Ok(id)
    }

    /// Copies `text` into a new element linked before `before`.
    ///
    /// # Errors
    ///
    /// Returns `Err(Full)` if the pool is bounded and at capacity.
    ///
    /// # Panics
    ///
    /// Panics if `before` is not live in the pool.
    #[inline]
    pub fn try_insert_before(
        &mut self,
        pool: &mut Pool,
        before: NodeId,
        text: &str,
    ) -> Result<NodeId, Full> {
        let id = pool.try_insert(Node::new(Payload::new(text)))?;
        self.link_before(pool, before, id);
        Ok(id)
    }

    // ========================================================================
    // Element removal (unlink + free)
    // ========================================================================

    /// Removes and returns the first payload.
    ///
    /// Returns `None` if the queue is empty.
    #[inline]
    pub fn pop_front(&mut self, pool: &mut Pool) -> Option<Payload> {
        if self.head.is_none() {
            return None;
        }

        let id = self.head;
        self.unlink(pool, id);
        pool.remove(id).map(|node| node.value)
    }

    /// Removes and returns the last payload.
    ///
    /// Returns `None` if the queue is empty.
    #[inline]
    pub fn pop_back(&mut self, pool: &mut Pool) -> Option<Payload> {
        if self.tail.is_none() {
            return None;
        }

        let id = self.tail;
        self.unlink(pool, id);
        pool.remove(id).map(|node| node.value)
    }

    /// Removes an element by id, returning its payload.
    ///
    /// `id` must belong to this queue (same caveat as every link operation:
    /// membership is not tracked). Returns `None` if `id` is not live.
    #[inline]
    pub fn remove(&mut self, pool: &mut Pool, id: NodeId) -> Option<Payload> {
        pool.node(id)?;
        self.unlink(pool, id);
        pool.remove(id).map(|node| node.value)
    }

    /// Like [`remove`](Queue::remove), additionally writing the payload into
    /// `buf` truncated and NUL-terminated (see [`Payload::copy_to`]).
    #[inline]
    pub fn remove_into(&mut self, pool: &mut Pool, id: NodeId, buf: &mut [u8]) -> Option<Payload> {
        let payload = self.remove(pool, id)?;
        payload.copy_to(buf);
        Some(payload)
    }

    /// [`pop_front`](Queue::pop_front) with the truncating copy-out into
    /// `buf`.
    #[inline]
    pub fn pop_front_into(&mut self, pool: &mut Pool, buf: &mut [u8]) -> Option<Payload> {
        let payload = self.pop_front(pool)?;
        payload.copy_to(buf);
        Some(payload)
    }

    /// [`pop_back`](Queue::pop_back) with the truncating copy-out into `buf`.
    #[inline]
    pub fn pop_back_into(&mut self, pool: &mut Pool, buf: &mut [u8]) -> Option<Payload> {
        let payload = self.pop_back(pool)?;
        payload.copy_to(buf);
        Some(payload)
    }

    /// Removes and frees every element.
    pub fn clear(&mut self, pool: &mut Pool) {
        let mut id = self.head;
        while id.is_some() {
            // Safety: traversal stays on live nodes
            let next = unsafe { pool.node_unchecked(id) }.next;
            pool.remove(id);
            id = next;
        }

        self.head = NodeId::NONE;
        self.tail = NodeId::NONE;
        self.len = 0;
    }

    // ========================================================================
    // Link operations (rewire only, no alloc/free)
    // ========================================================================

    /// Links an existing node at the front.
    ///
    /// The node must be live in the pool and not linked into any queue.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live in the pool.
    #[inline]
    pub fn link_front(&mut self, pool: &mut Pool, id: NodeId) {
        let node = pool.node_mut(id).expect("invalid node");
        node.next = self.head;
        node.prev = NodeId::NONE;

        if self.head.is_some() {
            // Safety: head is live when not NONE
            unsafe { pool.node_unchecked_mut(self.head) }.prev = id;
        } else {
            self.tail = id;
        }

        self.head = id;
        self.len += 1;
    }

    /// Links an existing node at the back.
    ///
    /// The node must be live in the pool and not linked into any queue.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live in the pool.
    #[inline]
    pub fn link_back(&mut self, pool: &mut Pool, id: NodeId) {
        let node = pool.node_mut(id).expect("invalid node");
        node.prev = self.tail;
        node.next = NodeId::NONE;

        if self.tail.is_some() {
            // Safety: tail is live when not NONE
            unsafe { pool.node_unchecked_mut(self.tail) }.next = id;
        } else {
            self.head = id;
        }

        self.tail = id;
        self.len += 1;
    }

    /// Links an existing node immediately after `after`.
    ///
    /// # Panics
    ///
    /// Panics if `after` or `id` is not live in the pool.
    #[inline]
    pub fn link_after(&mut self, pool: &mut Pool, after: NodeId, id: NodeId) {
        let next = pool.node(after).expect("invalid 'after' node").next;
        let node = pool.node_mut(id).expect("invalid node");
        node.prev = after;
        node.next = next;

        // Safety: after validated above
        unsafe { pool.node_unchecked_mut(after) }.next = id;

        if next.is_some() {
            // Safety: next is live (queue invariant)
            unsafe { pool.node_unchecked_mut(next) }.prev = id;
        } else {
            self.tail = id;
        }

        self.len += 1;
    }

    /// Links an existing node immediately before `before`.
    ///
    /// # Panics
    ///
    /// Panics if `before` or `id` is not live in the pool.
    #[inline]
    pub fn link_before(&mut self, pool: &mut Pool, before: NodeId, id: NodeId) {
        let prev = pool.node(before).expect("invalid 'before' node").prev;
        let node = pool.node_mut(id).expect("invalid node");
        node.next = before;
        node.prev = prev;

        // Safety: before validated above
        unsafe { pool.node_unchecked_mut(before) }.prev = id;

        if prev.is_some() {
            // Safety: prev is live (queue invariant)
            unsafe { pool.node_unchecked_mut(prev) }.next = id;
        } else {
            self.head = id;
        }

        self.len += 1;
    }

    /// Unlinks a node from the queue without freeing it.
    ///
    /// The node's own links are reset so it is inert and can be relinked
    /// into any queue over the same pool. Returns `true` if the node was
    /// linked here.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live in the pool.
    #[inline]
    pub fn unlink(&mut self, pool: &mut Pool, id: NodeId) -> bool {
        let node = pool.node(id).expect("invalid node");
        let prev = node.prev;
        let next = node.next;

        let linked = prev.is_some() || next.is_some() || self.head == id;
        if !linked {
            return false;
        }

        if prev.is_some() {
            // Safety: prev is live (queue invariant)
            unsafe { pool.node_unchecked_mut(prev) }.next = next;
        } else {
            self.head = next;
        }

        if next.is_some() {
            // Safety: next is live (queue invariant)
            unsafe { pool.node_unchecked_mut(next) }.prev = prev;
        } else {
            self.tail = prev;
        }

        // Reset the node's links so it is safely reusable.
        // Safety: id validated above
        let node = unsafe { pool.node_unchecked_mut(id) };
        node.prev = NodeId::NONE;
        node.next = NodeId::NONE;

        self.len -= 1;
        true
    }

    /// Moves a node to the front of the queue in one step.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live in the pool.
    #[inline]
    pub fn move_to_front(&mut self, pool: &mut Pool, id: NodeId) {
        if self.head == id {
            return;
        }

        let node = pool.node(id).expect("invalid node");
        let prev = node.prev;
        let next = node.next;

        if prev.is_some() {
            // Safety: prev is live (queue invariant)
            unsafe { pool.node_unchecked_mut(prev) }.next = next;
        }
        // prev can't be NONE here since id != head

        if next.is_some() {
            // Safety: next is live (queue invariant)
            unsafe { pool.node_unchecked_mut(next) }.prev = prev;
        } else {
            self.tail = prev;
        }

        // Safety: head is live (queue is non-empty)
        unsafe { pool.node_unchecked_mut(self.head) }.prev = id;

        // Safety: id validated above
        let node = unsafe { pool.node_unchecked_mut(id) };
        node.next = self.head;
        node.prev = NodeId::NONE;

        self.head = id;
    }

    /// Moves a node to the back of the queue in one step.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live in the pool.
    #[inline]
    pub fn move_to_back(&mut self, pool: &mut Pool, id: NodeId) {
        if self.tail == id {
            return;
        }

        let node = pool.node(id).expect("invalid node");
        let prev = node.prev;
        let next = node.next;

        if prev.is_some() {
            // Safety: prev is live (queue invariant)
            unsafe { pool.node_unchecked_mut(prev) }.next = next;
        } else {
            self.head = next;
        }

        if next.is_some() {
            // Safety: next is live (queue invariant)
            unsafe { pool.node_unchecked_mut(next) }.prev = prev;
        }
        // next can't be NONE here since id != tail

        // Safety: tail is live (queue is non-empty)
        unsafe { pool.node_unchecked_mut(self.tail) }.next = id;

        // Safety: id validated above
        let node = unsafe { pool.node_unchecked_mut(id) };
        node.prev = self.tail;
        node.next = NodeId::NONE;

        self.tail = id;
    }

    // ========================================================================
    // Splicing and cutting
    // ========================================================================

    /// Splices `other` onto the back of this queue. O(1).
    ///
    /// `other` is empty afterwards.
    #[inline]
    pub fn append(&mut self, pool: &mut Pool, other: &mut Queue) {
        if other.is_empty() {
            return;
        }

        if self.is_empty() {
            self.head = other.head;
            self.tail = other.tail;
            self.len = other.len;
        } else {
            // Safety: both queues are non-empty
            unsafe { pool.node_unchecked_mut(self.tail) }.next = other.head;
            unsafe { pool.node_unchecked_mut(other.head) }.prev = self.tail;
            self.tail = other.tail;
            self.len += other.len;
        }

        other.head = NodeId::NONE;
        other.tail = NodeId::NONE;
        other.len = 0;
    }

    /// Splices `other` onto the front of this queue. O(1).
    ///
    /// `other` is empty afterwards.
    #[inline]
    pub fn prepend(&mut self, pool: &mut Pool, other: &mut Queue) {
        if other.is_empty() {
            return;
        }

        if self.is_empty() {
            self.head = other.head;
            self.tail = other.tail;
            self.len = other.len;
        } else {
            // Safety: both queues are non-empty
            unsafe { pool.node_unchecked_mut(other.tail) }.next = self.head;
            unsafe { pool.node_unchecked_mut(self.head) }.prev = other.tail;
            self.head = other.head;
            self.len += other.len;
        }

        other.head = NodeId::NONE;
        other.tail = NodeId::NONE;
        other.len = 0;
    }

    /// Splits the queue at the given node.
    ///
    /// Returns a new queue containing `id` and everything after it; `self`
    /// keeps everything before. O(n) in the split-off portion for the length
    /// recount.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live in the pool.
    pub fn split_off(&mut self, pool: &mut Pool, id: NodeId) -> Queue {
        let prev = pool.node(id).expect("invalid node").prev;

        // Splitting at the head takes everything.
        if self.head == id {
            let other = Queue {
                head: self.head,
                tail: self.tail,
                len: self.len,
            };
            *self = Queue::new();
            return other;
        }

        let mut count = 0;
        let mut curr = id;
        while curr.is_some() {
            count += 1;
            // Safety: traversal stays on live nodes
            curr = unsafe { pool.node_unchecked(curr) }.next;
        }

        // Safety: id != head, so prev is live
        unsafe { pool.node_unchecked_mut(prev) }.next = NodeId::NONE;
        unsafe { pool.node_unchecked_mut(id) }.prev = NodeId::NONE;

        let other = Queue {
            head: id,
            tail: self.tail,
            len: count,
        };

        self.tail = prev;
        self.len -= count;

        other
    }

    // ========================================================================
    // Structural transforms
    // ========================================================================

    /// Reverses the queue in place. O(n) time, O(1) extra space.
    pub fn reverse(&mut self, pool: &mut Pool) {
        if self.len < 2 {
            return;
        }

        let mut id = self.head;
        while id.is_some() {
            // Capture the successor before relinking.
            // Safety: traversal stays on live nodes
            let next = unsafe { pool.node_unchecked(id) }.next;
            self.move_to_front(pool, id);
            id = next;
        }
    }

    /// Reverses every maximal run of `k` consecutive elements, left to
    /// right. A trailing run shorter than `k` keeps its order. `k <= 1` is a
    /// no-op.
    pub fn reverse_k(&mut self, pool: &mut Pool, k: usize) {
        if k <= 1 || self.len < 2 {
            return;
        }

        let mut done = Queue::new();
        while self.len >= k {
            let mut group = if self.len == k {
                core::mem::take(self)
            } else {
                let mut boundary = self.head;
                for _ in 0..k {
                    // Safety: more than k nodes remain, so every hop is live
                    boundary = unsafe { pool.node_unchecked(boundary) }.next;
                }
                let rest = self.split_off(pool, boundary);
                core::mem::replace(self, rest)
            };

            group.reverse(pool);
            done.append(pool, &mut group);
        }

        // Trailing run shorter than k keeps its order.
        done.append(pool, self);
        *self = done;
    }

    /// Swaps each adjacent pair of elements (1st/2nd, 3rd/4th, ...).
    ///
    /// An odd trailing element stays in place.
    pub fn swap_pairs(&mut self, pool: &mut Pool) {
        if self.len < 2 {
            return;
        }

        let mut first = self.head;
        while first.is_some() {
            // Safety: first is live
            let second = unsafe { pool.node_unchecked(first) }.next;
            if second.is_none() {
                break;
            }

            self.unlink(pool, second);
            self.link_before(pool, first, second);

            // Safety: first is still live; its next is the element after the
            // swapped pair
            first = unsafe { pool.node_unchecked(first) }.next;
        }
    }

    /// Finds the middle element via the synchronized fast/slow walk.
    ///
    /// For even lengths this is the later of the two central elements.
    pub(crate) fn middle(&self, pool: &Pool) -> Option<NodeId> {
        if self.head.is_none() {
            return None;
        }

        let mut slow = self.head;
        let mut fast = self.head;
        while fast.is_some() {
            // Safety: fast and slow stay on live nodes
            let step = unsafe { pool.node_unchecked(fast) }.next;
            if step.is_none() {
                break;
            }
            slow = unsafe { pool.node_unchecked(slow) }.next;
            fast = unsafe { pool.node_unchecked(step) }.next;
        }

        Some(slow)
    }

    /// Removes and frees the middle element.
    ///
    /// For even lengths the later of the two central elements is removed.
    /// Returns `false` on an empty queue.
    pub fn delete_middle(&mut self, pool: &mut Pool) -> bool {
        let Some(mid) = self.middle(pool) else {
            return false;
        };

        self.unlink(pool, mid);
        pool.remove(mid);
        true
    }

    /// Removes every element whose payload is duplicated, leaving zero
    /// representatives of any duplicated value. Returns the number removed.
    ///
    /// Only adjacent payloads are compared, so the queue must already be
    /// sorted by payload; on unsorted input only adjacent runs collapse.
    pub fn dedup(&mut self, pool: &mut Pool) -> usize {
        let mut removed = 0;
        let mut run_start = self.head;

        while run_start.is_some() {
            // Extend the run over equal adjacent payloads.
            let mut run_end = run_start;
            let mut run_len = 1usize;
            loop {
                // Safety: run traversal stays on live nodes
                let next = unsafe { pool.node_unchecked(run_end) }.next;
                if next.is_none() {
                    break;
                }
                let same = unsafe {
                    pool.node_unchecked(next).value == pool.node_unchecked(run_start).value
                };
                if !same {
                    break;
                }
                run_end = next;
                run_len += 1;
            }

            // Safety: run_end is live
            let after = unsafe { pool.node_unchecked(run_end) }.next;

            if run_len > 1 {
                let mut id = run_start;
                loop {
                    // Capture the successor before unlinking resets it.
                    // Safety: id is live until removed below
                    let next = unsafe { pool.node_unchecked(id) }.next;
                    self.unlink(pool, id);
                    pool.remove(id);
                    removed += 1;
                    if id == run_end {
                        break;
                    }
                    id = next;
                }
            }

            run_start = after;
        }

        removed
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Returns an iterator over payloads, front to back.
    ///
    /// Double-ended: `.rev()` walks back to front over the same links.
    #[inline]
    pub fn iter<'a>(&self, pool: &'a Pool) -> Iter<'a> {
        Iter {
            pool,
            front: self.head,
            back: self.tail,
        }
    }

    /// Returns an iterator over node ids, front to back.
    ///
    /// Collect these before a loop that mutates the queue mid-iteration.
    #[inline]
    pub fn keys<'a>(&self, pool: &'a Pool) -> Keys<'a> {
        Keys {
            pool,
            front: self.head,
            back: self.tail,
        }
    }

    /// Returns a cursor positioned at the front.
    ///
    /// The cursor pre-captures neighbor links, so the current element can be
    /// removed without invalidating the walk. See [`Cursor`].
    #[inline]
    pub fn cursor_front<'a>(&'a mut self, pool: &'a mut Pool) -> Cursor<'a> {
        let head = self.head;
        Cursor {
            queue: self,
            pool,
            current: head,
        }
    }

    /// Returns a cursor positioned at the back.
    #[inline]
    pub fn cursor_back<'a>(&'a mut self, pool: &'a mut Pool) -> Cursor<'a> {
        let tail = self.tail;
        Cursor {
            queue: self,
            pool,
            current: tail,
        }
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over payload references, front to back.
pub struct Iter<'a> {
    pool: &'a Pool,
    front: NodeId,
    back: NodeId,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Payload;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front.is_none() {
            return None;
        }

        // Safety: queue invariants keep front live
        let node = unsafe { self.pool.node_unchecked(self.front) };

        if self.front == self.back {
            self.front = NodeId::NONE;
            self.back = NodeId::NONE;
        } else {
            self.front = node.next;
        }

        Some(&node.value)
    }
}

impl<'a> DoubleEndedIterator for Iter<'a> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back.is_none() {
            return None;
        }

        // Safety: queue invariants keep back live
        let node = unsafe { self.pool.node_unchecked(self.back) };

        if self.front == self.back {
            self.front = NodeId::NONE;
            self.back = NodeId::NONE;
        } else {
            self.back = node.prev;
        }

        Some(&node.value)
    }
}

/// Iterator over node ids, front to back.
pub struct Keys<'a> {
    pool: &'a Pool,
    front: NodeId,
    back: NodeId,
}

impl Iterator for Keys<'_> {
    type Item = NodeId;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front.is_none() {
            return None;
        }

        let id = self.front;
        // Safety: queue invariants keep front live
        let node = unsafe { self.pool.node_unchecked(id) };

        if self.front == self.back {
            self.front = NodeId::NONE;
            self.back = NodeId::NONE;
        } else {
            self.front = node.next;
        }

        Some(id)
    }
}

impl DoubleEndedIterator for Keys<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back.is_none() {
            return None;
        }

        let id = self.back;
        // Safety: queue invariants keep back live
        let node = unsafe { self.pool.node_unchecked(id) };

        if self.front == self.back {
            self.front = NodeId::NONE;
            self.back = NodeId::NONE;
        } else {
            self.back = node.prev;
        }

        Some(id)
    }
}

// =============================================================================
// Cursor
// =============================================================================

/// A cursor over a queue with removal during iteration.
///
/// The successor id is read before any unlink, so removing the current
/// element never invalidates the walk.
///
/// # Example
///
/// ```
/// use textq::{Pool, Queue};
///
/// let mut pool = Pool::new();
/// let mut queue = Queue::new();
/// for text in ["keep", "drop", "keep"] {
///     queue.try_push_back(&mut pool, text).unwrap();
/// }
///
/// let mut cursor = queue.cursor_front(&mut pool);
/// while let Some(payload) = cursor.current() {
///     if payload.as_str() == "drop" {
///         cursor.remove_current();
///     } else {
///         cursor.move_next();
///     }
/// }
///
/// assert_eq!(queue.len(), 2);
/// ```
pub struct Cursor<'a> {
    queue: &'a mut Queue,
    pool: &'a mut Pool,
    current: NodeId,
}

impl Cursor<'_> {
    /// Returns the current payload, or `None` if the cursor is exhausted.
    #[inline]
    pub fn current(&self) -> Option<&Payload> {
        if self.current.is_none() {
            None
        } else {
            // Safety: current is live when not NONE
            Some(unsafe { &self.pool.node_unchecked(self.current).value })
        }
    }

    /// Returns the current node id, or `None` if exhausted.
    #[inline]
    pub fn key(&self) -> Option<NodeId> {
        if self.current.is_none() {
            None
        } else {
            Some(self.current)
        }
    }

    /// Advances toward the tail.
    #[inline]
    pub fn move_next(&mut self) {
        if self.current.is_some() {
            // Safety: current is live when not NONE
            self.current = unsafe { self.pool.node_unchecked(self.current) }.next;
        }
    }

    /// Advances toward the head.
    #[inline]
    pub fn move_prev(&mut self) {
        if self.current.is_some() {
            // Safety: current is live when not NONE
            self.current = unsafe { self.pool.node_unchecked(self.current) }.prev;
        }
    }

    /// Removes the current element and advances toward the tail.
    ///
    /// Returns the removed payload, or `None` if the cursor is exhausted.
    #[inline]
    pub fn remove_current(&mut self) -> Option<Payload> {
        if self.current.is_none() {
            return None;
        }

        let id = self.current;
        // Safety: current is live (cursor invariant)
        let next = unsafe { self.pool.node_unchecked(id) }.next;

        self.queue.unlink(self.pool, id);
        self.current = next;

        self.pool.remove(id).map(|node| node.value)
    }

    /// Peeks at the next payload without advancing.
    #[inline]
    pub fn peek_next(&self) -> Option<&Payload> {
        if self.current.is_none() {
            return None;
        }

        // Safety: current is live
        let next = unsafe { self.pool.node_unchecked(self.current) }.next;
        if next.is_none() {
            None
        } else {
            // Safety: next is live when not NONE
            Some(unsafe { &self.pool.node_unchecked(next).value })
        }
    }

    /// Returns `true` if the cursor has walked off the queue.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_of(pool: &mut Pool, texts: &[&str]) -> Queue {
        let mut queue = Queue::new();
        for text in texts {
            queue.try_push_back(pool, text).unwrap();
        }
        queue
    }

    fn contents(pool: &Pool, queue: &Queue) -> Vec<String> {
        queue.iter(pool).map(|p| p.as_str().to_owned()).collect()
    }

    /// Walks the queue both ways over raw links and reconciles with len().
    fn assert_linked(pool: &Pool, queue: &Queue) {
        let mut count = 0;
        let mut last = None;
        let mut id = queue.front_key();
        while let Some(curr) = id {
            assert_eq!(queue.prev_key(pool, curr), last);
            count += 1;
            last = Some(curr);
            id = queue.next_key(pool, curr);
        }
        assert_eq!(last, queue.back_key());
        assert_eq!(count, queue.len());

        let mut back_count = 0;
        let mut id = queue.back_key();
        while let Some(curr) = id {
            back_count += 1;
            id = queue.prev_key(pool, curr);
        }
        assert_eq!(back_count, queue.len());
    }

    #[test]
    fn new_is_empty() {
        let queue = Queue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert!(queue.front_key().is_none());
        assert!(queue.back_key().is_none());
    }

    #[test]
    fn push_back_pop_front_is_fifo() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b", "c"]);
        assert_linked(&pool, &queue);

        assert_eq!(queue.pop_front(&mut pool).unwrap(), "a");
        assert_eq!(queue.pop_front(&mut pool).unwrap(), "b");
        assert_eq!(queue.pop_front(&mut pool).unwrap(), "c");
        assert!(queue.pop_front(&mut pool).is_none());
        assert!(pool.is_empty());
    }

    #[test]
    fn push_front_pop_back_is_fifo() {
        let mut pool = Pool::new();
        let mut queue = Queue::new();

        queue.try_push_front(&mut pool, "a").unwrap();
        queue.try_push_front(&mut pool, "b").unwrap();
        queue.try_push_front(&mut pool, "c").unwrap();
        assert_linked(&pool, &queue);

        assert_eq!(queue.pop_back(&mut pool).unwrap(), "a");
        assert_eq!(queue.pop_back(&mut pool).unwrap(), "b");
        assert_eq!(queue.pop_back(&mut pool).unwrap(), "c");
        assert!(queue.pop_back(&mut pool).is_none());
    }

    #[test]
    fn push_front_updates_first_element() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["b"]);

        let before = queue.len();
        queue.try_push_front(&mut pool, "x").unwrap();

        assert_eq!(queue.front(&pool).unwrap(), "x");
        assert_eq!(queue.len(), before + 1);
        assert_linked(&pool, &queue);
    }

    #[test]
    fn push_to_full_pool_leaves_queue_unchanged() {
        let mut pool = Pool::bounded(2);
        let mut queue = queue_of(&mut pool, &["a", "b"]);

        assert_eq!(queue.try_push_back(&mut pool, "c"), Err(Full));
        assert_eq!(contents(&pool, &queue), ["a", "b"]);
        assert_linked(&pool, &queue);
    }

    #[test]
    fn insert_after_and_before() {
        let mut pool = Pool::new();
        let mut queue = Queue::new();

        let a = queue.try_push_back(&mut pool, "a").unwrap();
        queue.try_push_back(&mut pool, "d").unwrap();

        let b = queue.try_insert_after(&mut pool, a, "b").unwrap();
        queue.try_insert_before(&mut pool, b, "a2").unwrap();

        assert_eq!(contents(&pool, &queue), ["a", "a2", "b", "d"]);
        assert_linked(&pool, &queue);
    }

    #[test]
    fn remove_by_id_from_middle() {
        let mut pool = Pool::new();
        let mut queue = Queue::new();

        queue.try_push_back(&mut pool, "a").unwrap();
        let b = queue.try_push_back(&mut pool, "b").unwrap();
        queue.try_push_back(&mut pool, "c").unwrap();

        assert_eq!(queue.remove(&mut pool, b).unwrap(), "b");
        assert!(queue.remove(&mut pool, b).is_none());
        assert_eq!(contents(&pool, &queue), ["a", "c"]);
        assert_linked(&pool, &queue);
    }

    #[test]
    fn remove_into_copies_out() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["payload"]);

        let mut buf = [0xffu8; 4];
        let id = queue.front_key().unwrap();
        let payload = queue.remove_into(&mut pool, id, &mut buf).unwrap();

        assert_eq!(payload, "payload");
        assert_eq!(&buf, b"pay\0");
        assert!(queue.is_empty());
    }

    #[test]
    fn pop_into_copies_out() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["ab", "cd"]);

        let mut buf = [0u8; 8];
        assert_eq!(queue.pop_front_into(&mut pool, &mut buf).unwrap(), "ab");
        assert_eq!(&buf[..3], b"ab\0");

        assert_eq!(queue.pop_back_into(&mut pool, &mut buf).unwrap(), "cd");
        assert_eq!(&buf[..3], b"cd\0");
    }

    #[test]
    fn clear_frees_every_node() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b", "c"]);

        queue.clear(&mut pool);

        assert!(queue.is_empty());
        assert!(pool.is_empty());
    }

    #[test]
    fn unlink_and_relink_moves_between_queues() {
        let mut pool = Pool::new();
        let mut a = queue_of(&mut pool, &["x"]);
        let mut b = Queue::new();

        let id = a.front_key().unwrap();
        assert!(a.unlink(&mut pool, id));
        assert!(!a.unlink(&mut pool, id));
        b.link_back(&mut pool, id);

        assert!(a.is_empty());
        assert_eq!(contents(&pool, &b), ["x"]);
        assert_linked(&pool, &a);
        assert_linked(&pool, &b);
    }

    #[test]
    fn unlink_singleton() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["only"]);

        let id = queue.front_key().unwrap();
        assert!(queue.unlink(&mut pool, id));
        assert!(queue.is_empty());
        assert!(queue.front_key().is_none());
        assert!(queue.back_key().is_none());
    }

    #[test]
    fn move_to_front_and_back() {
        let mut pool = Pool::new();
        let mut queue = Queue::new();

        let a = queue.try_push_back(&mut pool, "a").unwrap();
        queue.try_push_back(&mut pool, "b").unwrap();
        let c = queue.try_push_back(&mut pool, "c").unwrap();

        queue.move_to_front(&mut pool, c);
        assert_eq!(contents(&pool, &queue), ["c", "a", "b"]);

        queue.move_to_back(&mut pool, a);
        assert_eq!(contents(&pool, &queue), ["c", "b", "a"]);

        // Already in position: no-ops.
        queue.move_to_front(&mut pool, c);
        queue.move_to_back(&mut pool, a);
        assert_eq!(contents(&pool, &queue), ["c", "b", "a"]);
        assert_linked(&pool, &queue);
    }

    #[test]
    fn append_splices_tail_first() {
        let mut pool = Pool::new();
        let mut a = queue_of(&mut pool, &["1", "2"]);
        let mut b = queue_of(&mut pool, &["3", "4"]);

        a.append(&mut pool, &mut b);

        assert_eq!(contents(&pool, &a), ["1", "2", "3", "4"]);
        assert!(b.is_empty());
        assert_linked(&pool, &a);

        // Appending an empty queue is a no-op.
        a.append(&mut pool, &mut b);
        assert_eq!(a.len(), 4);

        // Appending onto an empty queue takes everything.
        let mut c = Queue::new();
        c.append(&mut pool, &mut a);
        assert_eq!(contents(&pool, &c), ["1", "2", "3", "4"]);
        assert!(a.is_empty());
    }

    #[test]
    fn prepend_splices_head_first() {
        let mut pool = Pool::new();
        let mut a = queue_of(&mut pool, &["3", "4"]);
        let mut b = queue_of(&mut pool, &["1", "2"]);

        a.prepend(&mut pool, &mut b);

        assert_eq!(contents(&pool, &a), ["1", "2", "3", "4"]);
        assert!(b.is_empty());
        assert_linked(&pool, &a);
    }

    #[test]
    fn split_off_middle() {
        let mut pool = Pool::new();
        let mut queue = Queue::new();

        queue.try_push_back(&mut pool, "a").unwrap();
        queue.try_push_back(&mut pool, "b").unwrap();
        let c = queue.try_push_back(&mut pool, "c").unwrap();
        queue.try_push_back(&mut pool, "d").unwrap();

        let back = queue.split_off(&mut pool, c);

        assert_eq!(contents(&pool, &queue), ["a", "b"]);
        assert_eq!(contents(&pool, &back), ["c", "d"]);
        assert_eq!(queue.len(), 2);
        assert_eq!(back.len(), 2);
        assert_linked(&pool, &queue);
        assert_linked(&pool, &back);
    }

    #[test]
    fn split_off_head_takes_everything() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b"]);

        let head = queue.front_key().unwrap();
        let back = queue.split_off(&mut pool, head);

        assert!(queue.is_empty());
        assert_eq!(contents(&pool, &back), ["a", "b"]);
    }

    #[test]
    fn reverse_reverses() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b", "c", "d"]);

        queue.reverse(&mut pool);

        assert_eq!(contents(&pool, &queue), ["d", "c", "b", "a"]);
        assert_linked(&pool, &queue);
    }

    #[test]
    fn reverse_twice_is_identity() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b", "c", "d", "e"]);

        queue.reverse(&mut pool);
        queue.reverse(&mut pool);

        assert_eq!(contents(&pool, &queue), ["a", "b", "c", "d", "e"]);
        assert_linked(&pool, &queue);
    }

    #[test]
    fn reverse_empty_and_singleton() {
        let mut pool = Pool::new();
        let mut queue = Queue::new();
        queue.reverse(&mut pool);
        assert!(queue.is_empty());

        let mut queue = queue_of(&mut pool, &["x"]);
        queue.reverse(&mut pool);
        assert_eq!(contents(&pool, &queue), ["x"]);
    }

    #[test]
    fn reverse_k_leaves_short_tail() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b", "c", "d", "e"]);

        queue.reverse_k(&mut pool, 2);

        assert_eq!(contents(&pool, &queue), ["b", "a", "d", "c", "e"]);
        assert_eq!(queue.len(), 5);
        assert_linked(&pool, &queue);
    }

    #[test]
    fn reverse_k_of_three() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b", "c", "d", "e"]);

        queue.reverse_k(&mut pool, 3);

        assert_eq!(contents(&pool, &queue), ["c", "b", "a", "d", "e"]);
        assert_linked(&pool, &queue);
    }

    #[test]
    fn reverse_k_whole_queue() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b", "c"]);

        queue.reverse_k(&mut pool, 3);

        assert_eq!(contents(&pool, &queue), ["c", "b", "a"]);
        assert_linked(&pool, &queue);
    }

    #[test]
    fn reverse_k_noop_cases() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b", "c"]);

        queue.reverse_k(&mut pool, 0);
        queue.reverse_k(&mut pool, 1);
        queue.reverse_k(&mut pool, 4);

        assert_eq!(contents(&pool, &queue), ["a", "b", "c"]);
    }

    #[test]
    fn swap_pairs_even() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b", "c", "d"]);

        queue.swap_pairs(&mut pool);

        assert_eq!(contents(&pool, &queue), ["b", "a", "d", "c"]);
        assert_linked(&pool, &queue);
    }

    #[test]
    fn swap_pairs_odd_leaves_last() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b", "c", "d", "e"]);

        queue.swap_pairs(&mut pool);

        assert_eq!(contents(&pool, &queue), ["b", "a", "d", "c", "e"]);
        assert_linked(&pool, &queue);
    }

    #[test]
    fn swap_pairs_noop_on_small_queues() {
        let mut pool = Pool::new();
        let mut queue = Queue::new();
        queue.swap_pairs(&mut pool);
        assert!(queue.is_empty());

        let mut queue = queue_of(&mut pool, &["x"]);
        queue.swap_pairs(&mut pool);
        assert_eq!(contents(&pool, &queue), ["x"]);
    }

    #[test]
    fn middle_selects_later_central() {
        let mut pool = Pool::new();

        // Odd length: the exact middle.
        let queue = queue_of(&mut pool, &["a", "b", "c"]);
        let mid = queue.middle(&pool).unwrap();
        assert_eq!(pool.get(mid).unwrap(), "b");

        // Even length: the later of the two central elements.
        let queue = queue_of(&mut pool, &["a", "b", "c", "d"]);
        let mid = queue.middle(&pool).unwrap();
        assert_eq!(pool.get(mid).unwrap(), "c");

        let queue = queue_of(&mut pool, &["a", "b"]);
        let mid = queue.middle(&pool).unwrap();
        assert_eq!(pool.get(mid).unwrap(), "b");
    }

    #[test]
    fn delete_middle_odd() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b", "c", "d", "e"]);

        assert!(queue.delete_middle(&mut pool));

        assert_eq!(contents(&pool, &queue), ["a", "b", "d", "e"]);
        assert_eq!(pool.len(), queue.len());
        assert_linked(&pool, &queue);
    }

    #[test]
    fn delete_middle_even() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b", "c", "d"]);

        assert!(queue.delete_middle(&mut pool));

        assert_eq!(contents(&pool, &queue), ["a", "b", "d"]);
    }

    #[test]
    fn delete_middle_empty_and_singleton() {
        let mut pool = Pool::new();
        let mut queue = Queue::new();
        assert!(!queue.delete_middle(&mut pool));

        let mut queue = queue_of(&mut pool, &["x"]);
        assert!(queue.delete_middle(&mut pool));
        assert!(queue.is_empty());
        assert!(pool.is_empty());
    }

    #[test]
    fn dedup_removes_whole_runs() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "a", "b", "c", "c", "c", "d"]);

        assert_eq!(queue.dedup(&mut pool), 5);

        assert_eq!(contents(&pool, &queue), ["b", "d"]);
        assert_eq!(pool.len(), 2);
        assert_linked(&pool, &queue);
    }

    #[test]
    fn dedup_no_duplicates() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b", "c"]);

        assert_eq!(queue.dedup(&mut pool), 0);
        assert_eq!(contents(&pool, &queue), ["a", "b", "c"]);
    }

    #[test]
    fn dedup_all_duplicates_empties_queue() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["x", "x", "x"]);

        assert_eq!(queue.dedup(&mut pool), 3);
        assert!(queue.is_empty());
        assert!(pool.is_empty());
    }

    #[test]
    fn dedup_trailing_run() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b", "b"]);

        assert_eq!(queue.dedup(&mut pool), 2);
        assert_eq!(contents(&pool, &queue), ["a"]);
    }

    #[test]
    fn dedup_empty_and_singleton() {
        let mut pool = Pool::new();
        let mut queue = Queue::new();
        assert_eq!(queue.dedup(&mut pool), 0);

        let mut queue = queue_of(&mut pool, &["x"]);
        assert_eq!(queue.dedup(&mut pool), 0);
        assert_eq!(contents(&pool, &queue), ["x"]);
    }

    #[test]
    fn iter_both_directions() {
        let mut pool = Pool::new();
        let queue = queue_of(&mut pool, &["a", "b", "c"]);

        let forward: Vec<_> = queue.iter(&pool).map(|p| p.as_str()).collect();
        assert_eq!(forward, ["a", "b", "c"]);

        let backward: Vec<_> = queue.iter(&pool).rev().map(|p| p.as_str()).collect();
        assert_eq!(backward, ["c", "b", "a"]);
    }

    #[test]
    fn iter_meets_in_the_middle() {
        let mut pool = Pool::new();
        let queue = queue_of(&mut pool, &["a", "b", "c"]);

        let mut iter = queue.iter(&pool);
        assert_eq!(iter.next().unwrap(), "a");
        assert_eq!(iter.next_back().unwrap(), "c");
        assert_eq!(iter.next().unwrap(), "b");
        assert!(iter.next().is_none());
        assert!(iter.next_back().is_none());
    }

    #[test]
    fn keys_match_iteration_order() {
        let mut pool = Pool::new();
        let queue = queue_of(&mut pool, &["a", "b", "c"]);

        let keys: Vec<_> = queue.keys(&pool).collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0], queue.front_key().unwrap());
        assert_eq!(keys[2], queue.back_key().unwrap());
        assert_eq!(pool.get(keys[1]).unwrap(), "b");
    }

    #[test]
    fn cursor_removes_while_walking() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["keep", "drop", "drop", "keep", "drop"]);

        let mut cursor = queue.cursor_front(&mut pool);
        while let Some(payload) = cursor.current() {
            if payload.as_str() == "drop" {
                assert_eq!(cursor.remove_current().unwrap(), "drop");
            } else {
                cursor.move_next();
            }
        }
        assert!(cursor.is_exhausted());

        assert_eq!(contents(&pool, &queue), ["keep", "keep"]);
        assert_eq!(pool.len(), 2);
        assert_linked(&pool, &queue);
    }

    #[test]
    fn cursor_back_walks_to_front() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b", "c"]);

        let mut seen = Vec::new();
        let mut cursor = queue.cursor_back(&mut pool);
        while let Some(payload) = cursor.current() {
            seen.push(payload.as_str().to_owned());
            cursor.move_prev();
        }

        assert_eq!(seen, ["c", "b", "a"]);
    }

    #[test]
    fn cursor_peek_next() {
        let mut pool = Pool::new();
        let mut queue = queue_of(&mut pool, &["a", "b"]);

        let mut cursor = queue.cursor_front(&mut pool);
        assert_eq!(cursor.peek_next().unwrap(), "b");
        cursor.move_next();
        assert!(cursor.peek_next().is_none());
    }

    #[test]
    fn pool_accounting_across_operations() {
        let mut pool = Pool::new();
        let mut a = queue_of(&mut pool, &["1", "2", "3"]);
        let mut b = queue_of(&mut pool, &["4", "5"]);
        assert_eq!(pool.len(), 5);

        a.append(&mut pool, &mut b);
        assert_eq!(pool.len(), 5);
        assert_eq!(a.len() + b.len(), 5);

        a.delete_middle(&mut pool);
        assert_eq!(pool.len(), 4);

        a.clear(&mut pool);
        assert!(pool.is_empty());
    }
}
