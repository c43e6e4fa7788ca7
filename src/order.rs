//! Comparison-based queue operations.
//!
//! One comparator drives everything here and the k-way merge: byte-wise
//! lexicographic payload order, flipped by [`Direction::Descending`].

use core::cmp::Ordering;

use crate::pool::Pool;
use crate::queue::Queue;
use crate::text::Payload;

/// Ordering direction for [`sort`](Queue::sort), the monotonic filters, and
/// [`merge_queues`](crate::merge_queues).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Lexicographically non-decreasing, byte-wise.
    Ascending,
    /// Lexicographically non-increasing, byte-wise.
    Descending,
}

impl Direction {
    /// Compares two payloads under this direction.
    ///
    /// `Descending` negates the byte-wise comparison, so `Less` always means
    /// "`a` sorts before `b`".
    #[inline]
    pub fn compare(self, a: &Payload, b: &Payload) -> Ordering {
        match self {
            Direction::Ascending => a.cmp(b),
            Direction::Descending => b.cmp(a),
        }
    }
}

impl Queue {
    /// Sorts the queue by payload. O(n log n), in place.
    ///
    /// Recursive merge sort: cut at the middle, sort both halves, merge.
    /// Equal payloads may appear in any relative order afterwards.
    pub fn sort(&mut self, pool: &mut Pool, direction: Direction) {
        if self.len() < 2 {
            return;
        }

        let Some(mid) = self.middle(pool) else {
            return;
        };
        // The cut lands before the (later-central) middle, so both halves
        // are non-empty whenever len >= 2.
        let mut back = self.split_off(pool, mid);

        self.sort(pool, direction);
        back.sort(pool, direction);
        self.merge_with(pool, &mut back, direction);
    }

    /// Merges the sorted `other` into sorted `self`, leaving `other` empty.
    ///
    /// Linear two-way merge: the winning front element is unlinked and
    /// relinked onto the accumulator, and the remainder spliced on when one
    /// side runs out.
    pub(crate) fn merge_with(&mut self, pool: &mut Pool, other: &mut Queue, direction: Direction) {
        let mut merged = Queue::new();

        while let (Some(a), Some(b)) = (self.front_key(), other.front_key()) {
            // Safety: both heads are live
            let take_self = unsafe {
                direction.compare(&pool.node_unchecked(a).value, &pool.node_unchecked(b).value)
            } != Ordering::Greater;

            let (source, id) = if take_self {
                (&mut *self, a)
            } else {
                (&mut *other, b)
            };
            source.unlink(pool, id);
            merged.link_back(pool, id);
        }

        // At most one of the two still has a remainder.
        merged.append(pool, self);
        merged.append(pool, other);
        *self = merged;
    }

    /// Retains a maximal tail-anchored monotonic subsequence, freeing the
    /// rest. Returns the number of elements kept.
    ///
    /// Scans tail to head, tracking the most recently kept element
    /// (initially the tail). An element comparing `Greater` against it under
    /// `direction` is removed; anything else is kept and becomes the new
    /// reference. With `Ascending`, every element with a strictly lesser
    /// payload somewhere to its right is removed; with `Descending`, every
    /// element with a strictly greater payload to its right.
    pub fn retain_monotonic(&mut self, pool: &mut Pool, direction: Direction) -> usize {
        let Some(tail) = self.back_key() else {
            return 0;
        };

        let mut kept = tail;
        let mut count = 1;
        // Safety: tail is live
        let mut id = unsafe { pool.node_unchecked(tail) }.prev;

        while id.is_some() {
            // Capture the predecessor before any relinking.
            // Safety: id is live until removed below
            let prev = unsafe { pool.node_unchecked(id) }.prev;
            let worse = unsafe {
                direction.compare(&pool.node_unchecked(id).value, &pool.node_unchecked(kept).value)
            } == Ordering::Greater;

            if worse {
                self.unlink(pool, id);
                pool.remove(id);
            } else {
                kept = id;
                count += 1;
            }

            id = prev;
        }

        count
    }

    /// [`retain_monotonic`](Queue::retain_monotonic) in ascending mode:
    /// removes every element with a strictly lesser payload to its right.
    #[inline]
    pub fn retain_ascending(&mut self, pool: &mut Pool) -> usize {
        self.retain_monotonic(pool, Direction::Ascending)
    }

    /// [`retain_monotonic`](Queue::retain_monotonic) in descending mode:
    /// removes every element with a strictly greater payload to its right.
    #[inline]
    pub fn retain_descending(&mut self, pool: &mut Pool) -> usize {
        self.retain_monotonic(pool, Direction::Descending)
    }
}
