//! K-way queue merge.

use crate::order::Direction;
use crate::pool::Pool;
use crate::queue::Queue;

/// Merges every queue in `queues` into `queues[0]`, sorted by payload.
///
/// All queues must share `pool`. Elements are relinked, never copied: the
/// queues are spliced pairwise from both ends of the slice into a scratch
/// queue (draining them roughly evenly), the scratch is sorted once, and the
/// result spliced into `queues[0]`. Every other queue ends empty.
///
/// Returns the total number of elements merged. An empty slice merges
/// nothing; a single queue is simply sorted in place.
///
/// # Example
///
/// ```
/// use textq::{merge_queues, Direction, Pool, Queue};
///
/// let mut pool = Pool::new();
/// let mut queues: Vec<Queue> = (0..2).map(|_| Queue::new()).collect();
///
/// for text in ["1", "4", "7"] {
///     queues[0].try_push_back(&mut pool, text).unwrap();
/// }
/// for text in ["2", "3", "9"] {
///     queues[1].try_push_back(&mut pool, text).unwrap();
/// }
///
/// let total = merge_queues(&mut pool, &mut queues, Direction::Ascending);
///
/// assert_eq!(total, 6);
/// let merged: Vec<_> = queues[0].iter(&pool).map(|p| p.as_str()).collect();
/// assert_eq!(merged, ["1", "2", "3", "4", "7", "9"]);
/// assert!(queues[1].is_empty());
/// ```
pub fn merge_queues(pool: &mut Pool, queues: &mut [Queue], direction: Direction) -> usize {
    if queues.is_empty() {
        return 0;
    }

    let mut scratch = Queue::new();
    let mut i = 0;
    let mut j = queues.len() - 1;
    while i < j {
        scratch.append(pool, &mut queues[i]);
        scratch.append(pool, &mut queues[j]);
        i += 1;
        j -= 1;
    }
    if i == j {
        scratch.append(pool, &mut queues[i]);
    }

    scratch.sort(pool, direction);
    let total = scratch.len();
    queues[0].append(pool, &mut scratch);

    total
}
