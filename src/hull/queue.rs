use std::{cmp::Ordering, collections::BinaryHeap};

use crate::hull::face::FaceId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct QueueEntry {
    beyond_len: usize,
    sequence: u64,
    face: FaceId,
    generation: u32,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Larger beyond sets first, then first come first served.
        self.beyond_len
            .cmp(&other.beyond_len)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The unprocessed faces, served by descending beyond set size.
///
/// Entries are never removed eagerly. A face that was released or finalized
/// after being pushed is skipped when it reaches the top, which is detected
/// through the face generation.
#[derive(Clone, Debug, Default)]
pub(crate) struct FaceQueue {
    heap: BinaryHeap<QueueEntry>,
    next_sequence: u64,
}

impl FaceQueue {
    pub fn push(&mut self, face: FaceId, generation: u32, beyond_len: usize) {
        self.heap.push(QueueEntry {
            beyond_len,
            sequence: self.next_sequence,
            face,
            generation,
        });
        self.next_sequence += 1;
    }

    /// Pops the highest priority face for which `is_live(face, generation)` holds.
    pub fn pop(&mut self, mut is_live: impl FnMut(FaceId, u32) -> bool) -> Option<FaceId> {
        while let Some(entry) = self.heap.pop() {
            if is_live(entry.face, entry.generation) {
                return Some(entry.face);
            }
        }
        None
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_sequence = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn largest_beyond_set_first() {
        let mut queue = FaceQueue::default();
        queue.push(FaceId(0), 0, 3);
        queue.push(FaceId(1), 0, 8);
        queue.push(FaceId(2), 0, 3);
        queue.push(FaceId(3), 0, 1);

        let order: Vec<_> = std::iter::from_fn(|| queue.pop(|_, _| true)).collect();
        assert_eq!(order, vec![FaceId(1), FaceId(0), FaceId(2), FaceId(3)]);
    }

    #[test]
    fn stale_entries_are_skipped() {
        let mut queue = FaceQueue::default();
        queue.push(FaceId(0), 0, 5);
        queue.push(FaceId(1), 0, 2);
        queue.push(FaceId(0), 1, 1);

        // Face 0 was released once, so only generation 1 is live.
        let live = |face: FaceId, generation: u32| face != FaceId(0) || generation == 1;
        assert_eq!(queue.pop(live), Some(FaceId(1)));
        assert_eq!(queue.pop(live), Some(FaceId(0)));
        assert_eq!(queue.pop(live), None);
    }
}
