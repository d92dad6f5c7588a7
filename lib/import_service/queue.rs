use std::collections::VecDeque;

use super::types::IdBatch;

/// Ordered backlog of batches awaiting re-dispatch after a failure.
///
/// New splits are inserted at the head, ahead of everything already queued,
/// so the scheduler finishes isolating the most recently discovered failure
/// before resuming older backlog.
#[derive(Debug, Default)]
pub struct RetryQueue {
    batches: VecDeque<IdBatch>,
}

impl RetryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the head of the backlog.
    pub fn pop(&mut self) -> Option<IdBatch> {
        self.batches.pop_front()
    }

    /// Inserts split children at the head, preserving their order: the first
    /// child ends up at the front, ahead of existing contents.
    pub fn requeue_at_head(&mut self, children: Vec<IdBatch>) {
        for child in children.into_iter().rev() {
            self.batches.push_front(child);
        }
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Total number of ids across all queued batches.
    pub fn queued_ids(&self) -> usize {
        self.batches.iter().map(IdBatch::len).sum()
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &IdBatch> {
        self.batches.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::IdBatch;
    use super::RetryQueue;

    #[test]
    fn split_children_jump_ahead_of_older_backlog() {
        let mut queue = RetryQueue::new();
        queue.requeue_at_head(vec![IdBatch::contiguous(801, 400)]);

        let failed = IdBatch::contiguous(1, 400);
        queue.requeue_at_head(failed.split_for_retry());

        assert_eq!(queue.pop().expect("left child").to_string(), "[1-200](200)");
        assert_eq!(
            queue.pop().expect("right child").to_string(),
            "[201-400](200)"
        );
        assert_eq!(
            queue.pop().expect("older backlog").to_string(),
            "[801-1200](400)"
        );
        assert!(queue.pop().is_none());
    }

    #[test]
    fn singleton_children_keep_ascending_order() {
        let mut queue = RetryQueue::new();
        queue.requeue_at_head(IdBatch::contiguous(5, 4).split_for_retry());

        let popped: Vec<i64> = std::iter::from_fn(|| queue.pop())
            .map(|batch| batch.first())
            .collect();
        assert_eq!(popped, vec![5, 6, 7, 8]);
    }

    #[test]
    fn queued_ids_counts_across_batches() {
        let mut queue = RetryQueue::new();
        queue.requeue_at_head(vec![IdBatch::contiguous(1, 10), IdBatch::contiguous(50, 5)]);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.queued_ids(), 15);
    }
}
