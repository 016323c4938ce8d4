use std::collections::VecDeque;

use super::demon::DemonId;
use super::demon::DemonPriority;
use super::demon::DemonStore;

/// The two-tier propagation queue.
///
/// Normal demons run in enqueue order. Delayed demons are only considered
/// once the normal queue has quiesced, and are promoted one at a time:
/// whatever a delayed demon enqueues drains fully before the next delayed
/// demon gets its turn. A demon is never queued twice.
#[derive(Debug, Default)]
pub(crate) struct DemonQueue {
    normal: VecDeque<DemonId>,
    delayed: VecDeque<DemonId>,
}

impl DemonQueue {
    pub(crate) fn enqueue(&mut self, demons: &mut DemonStore, demon: DemonId) {
        if demons.is_queued(demon) {
            return;
        }
        demons.set_queued(demon, true);
        match demons.entry(demon).priority {
            DemonPriority::Normal => self.normal.push_back(demon),
            DemonPriority::Delayed => self.delayed.push_back(demon),
        }
    }

    /// The next demon to run: the oldest normal demon, or, when none is
    /// pending, the oldest delayed one.
    pub(crate) fn pop(&mut self, demons: &mut DemonStore) -> Option<DemonId> {
        let demon = self.normal.pop_front().or_else(|| self.delayed.pop_front())?;
        demons.set_queued(demon, false);
        Some(demon)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.delayed.is_empty()
    }

    pub(crate) fn clear(&mut self, demons: &mut DemonStore) {
        self.normal.clear();
        self.delayed.clear();
        demons.clear_queued_flags();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;
    use crate::engine::constraint::ConstraintId;

    fn setup() -> (DemonStore, DemonQueue) {
        (DemonStore::default(), DemonQueue::default())
    }

    #[test]
    fn normal_demons_run_before_delayed_ones() {
        let (mut demons, mut queue) = setup();
        let constraint = ConstraintId::create_from_index(0);
        let delayed = demons.intern(constraint, 0, DemonPriority::Delayed);
        let normal = demons.intern(constraint, 1, DemonPriority::Normal);

        queue.enqueue(&mut demons, delayed);
        queue.enqueue(&mut demons, normal);

        assert_eq!(queue.pop(&mut demons), Some(normal));
        assert_eq!(queue.pop(&mut demons), Some(delayed));
        assert_eq!(queue.pop(&mut demons), None);
    }

    #[test]
    fn a_demon_is_never_queued_twice() {
        let (mut demons, mut queue) = setup();
        let constraint = ConstraintId::create_from_index(0);
        let demon = demons.intern(constraint, 0, DemonPriority::Normal);

        queue.enqueue(&mut demons, demon);
        queue.enqueue(&mut demons, demon);

        assert_eq!(queue.pop(&mut demons), Some(demon));
        assert_eq!(queue.pop(&mut demons), None);
    }

    #[test]
    fn a_popped_demon_may_requeue_itself() {
        let (mut demons, mut queue) = setup();
        let constraint = ConstraintId::create_from_index(0);
        let demon = demons.intern(constraint, 0, DemonPriority::Normal);

        queue.enqueue(&mut demons, demon);
        let popped = queue.pop(&mut demons).unwrap();
        queue.enqueue(&mut demons, popped);

        assert_eq!(queue.pop(&mut demons), Some(demon));
    }

    #[test]
    fn normal_work_enqueued_by_a_delayed_demon_preempts_other_delayed_work() {
        let (mut demons, mut queue) = setup();
        let constraint = ConstraintId::create_from_index(0);
        let delayed_a = demons.intern(constraint, 0, DemonPriority::Delayed);
        let delayed_b = demons.intern(constraint, 1, DemonPriority::Delayed);
        let normal = demons.intern(constraint, 2, DemonPriority::Normal);

        queue.enqueue(&mut demons, delayed_a);
        queue.enqueue(&mut demons, delayed_b);

        assert_eq!(queue.pop(&mut demons), Some(delayed_a));
        // Suppose running `delayed_a` raised an event that wakes `normal`.
        queue.enqueue(&mut demons, normal);

        assert_eq!(queue.pop(&mut demons), Some(normal));
        assert_eq!(queue.pop(&mut demons), Some(delayed_b));
    }
}
