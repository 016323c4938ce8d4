use super::constraint::ConstraintId;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;

/// Key of a demon interned in the [`DemonStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DemonId {
    id: u32,
}

impl StorageKey for DemonId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        DemonId { id: index as u32 }
    }
}

impl std::fmt::Display for DemonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.id)
    }
}

/// When a demon runs relative to the others in the queue. Immutable per
/// demon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemonPriority {
    /// Cheap incremental work; runs before anything delayed.
    #[default]
    Normal,
    /// Expensive re-scans; promoted one at a time once the normal queue has
    /// quiesced.
    Delayed,
}

/// A demon is a proxy: running it calls back into its constraint with the
/// payload it was interned with. Demons own no state of their own.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DemonEntry {
    pub(crate) constraint: ConstraintId,
    pub(crate) payload: u64,
    pub(crate) priority: DemonPriority,
    /// Whether the demon currently sits in the propagation queue.
    pub(crate) queued: bool,
}

#[derive(Debug, Default)]
pub(crate) struct DemonStore {
    demons: KeyedVec<DemonId, DemonEntry>,
}

impl DemonStore {
    pub(crate) fn intern(
        &mut self,
        constraint: ConstraintId,
        payload: u64,
        priority: DemonPriority,
    ) -> DemonId {
        self.demons.push(DemonEntry {
            constraint,
            payload,
            priority,
            queued: false,
        })
    }

    pub(crate) fn entry(&self, demon: DemonId) -> DemonEntry {
        self.demons[demon]
    }

    pub(crate) fn set_queued(&mut self, demon: DemonId, queued: bool) {
        self.demons[demon].queued = queued;
    }

    pub(crate) fn is_queued(&self, demon: DemonId) -> bool {
        self.demons[demon].queued
    }

    pub(crate) fn clear_queued_flags(&mut self) {
        self.demons
            .iter_mut()
            .for_each(|entry| entry.queued = false);
    }
}
