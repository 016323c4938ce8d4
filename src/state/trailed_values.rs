use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::peregrine_assert_moderate;

/// Key of a reversible `i64` cell in [`TrailedValues`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailedInt {
    id: u32,
}

impl Default for TrailedInt {
    fn default() -> Self {
        Self { id: u32::MAX }
    }
}

impl StorageKey for TrailedInt {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        Self { id: index as u32 }
    }
}

#[derive(Debug, Clone, Copy)]
struct TrailedChange {
    old_value: i64,
    reference: TrailedInt,
}

/// The table of reversible scalar cells.
///
/// Cells may be allocated before or during search; cells allocated at a
/// level are released again when that level is undone, so in-search
/// allocation behaves like a region allocator aligned with the trail.
#[derive(Debug)]
pub struct TrailedValues {
    trail: Trail<TrailedChange>,
    values: KeyedVec<TrailedInt, i64>,
    /// Number of live cells at the start of each level, so that cells
    /// allocated inside an abandoned level can be released.
    len_delimiter: Vec<usize>,
    /// Monotone counter bumped on every level change, never reused. Lets
    /// callers detect that a previously saved cell needs saving again (see
    /// [`RevBitSet`](crate::containers::RevBitSet)). Starts above zero so
    /// that a zeroed stamp cache is never considered current.
    stamp: u64,
}

impl Default for TrailedValues {
    fn default() -> Self {
        TrailedValues {
            trail: Trail::default(),
            values: KeyedVec::default(),
            len_delimiter: Vec::default(),
            stamp: 1,
        }
    }
}

impl TrailedValues {
    /// Allocate a fresh cell holding `initial_value`.
    pub fn grow(&mut self, initial_value: i64) -> TrailedInt {
        self.values.push(initial_value)
    }

    pub fn read(&self, cell: TrailedInt) -> i64 {
        self.values[cell]
    }

    pub fn level(&self) -> usize {
        self.trail.level()
    }

    /// A value that is distinct for every level ever entered, including
    /// re-entries of the same depth after backtracking.
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    pub fn push_level(&mut self) {
        self.trail.push_level();
        self.len_delimiter.push(self.values.len());
        self.stamp += 1;
    }

    pub fn undo_to(&mut self, level: usize) {
        let values = &mut self.values;
        self.trail
            .undo_to(level)
            .for_each(|change| values[change.reference] = change.old_value);

        let live = self.len_delimiter[level];
        self.len_delimiter.truncate(level);
        self.values.truncate(live);
        self.stamp += 1;
    }

    /// Save the old value and overwrite. A no-op when the value is
    /// unchanged.
    pub fn assign(&mut self, cell: TrailedInt, value: i64) {
        let old_value = self.values[cell];
        if old_value == value {
            return;
        }
        self.trail.push(TrailedChange {
            old_value,
            reference: cell,
        });
        self.values[cell] = value;
    }

    pub fn add_assign(&mut self, cell: TrailedInt, addition: i64) {
        self.assign(cell, self.values[cell] + addition);
    }

    /// Overwrite without saving. The caller must guarantee that a save for
    /// this cell already exists at the current level; the first save of the
    /// level then restores over all later unsaved writes on undo.
    pub fn write_unsaved(&mut self, cell: TrailedInt, value: i64) {
        peregrine_assert_moderate!(
            self.trail
                .iter()
                .any(|change| change.reference == cell),
            "unsaved write requires an earlier save of the same cell"
        );
        self.values[cell] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_are_undone_level_by_level() {
        let mut trailed = TrailedValues::default();
        let cell = trailed.grow(0);

        assert_eq!(trailed.read(cell), 0);

        trailed.push_level();
        trailed.add_assign(cell, 5);
        trailed.add_assign(cell, 5);
        assert_eq!(trailed.read(cell), 10);

        trailed.push_level();
        trailed.add_assign(cell, 1);
        assert_eq!(trailed.read(cell), 11);

        trailed.undo_to(1);
        assert_eq!(trailed.read(cell), 10);

        trailed.undo_to(0);
        assert_eq!(trailed.read(cell), 0);
    }

    #[test]
    fn cells_allocated_in_an_abandoned_level_are_released() {
        let mut trailed = TrailedValues::default();
        let before = trailed.grow(1);

        trailed.push_level();
        let inside = trailed.grow(2);
        trailed.assign(inside, 3);
        trailed.undo_to(0);

        assert_eq!(trailed.read(before), 1);

        // The slot is reused by the next allocation.
        let reused = trailed.grow(7);
        assert_eq!(inside.index(), reused.index());
        assert_eq!(trailed.read(reused), 7);
    }

    #[test]
    fn stamps_differ_across_level_changes() {
        let mut trailed = TrailedValues::default();

        trailed.push_level();
        let first_visit = trailed.stamp();
        trailed.undo_to(0);
        trailed.push_level();

        assert_ne!(first_visit, trailed.stamp());
    }
}
