use super::demon::DemonId;
use crate::basic_types::EmptyDomain;
use crate::containers::KeyedVec;
use crate::peregrine_assert_simple;
use crate::state::TrailedInt;
use crate::state::TrailedValues;
use crate::variables::IntervalVar;

/// The three performedness states of an interval.
const MAY_PERFORM: i64 = 0;
const MUST_PERFORM: i64 = 1;
const CANNOT_PERFORM: i64 = 2;

/// The store of interval (scheduling) variables.
///
/// An interval carries reversible start, duration and end ranges plus a
/// performedness state. The relation `start + duration = end` is kept
/// consistent on every mutation. Narrowing a non-optional interval to an
/// empty range fails; an optional interval becomes unperformed instead.
#[derive(Debug, Default)]
pub(crate) struct IntervalStore {
    intervals: KeyedVec<IntervalVar, IntervalData>,
    pending: Vec<IntervalVar>,
    is_pending: KeyedVec<IntervalVar, bool>,
}

#[derive(Debug)]
struct IntervalData {
    start_min: TrailedInt,
    start_max: TrailedInt,
    duration_min: TrailedInt,
    duration_max: TrailedInt,
    end_min: TrailedInt,
    end_max: TrailedInt,
    performed: TrailedInt,
    demons: Vec<DemonId>,
}

impl IntervalStore {
    pub(crate) fn grow(
        &mut self,
        trailed: &mut TrailedValues,
        start_min: i64,
        start_max: i64,
        duration_min: i64,
        duration_max: i64,
        optional: bool,
    ) -> IntervalVar {
        peregrine_assert_simple!(start_min <= start_max && duration_min <= duration_max);

        self.is_pending.push(false);
        self.intervals.push(IntervalData {
            start_min: trailed.grow(start_min),
            start_max: trailed.grow(start_max),
            duration_min: trailed.grow(duration_min),
            duration_max: trailed.grow(duration_max),
            end_min: trailed.grow(start_min + duration_min),
            end_max: trailed.grow(start_max + duration_max),
            performed: trailed.grow(if optional { MAY_PERFORM } else { MUST_PERFORM }),
            demons: Vec::new(),
        })
    }

    pub(crate) fn num_intervals(&self) -> usize {
        self.intervals.len()
    }

    pub(crate) fn attach_demon(&mut self, var: IntervalVar, demon: DemonId) {
        let demons = &mut self.intervals[var].demons;
        if !demons.contains(&demon) {
            demons.push(demon);
        }
    }

    pub(crate) fn demons(&self, var: IntervalVar) -> &[DemonId] {
        &self.intervals[var].demons
    }

    pub(crate) fn drain_pending(&mut self, buffer: &mut Vec<IntervalVar>) {
        for &var in &self.pending {
            self.is_pending[var] = false;
        }
        buffer.append(&mut self.pending);
    }

    fn mark_pending(&mut self, var: IntervalVar) {
        if !self.is_pending[var] {
            self.is_pending[var] = true;
            self.pending.push(var);
        }
    }
}

// inspection
impl IntervalStore {
    pub(crate) fn start_min(&self, trailed: &TrailedValues, var: IntervalVar) -> i64 {
        trailed.read(self.intervals[var].start_min)
    }

    pub(crate) fn start_max(&self, trailed: &TrailedValues, var: IntervalVar) -> i64 {
        trailed.read(self.intervals[var].start_max)
    }

    pub(crate) fn duration_min(&self, trailed: &TrailedValues, var: IntervalVar) -> i64 {
        trailed.read(self.intervals[var].duration_min)
    }

    pub(crate) fn duration_max(&self, trailed: &TrailedValues, var: IntervalVar) -> i64 {
        trailed.read(self.intervals[var].duration_max)
    }

    pub(crate) fn end_min(&self, trailed: &TrailedValues, var: IntervalVar) -> i64 {
        trailed.read(self.intervals[var].end_min)
    }

    pub(crate) fn end_max(&self, trailed: &TrailedValues, var: IntervalVar) -> i64 {
        trailed.read(self.intervals[var].end_max)
    }

    pub(crate) fn may_be_performed(&self, trailed: &TrailedValues, var: IntervalVar) -> bool {
        trailed.read(self.intervals[var].performed) != CANNOT_PERFORM
    }

    pub(crate) fn must_be_performed(&self, trailed: &TrailedValues, var: IntervalVar) -> bool {
        trailed.read(self.intervals[var].performed) == MUST_PERFORM
    }
}

// mutation
impl IntervalStore {
    pub(crate) fn set_start_min(
        &mut self,
        trailed: &mut TrailedValues,
        var: IntervalVar,
        value: i64,
    ) -> Result<(), EmptyDomain> {
        self.raise(trailed, var, |data| data.start_min, value)
    }

    pub(crate) fn set_start_max(
        &mut self,
        trailed: &mut TrailedValues,
        var: IntervalVar,
        value: i64,
    ) -> Result<(), EmptyDomain> {
        self.lower(trailed, var, |data| data.start_max, value)
    }

    pub(crate) fn set_duration_min(
        &mut self,
        trailed: &mut TrailedValues,
        var: IntervalVar,
        value: i64,
    ) -> Result<(), EmptyDomain> {
        self.raise(trailed, var, |data| data.duration_min, value)
    }

    pub(crate) fn set_duration_max(
        &mut self,
        trailed: &mut TrailedValues,
        var: IntervalVar,
        value: i64,
    ) -> Result<(), EmptyDomain> {
        self.lower(trailed, var, |data| data.duration_max, value)
    }

    pub(crate) fn set_end_min(
        &mut self,
        trailed: &mut TrailedValues,
        var: IntervalVar,
        value: i64,
    ) -> Result<(), EmptyDomain> {
        self.raise(trailed, var, |data| data.end_min, value)
    }

    pub(crate) fn set_end_max(
        &mut self,
        trailed: &mut TrailedValues,
        var: IntervalVar,
        value: i64,
    ) -> Result<(), EmptyDomain> {
        self.lower(trailed, var, |data| data.end_max, value)
    }

    pub(crate) fn set_performed(
        &mut self,
        trailed: &mut TrailedValues,
        var: IntervalVar,
        performed: bool,
    ) -> Result<(), EmptyDomain> {
        let cell = self.intervals[var].performed;
        match (trailed.read(cell), performed) {
            (MAY_PERFORM, true) => {
                trailed.assign(cell, MUST_PERFORM);
                self.mark_pending(var);
                Ok(())
            }
            (MAY_PERFORM, false) => {
                trailed.assign(cell, CANNOT_PERFORM);
                self.mark_pending(var);
                Ok(())
            }
            (MUST_PERFORM, false) | (CANNOT_PERFORM, true) => Err(EmptyDomain),
            _ => Ok(()),
        }
    }

    fn raise(
        &mut self,
        trailed: &mut TrailedValues,
        var: IntervalVar,
        field: impl Fn(&IntervalData) -> TrailedInt,
        value: i64,
    ) -> Result<(), EmptyDomain> {
        if !self.may_be_performed(trailed, var) {
            return Ok(());
        }
        let cell = field(&self.intervals[var]);
        if value <= trailed.read(cell) {
            return Ok(());
        }
        trailed.assign(cell, value);
        self.mark_pending(var);
        self.normalize(trailed, var)
    }

    fn lower(
        &mut self,
        trailed: &mut TrailedValues,
        var: IntervalVar,
        field: impl Fn(&IntervalData) -> TrailedInt,
        value: i64,
    ) -> Result<(), EmptyDomain> {
        if !self.may_be_performed(trailed, var) {
            return Ok(());
        }
        let cell = field(&self.intervals[var]);
        if value >= trailed.read(cell) {
            return Ok(());
        }
        trailed.assign(cell, value);
        self.mark_pending(var);
        self.normalize(trailed, var)
    }

    /// Re-establish `start + duration = end` by tightening the three ranges
    /// against each other until nothing moves.
    fn normalize(
        &mut self,
        trailed: &mut TrailedValues,
        var: IntervalVar,
    ) -> Result<(), EmptyDomain> {
        let data = &self.intervals[var];
        let (start_min, start_max) = (data.start_min, data.start_max);
        let (duration_min, duration_max) = (data.duration_min, data.duration_max);
        let (end_min, end_max) = (data.end_min, data.end_max);

        loop {
            let mut changed = false;
            let mut tighten = |trailed: &mut TrailedValues, cell: TrailedInt, value: i64, up: bool| {
                let current = trailed.read(cell);
                if (up && value > current) || (!up && value < current) {
                    trailed.assign(cell, value);
                    changed = true;
                }
            };

            let sn = trailed.read(start_min);
            let sx = trailed.read(start_max);
            let dn = trailed.read(duration_min);
            let dx = trailed.read(duration_max);
            let en = trailed.read(end_min);
            let ex = trailed.read(end_max);

            tighten(trailed, end_min, sn + dn, true);
            tighten(trailed, end_max, sx + dx, false);
            tighten(trailed, start_min, en - dx, true);
            tighten(trailed, start_max, ex - dn, false);
            tighten(trailed, duration_min, en - sx, true);
            tighten(trailed, duration_max, ex - sn, false);

            if !changed {
                break;
            }
        }

        let empty = trailed.read(start_min) > trailed.read(start_max)
            || trailed.read(duration_min) > trailed.read(duration_max)
            || trailed.read(end_min) > trailed.read(end_max);
        if empty {
            if self.must_be_performed(trailed, var) {
                return Err(EmptyDomain);
            }
            return self.set_performed(trailed, var, false);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (TrailedValues, IntervalStore) {
        (TrailedValues::default(), IntervalStore::default())
    }

    #[test]
    fn start_and_duration_imply_the_end_range() {
        let (mut trailed, mut intervals) = store();
        let interval = intervals.grow(&mut trailed, 0, 10, 3, 3, false);

        assert_eq!(intervals.end_min(&trailed, interval), 3);
        assert_eq!(intervals.end_max(&trailed, interval), 13);

        intervals
            .set_start_min(&mut trailed, interval, 5)
            .expect("non-empty");
        assert_eq!(intervals.end_min(&trailed, interval), 8);
    }

    #[test]
    fn tightening_the_end_pushes_back_on_the_start() {
        let (mut trailed, mut intervals) = store();
        let interval = intervals.grow(&mut trailed, 0, 10, 2, 4, false);

        intervals
            .set_end_max(&mut trailed, interval, 6)
            .expect("non-empty");

        assert_eq!(intervals.start_max(&trailed, interval), 4);
    }

    #[test]
    fn an_impossible_required_interval_fails() {
        let (mut trailed, mut intervals) = store();
        let interval = intervals.grow(&mut trailed, 0, 10, 3, 3, false);

        assert_eq!(
            Err(EmptyDomain),
            intervals.set_start_min(&mut trailed, interval, 11)
        );
    }

    #[test]
    fn an_impossible_optional_interval_becomes_unperformed() {
        let (mut trailed, mut intervals) = store();
        let interval = intervals.grow(&mut trailed, 0, 10, 3, 3, true);

        intervals
            .set_start_min(&mut trailed, interval, 11)
            .expect("optional interval absorbs the conflict");

        assert!(!intervals.may_be_performed(&trailed, interval));
    }

    #[test]
    fn performedness_narrows_monotonically() {
        let (mut trailed, mut intervals) = store();
        let interval = intervals.grow(&mut trailed, 0, 5, 1, 1, true);

        intervals
            .set_performed(&mut trailed, interval, true)
            .expect("may -> must");
        assert!(intervals.must_be_performed(&trailed, interval));
        assert_eq!(
            Err(EmptyDomain),
            intervals.set_performed(&mut trailed, interval, false)
        );
    }

    #[test]
    fn interval_state_is_reversible() {
        let (mut trailed, mut intervals) = store();
        let interval = intervals.grow(&mut trailed, 0, 10, 3, 3, true);

        trailed.push_level();
        intervals
            .set_start_min(&mut trailed, interval, 11)
            .expect("optional");
        assert!(!intervals.may_be_performed(&trailed, interval));

        trailed.undo_to(0);

        assert!(intervals.may_be_performed(&trailed, interval));
        assert_eq!(intervals.start_min(&trailed, interval), 0);
        assert_eq!(intervals.end_max(&trailed, interval), 13);
    }
}
