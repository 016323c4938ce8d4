use super::constraint::ConstraintId;
use super::demon::DemonId;
use super::demon::DemonPriority;
use super::demon::DemonStore;
use super::domain_events::DomainEvents;
use super::domains::Domains;
use super::intervals::IntervalStore;
use super::propagation_monitor::PropagationEvent;
use super::propagation_monitor::PropagationMonitor;
use super::sequences::SequenceStore;
use super::watch_list::WatchList;
use crate::basic_types::Failure;
use crate::basic_types::PropagationStatus;
use crate::state::TrailedValues;
use crate::variables::expr::ExprStore;
use crate::variables::ExprId;
use crate::variables::IntervalVar;
use crate::variables::IntVar;
use crate::variables::SequenceVar;

/// The context handed to [`Constraint::post`](super::Constraint::post):
/// interning demons and attaching them to variable events.
pub struct PostContext<'a> {
    pub(crate) constraint: ConstraintId,
    pub(crate) demons: &'a mut DemonStore,
    pub(crate) watch_list: &'a mut WatchList,
    pub(crate) intervals: &'a mut IntervalStore,
    pub(crate) sequences: &'a mut SequenceStore,
    pub(crate) domains: &'a Domains,
    pub(crate) trailed: &'a TrailedValues,
}

impl PostContext<'_> {
    /// Intern a demon for the posting constraint. The payload is handed
    /// back verbatim when the demon runs.
    pub fn new_demon(&mut self, priority: DemonPriority, payload: u64) -> DemonId {
        self.demons.intern(self.constraint, payload, priority)
    }

    /// Attach `demon` to the given events of `var`.
    pub fn watch(&mut self, var: IntVar, events: DomainEvents, demon: DemonId) {
        self.watch_list.watch(var, events, demon);
    }

    /// Attach `demon` to every change of `interval`.
    pub fn watch_interval(&mut self, interval: IntervalVar, demon: DemonId) {
        self.intervals.attach_demon(interval, demon);
    }

    /// Attach `demon` to every change of `sequence`.
    pub fn watch_sequence(&mut self, sequence: SequenceVar, demon: DemonId) {
        self.sequences.attach_demon(sequence, demon);
    }

    pub fn lower_bound(&self, var: IntVar) -> i64 {
        self.domains.lower_bound(var)
    }

    pub fn upper_bound(&self, var: IntVar) -> i64 {
        self.domains.upper_bound(var)
    }

    pub fn sequence_intervals(&self, sequence: SequenceVar) -> &[IntervalVar] {
        self.sequences.intervals(sequence)
    }

    pub fn num_sequence_intervals(&self, sequence: SequenceVar) -> usize {
        self.sequences.intervals(sequence).len()
    }

    pub fn interval_start_min(&self, interval: IntervalVar) -> i64 {
        self.intervals.start_min(self.trailed, interval)
    }

    pub fn interval_end_max(&self, interval: IntervalVar) -> i64 {
        self.intervals.end_max(self.trailed, interval)
    }
}

/// The mutable view of the solver state a running constraint propagates
/// through. All mutations are trailed and reported to the propagation
/// monitor.
pub struct PropagationContextMut<'a> {
    pub(crate) domains: &'a mut Domains,
    pub(crate) trailed: &'a mut TrailedValues,
    pub(crate) intervals: &'a mut IntervalStore,
    pub(crate) sequences: &'a mut SequenceStore,
    pub(crate) exprs: &'a ExprStore,
    pub(crate) monitor: &'a mut Option<Box<dyn PropagationMonitor>>,
}

impl PropagationContextMut<'_> {
    pub(crate) fn emit(&mut self, event: PropagationEvent) {
        if let Some(monitor) = self.monitor.as_mut() {
            monitor.on_event(&event);
        }
    }

    /// Signal infeasibility detected by the constraint itself.
    pub fn fail(&mut self) -> Failure {
        Failure
    }
}

// integer variables
impl PropagationContextMut<'_> {
    pub fn lower_bound(&self, var: IntVar) -> i64 {
        self.domains.lower_bound(var)
    }

    pub fn upper_bound(&self, var: IntVar) -> i64 {
        self.domains.upper_bound(var)
    }

    pub fn contains(&self, var: IntVar, value: i64) -> bool {
        self.domains.contains(var, value)
    }

    pub fn is_assigned(&self, var: IntVar) -> bool {
        self.domains.is_assigned(var)
    }

    pub fn value(&self, var: IntVar) -> i64 {
        self.domains.assigned_value(var)
    }

    pub fn size(&self, var: IntVar) -> i64 {
        self.domains.size(var)
    }

    pub fn set_min(&mut self, var: IntVar, value: i64) -> PropagationStatus {
        if value > self.domains.lower_bound(var) {
            self.emit(PropagationEvent::SetMin { var, value });
        }
        self.domains.set_min(var, value)?;
        Ok(())
    }

    pub fn set_max(&mut self, var: IntVar, value: i64) -> PropagationStatus {
        if value < self.domains.upper_bound(var) {
            self.emit(PropagationEvent::SetMax { var, value });
        }
        self.domains.set_max(var, value)?;
        Ok(())
    }

    pub fn set_value(&mut self, var: IntVar, value: i64) -> PropagationStatus {
        if !self.domains.is_assigned(var) {
            self.emit(PropagationEvent::SetValue { var, value });
        }
        self.domains.set_value(var, value)?;
        Ok(())
    }

    pub fn remove_value(&mut self, var: IntVar, value: i64) -> PropagationStatus {
        if self.domains.contains(var, value) {
            self.emit(PropagationEvent::RemoveValue { var, value });
        }
        self.domains.remove_value(var, value)?;
        Ok(())
    }

    pub fn remove_interval(&mut self, var: IntVar, lower: i64, upper: i64) -> PropagationStatus {
        if lower <= upper {
            self.emit(PropagationEvent::RemoveInterval { var, lower, upper });
        }
        self.domains.remove_interval(var, lower, upper)?;
        Ok(())
    }
}

// expressions
impl PropagationContextMut<'_> {
    pub fn expr_min(&self, expr: ExprId) -> i64 {
        self.exprs.get(expr).min(self.domains)
    }

    pub fn expr_max(&self, expr: ExprId) -> i64 {
        self.exprs.get(expr).max(self.domains)
    }

    pub fn expr_set_min(&mut self, expr: ExprId, value: i64) -> PropagationStatus {
        let exprs: &ExprStore = self.exprs;
        exprs.get(expr).set_min(self, value)
    }

    pub fn expr_set_max(&mut self, expr: ExprId, value: i64) -> PropagationStatus {
        let exprs: &ExprStore = self.exprs;
        exprs.get(expr).set_max(self, value)
    }
}

// intervals
impl PropagationContextMut<'_> {
    pub fn start_min(&self, interval: IntervalVar) -> i64 {
        self.intervals.start_min(self.trailed, interval)
    }

    pub fn start_max(&self, interval: IntervalVar) -> i64 {
        self.intervals.start_max(self.trailed, interval)
    }

    pub fn duration_min(&self, interval: IntervalVar) -> i64 {
        self.intervals.duration_min(self.trailed, interval)
    }

    pub fn duration_max(&self, interval: IntervalVar) -> i64 {
        self.intervals.duration_max(self.trailed, interval)
    }

    pub fn end_min(&self, interval: IntervalVar) -> i64 {
        self.intervals.end_min(self.trailed, interval)
    }

    pub fn end_max(&self, interval: IntervalVar) -> i64 {
        self.intervals.end_max(self.trailed, interval)
    }

    pub fn may_be_performed(&self, interval: IntervalVar) -> bool {
        self.intervals.may_be_performed(self.trailed, interval)
    }

    pub fn must_be_performed(&self, interval: IntervalVar) -> bool {
        self.intervals.must_be_performed(self.trailed, interval)
    }

    pub fn set_start_min(&mut self, interval: IntervalVar, value: i64) -> PropagationStatus {
        self.emit(PropagationEvent::SetStartMin { var: interval, value });
        self.intervals.set_start_min(self.trailed, interval, value)?;
        Ok(())
    }

    pub fn set_start_max(&mut self, interval: IntervalVar, value: i64) -> PropagationStatus {
        self.emit(PropagationEvent::SetStartMax { var: interval, value });
        self.intervals.set_start_max(self.trailed, interval, value)?;
        Ok(())
    }

    pub fn set_duration_min(&mut self, interval: IntervalVar, value: i64) -> PropagationStatus {
        self.emit(PropagationEvent::SetDurationMin { var: interval, value });
        self.intervals
            .set_duration_min(self.trailed, interval, value)?;
        Ok(())
    }

    pub fn set_duration_max(&mut self, interval: IntervalVar, value: i64) -> PropagationStatus {
        self.emit(PropagationEvent::SetDurationMax { var: interval, value });
        self.intervals
            .set_duration_max(self.trailed, interval, value)?;
        Ok(())
    }

    pub fn set_end_min(&mut self, interval: IntervalVar, value: i64) -> PropagationStatus {
        self.emit(PropagationEvent::SetEndMin { var: interval, value });
        self.intervals.set_end_min(self.trailed, interval, value)?;
        Ok(())
    }

    pub fn set_end_max(&mut self, interval: IntervalVar, value: i64) -> PropagationStatus {
        self.emit(PropagationEvent::SetEndMax { var: interval, value });
        self.intervals.set_end_max(self.trailed, interval, value)?;
        Ok(())
    }

    pub fn set_performed(&mut self, interval: IntervalVar, performed: bool) -> PropagationStatus {
        self.emit(PropagationEvent::SetPerformed {
            var: interval,
            performed,
        });
        self.intervals
            .set_performed(self.trailed, interval, performed)?;
        Ok(())
    }
}

// sequences
impl PropagationContextMut<'_> {
    pub fn sequence_intervals(&self, sequence: SequenceVar) -> &[IntervalVar] {
        self.sequences.intervals(sequence)
    }

    pub fn ranked_first(&self, sequence: SequenceVar) -> Vec<u32> {
        self.sequences.ranked_first(self.trailed, sequence)
    }

    pub fn ranked_last(&self, sequence: SequenceVar) -> Vec<u32> {
        self.sequences.ranked_last(self.trailed, sequence)
    }

    pub fn unranked(&self, sequence: SequenceVar) -> Vec<u32> {
        self.sequences.unranked(self.trailed, sequence)
    }

    pub fn rank_first(&mut self, sequence: SequenceVar, index: u32) -> PropagationStatus {
        self.emit(PropagationEvent::RankFirst {
            var: sequence,
            index,
        });
        self.sequences
            .rank_first(self.trailed, self.intervals, sequence, index)?;
        Ok(())
    }

    pub fn rank_last(&mut self, sequence: SequenceVar, index: u32) -> PropagationStatus {
        self.emit(PropagationEvent::RankLast {
            var: sequence,
            index,
        });
        self.sequences
            .rank_last(self.trailed, self.intervals, sequence, index)?;
        Ok(())
    }
}
