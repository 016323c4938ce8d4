use log::trace;

use super::constraint::ConstraintId;
use super::demon::DemonId;
use crate::variables::IntervalVar;
use crate::variables::IntVar;
use crate::variables::SequenceVar;

/// One observable step of the propagation engine.
///
/// Every domain mutation, demon run and initial propagation is reported as
/// a variant of this type, so an observer implements a single method rather
/// than one hook per mutation kind.
#[derive(Debug, Clone)]
pub enum PropagationEvent {
    BeginInitialPropagation { constraint: ConstraintId },
    EndInitialPropagation { constraint: ConstraintId },
    BeginDemonRun { demon: DemonId },
    EndDemonRun { demon: DemonId },
    SetMin { var: IntVar, value: i64 },
    SetMax { var: IntVar, value: i64 },
    SetValue { var: IntVar, value: i64 },
    RemoveValue { var: IntVar, value: i64 },
    RemoveInterval { var: IntVar, lower: i64, upper: i64 },
    SetStartMin { var: IntervalVar, value: i64 },
    SetStartMax { var: IntervalVar, value: i64 },
    SetDurationMin { var: IntervalVar, value: i64 },
    SetDurationMax { var: IntervalVar, value: i64 },
    SetEndMin { var: IntervalVar, value: i64 },
    SetEndMax { var: IntervalVar, value: i64 },
    SetPerformed { var: IntervalVar, performed: bool },
    RankFirst { var: SequenceVar, index: u32 },
    RankLast { var: SequenceVar, index: u32 },
    Failure,
}

/// A strictly observational hook around the propagation engine: it is told
/// about every state change but has no propagation responsibility.
pub trait PropagationMonitor {
    fn on_event(&mut self, event: &PropagationEvent);
}

/// A monitor that logs every propagation event through [`log::trace!`].
#[derive(Debug, Default)]
pub struct TraceMonitor;

impl PropagationMonitor for TraceMonitor {
    fn on_event(&mut self, event: &PropagationEvent) {
        match event {
            PropagationEvent::SetMin { var, value } => trace!("{var} >= {value}"),
            PropagationEvent::SetMax { var, value } => trace!("{var} <= {value}"),
            PropagationEvent::SetValue { var, value } => trace!("{var} == {value}"),
            PropagationEvent::RemoveValue { var, value } => trace!("{var} != {value}"),
            PropagationEvent::RemoveInterval { var, lower, upper } => {
                trace!("{var} != [{lower}..{upper}]")
            }
            PropagationEvent::BeginDemonRun { demon } => trace!("run {demon} {{"),
            PropagationEvent::EndDemonRun { demon } => trace!("}} end {demon}"),
            PropagationEvent::BeginInitialPropagation { constraint } => {
                trace!("initial propagation of {constraint} {{")
            }
            PropagationEvent::EndInitialPropagation { constraint } => {
                trace!("}} end initial propagation of {constraint}")
            }
            PropagationEvent::Failure => trace!("failure"),
            other => trace!("{other:?}"),
        }
    }
}

/// A monitor that records every event through a shared handle; used to
/// observe propagation in tests.
#[derive(Debug, Default)]
pub struct RecordingMonitor {
    events: std::rc::Rc<std::cell::RefCell<Vec<PropagationEvent>>>,
}

impl RecordingMonitor {
    /// The handle stays valid after the monitor is installed on a solver.
    pub fn events(&self) -> std::rc::Rc<std::cell::RefCell<Vec<PropagationEvent>>> {
        std::rc::Rc::clone(&self.events)
    }
}

impl PropagationMonitor for RecordingMonitor {
    fn on_event(&mut self, event: &PropagationEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
