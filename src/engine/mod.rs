//! The propagation engine: domains, events, demons, constraints, and the
//! contexts through which they interact.

pub(crate) mod constraint;
pub(crate) mod contexts;
pub(crate) mod demon;
pub(crate) mod demon_queue;
pub(crate) mod domain_events;
pub(crate) mod domains;
pub(crate) mod event_sink;
pub(crate) mod intervals;
pub(crate) mod propagation_monitor;
pub(crate) mod sequences;
pub(crate) mod watch_list;

#[cfg(any(test, doc))]
pub(crate) mod test_solver;

pub use constraint::Constraint;
pub use constraint::ConstraintId;
pub use contexts::PostContext;
pub use contexts::PropagationContextMut;
pub use demon::DemonId;
pub use demon::DemonPriority;
pub use domain_events::DomainEvent;
pub use domain_events::DomainEvents;
pub use propagation_monitor::PropagationEvent;
pub use propagation_monitor::PropagationMonitor;
pub use propagation_monitor::RecordingMonitor;
pub use propagation_monitor::TraceMonitor;
