use crate::branching::Decision;
use crate::engine::domains::Domains;
use crate::statistics::SolverStatistics;
use crate::variables::IntVar;

/// The read-only view of the search state handed to monitor hooks.
pub struct MonitorContext<'a> {
    pub(crate) domains: &'a Domains,
    pub(crate) statistics: &'a SolverStatistics,
    pub(crate) depth: usize,
}

impl MonitorContext<'_> {
    pub fn lower_bound(&self, var: IntVar) -> i64 {
        self.domains.lower_bound(var)
    }

    pub fn upper_bound(&self, var: IntVar) -> i64 {
        self.domains.upper_bound(var)
    }

    pub fn is_bound(&self, var: IntVar) -> bool {
        self.domains.is_assigned(var)
    }

    pub fn statistics(&self) -> &SolverStatistics {
        self.statistics
    }

    /// The number of open decisions on the active branch.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Observes the search engine. Every hook has a default empty
/// implementation; monitors override the ones they care about.
///
/// Limits are monitors too: [`SearchMonitor::should_stop`] is polled once
/// per search node, and a `true` ends the search with
/// [`SearchStatus::LimitReached`](crate::basic_types::SearchStatus).
#[allow(unused_variables)]
pub trait SearchMonitor {
    fn enter_search(&mut self, context: &MonitorContext<'_>) {}

    fn exit_search(&mut self, context: &MonitorContext<'_>) {}

    fn begin_initial_propagation(&mut self, context: &MonitorContext<'_>) {}

    fn end_initial_propagation(&mut self, context: &MonitorContext<'_>) {}

    fn apply_decision(&mut self, decision: &Decision, context: &MonitorContext<'_>) {}

    fn refute_decision(&mut self, decision: &Decision, context: &MonitorContext<'_>) {}

    fn begin_fail(&mut self, context: &MonitorContext<'_>) {}

    fn end_fail(&mut self, context: &MonitorContext<'_>) {}

    fn at_solution(&mut self, context: &MonitorContext<'_>) {}

    fn no_more_solutions(&mut self, context: &MonitorContext<'_>) {}

    fn should_stop(&mut self, context: &MonitorContext<'_>) -> bool {
        false
    }
}
