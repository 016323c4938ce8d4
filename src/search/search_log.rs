use std::time::Instant;

use log::info;

use super::MonitorContext;
use super::SearchMonitor;
use crate::branching::Decision;
use crate::variables::IntVar;

/// A monitor that periodically reports search progress through
/// [`log::info!`].
///
/// One line is emitted every `period` branches, at every solution, and at
/// the end of the search. When an objective variable is given, its bounds
/// are part of every line; an optional display callback contributes a
/// custom tail.
pub struct SearchLog {
    period: u64,
    branches: u64,
    objective: Option<IntVar>,
    display_callback: Option<Box<dyn Fn() -> String>>,
    started: Option<Instant>,
}

impl SearchLog {
    pub fn new(period: u64) -> Self {
        SearchLog {
            period: period.max(1),
            branches: 0,
            objective: None,
            display_callback: None,
            started: None,
        }
    }

    pub fn with_objective(mut self, objective: IntVar) -> Self {
        self.objective = Some(objective);
        self
    }

    pub fn with_display_callback(mut self, callback: Box<dyn Fn() -> String>) -> Self {
        self.display_callback = Some(callback);
        self
    }

    fn elapsed_ms(&self) -> u128 {
        self.started.map_or(0, |started| started.elapsed().as_millis())
    }

    fn output_line(&self, context: &MonitorContext<'_>, tag: &str) {
        let statistics = context.statistics();
        let mut line = format!(
            "{tag}: {} branches, {} failures, {} solutions, depth {}, {} ms",
            self.branches,
            statistics.num_failures,
            statistics.num_solutions,
            context.depth(),
            self.elapsed_ms(),
        );
        if let Some(objective) = self.objective {
            line.push_str(&format!(
                ", objective in [{}..{}]",
                context.lower_bound(objective),
                context.upper_bound(objective)
            ));
        }
        if let Some(callback) = &self.display_callback {
            line.push_str(", ");
            line.push_str(&callback());
        }
        info!("{line}");
    }

    fn branch(&mut self, context: &MonitorContext<'_>) {
        self.branches += 1;
        if self.branches % self.period == 0 {
            self.output_line(context, "search");
        }
    }
}

impl SearchMonitor for SearchLog {
    fn enter_search(&mut self, _context: &MonitorContext<'_>) {
        self.started = Some(Instant::now());
        self.branches = 0;
        info!("start search");
    }

    fn exit_search(&mut self, context: &MonitorContext<'_>) {
        self.output_line(context, "end search");
    }

    fn apply_decision(&mut self, _decision: &Decision, context: &MonitorContext<'_>) {
        self.branch(context);
    }

    fn refute_decision(&mut self, _decision: &Decision, context: &MonitorContext<'_>) {
        self.branch(context);
    }

    fn at_solution(&mut self, context: &MonitorContext<'_>) {
        self.output_line(context, "solution");
    }

    fn no_more_solutions(&mut self, context: &MonitorContext<'_>) {
        self.output_line(context, "finished");
    }
}
