use std::time::Duration;
use std::time::Instant;

use super::MonitorContext;
use super::SearchMonitor;

/// Stops the search after a wall-clock budget. The clock starts when the
/// search is entered.
#[derive(Debug)]
pub struct TimeLimit {
    budget: Duration,
    started: Option<Instant>,
}

impl TimeLimit {
    pub fn new(budget: Duration) -> Self {
        TimeLimit {
            budget,
            started: None,
        }
    }
}

impl SearchMonitor for TimeLimit {
    fn enter_search(&mut self, _context: &MonitorContext<'_>) {
        self.started = Some(Instant::now());
    }

    fn should_stop(&mut self, _context: &MonitorContext<'_>) -> bool {
        self.started
            .is_some_and(|started| started.elapsed() >= self.budget)
    }
}

/// Stops the search once a number of solutions has been found.
#[derive(Debug)]
pub struct SolutionLimit {
    limit: u64,
}

impl SolutionLimit {
    pub fn new(limit: u64) -> Self {
        SolutionLimit { limit }
    }
}

impl SearchMonitor for SolutionLimit {
    fn should_stop(&mut self, context: &MonitorContext<'_>) -> bool {
        context.statistics().num_solutions >= self.limit
    }
}
