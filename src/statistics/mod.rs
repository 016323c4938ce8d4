//! Statistic logging.
//!
//! Statistics are emitted as `PREFIX name=value` lines through the `log`
//! facade, so the embedding application decides where they end up. The
//! prefix is configured once per process.

use std::fmt::Display;
use std::sync::OnceLock;

use log::info;

static STATISTIC_PREFIX: OnceLock<&'static str> = OnceLock::new();

/// Configure the prefix put in front of every statistic line. Statistics
/// are only logged after this has been called.
pub fn configure_statistic_logging(prefix: &'static str) {
    let _ = STATISTIC_PREFIX.set(prefix);
}

/// Whether statistic logging has been configured.
pub fn should_log_statistics() -> bool {
    STATISTIC_PREFIX.get().is_some()
}

/// Log a single `name=value` statistic line.
pub fn log_statistic(name: impl Display, value: impl Display) {
    if let Some(prefix) = STATISTIC_PREFIX.get() {
        info!("{prefix} {name}={value}");
    }
}

/// Counters maintained by the search engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverStatistics {
    pub num_decisions: u64,
    pub num_failures: u64,
    pub num_solutions: u64,
    pub num_demon_runs: u64,
    pub num_constraints: u64,
    pub max_depth: usize,
}

impl SolverStatistics {
    pub fn log(&self) {
        log_statistic("numDecisions", self.num_decisions);
        log_statistic("numFailures", self.num_failures);
        log_statistic("numSolutions", self.num_solutions);
        log_statistic("numDemonRuns", self.num_demon_runs);
        log_statistic("numConstraints", self.num_constraints);
        log_statistic("maxDepth", self.max_depth);
    }
}
