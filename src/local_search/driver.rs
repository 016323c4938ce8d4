use log::debug;

use super::LocalSearchFilter;
use super::LocalSearchOperator;
use crate::assignment::Assignment;
use crate::solver::Solver;
use crate::variables::IntVar;

/// Drives local search over a base assignment.
///
/// Operators are tried in registration order. Every candidate delta runs
/// the filter gauntlet first; survivors are validated by re-applying them
/// inside a trail-marked frame with full propagation (relaxed variables
/// are completed by a nested search). A rejected delta is silently
/// discarded; an accepted one becomes the new base, filters are
/// resynchronized, and the operator rotation restarts.
#[derive(Default)]
pub struct LocalSearch {
    operators: Vec<Box<dyn LocalSearchOperator>>,
    filters: Vec<Box<dyn LocalSearchFilter>>,
}

impl LocalSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_operator(&mut self, operator: Box<dyn LocalSearchOperator>) {
        self.operators.push(operator);
    }

    pub fn add_filter(&mut self, filter: Box<dyn LocalSearchFilter>) {
        self.filters.push(filter);
    }

    /// Improve `assignment` with first-improvement moves on `objective`
    /// until no operator finds one. Without an objective, the first
    /// feasible move is committed and the search stops. Returns the number
    /// of accepted moves.
    pub fn optimize(
        &mut self,
        solver: &mut Solver,
        assignment: &mut Assignment,
        objective: Option<IntVar>,
    ) -> u64 {
        let LocalSearch { operators, filters } = self;

        for filter in filters.iter_mut() {
            filter.synchronize(assignment);
        }

        // The base must itself be feasible.
        let empty = Assignment::default();
        let Some((_, mut best_objective)) = solver.try_delta(assignment, &empty, objective) else {
            debug!("local search: infeasible base assignment");
            return 0;
        };

        let mut accepted = 0u64;
        let mut delta = Assignment::default();
        let mut deltadelta = Assignment::default();

        'improvement: loop {
            for operator in operators.iter_mut() {
                operator.start(assignment);
                while operator.make_next_neighbor(&mut delta, &mut deltadelta) {
                    if delta.is_empty() {
                        continue;
                    }
                    if !filters.iter_mut().all(|filter| filter.accept(&delta, &deltadelta)) {
                        continue;
                    }
                    let Some((candidate, candidate_objective)) =
                        solver.try_delta(assignment, &delta, objective)
                    else {
                        continue;
                    };
                    if objective.is_some() && candidate_objective >= best_objective {
                        continue;
                    }

                    assignment.copy_from(&candidate);
                    best_objective = candidate_objective;
                    accepted += 1;
                    for filter in filters.iter_mut() {
                        filter.synchronize(assignment);
                    }
                    debug!("local search: move accepted, objective {best_objective}");

                    if objective.is_none() {
                        return accepted;
                    }
                    continue 'improvement;
                }
            }
            return accepted;
        }
    }
}
