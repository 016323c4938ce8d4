#![cfg(any(test, doc))]
//! A thin harness over [`Solver`] for testing constraints: it exposes the
//! propagation internals that production code reaches only through
//! decisions and search.

use crate::basic_types::PropagationStatus;
use crate::engine::Constraint;
use crate::solver::ModelError;
use crate::solver::Solver;
use crate::variables::IntVar;

#[derive(Default)]
pub(crate) struct TestSolver {
    pub(crate) solver: Solver,
}

impl TestSolver {
    pub(crate) fn new_variable(&mut self, lower_bound: i64, upper_bound: i64) -> IntVar {
        self.solver.new_int_var(lower_bound, upper_bound)
    }

    pub(crate) fn post(
        &mut self,
        constraint: impl Constraint + 'static,
    ) -> Result<(), ModelError> {
        self.solver.add_constraint(constraint)
    }

    pub(crate) fn lower_bound(&self, var: IntVar) -> i64 {
        self.solver.lower_bound(var)
    }

    pub(crate) fn upper_bound(&self, var: IntVar) -> i64 {
        self.solver.upper_bound(var)
    }

    pub(crate) fn contains(&self, var: IntVar, value: i64) -> bool {
        self.solver.contains(var, value)
    }

    pub(crate) fn set_min_and_propagate(&mut self, var: IntVar, value: i64) -> PropagationStatus {
        self.solver.set_min(var, value)
    }

    pub(crate) fn set_max_and_propagate(&mut self, var: IntVar, value: i64) -> PropagationStatus {
        self.solver.set_max(var, value)
    }

    pub(crate) fn set_value_and_propagate(&mut self, var: IntVar, value: i64) -> PropagationStatus {
        self.solver.set_value(var, value)
    }
}
