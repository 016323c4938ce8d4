use crate::basic_types::PropagationStatus;
use crate::engine::DemonPriority;
use crate::engine::DomainEvents;
use crate::engine::PostContext;
use crate::engine::PropagationContextMut;
use crate::engine::Constraint;
use crate::peregrine_assert_simple;
use crate::variables::expr::div_floor;
use crate::variables::IntVar;

/// `Σ coefficient · var <= rhs`, with bounds-consistent propagation.
pub struct LinearLessOrEqual {
    terms: Vec<(i64, IntVar)>,
    rhs: i64,
}

impl LinearLessOrEqual {
    pub fn new(terms: Vec<(i64, IntVar)>, rhs: i64) -> Self {
        peregrine_assert_simple!(terms.iter().all(|&(coefficient, _)| coefficient != 0));
        LinearLessOrEqual { terms, rhs }
    }

    fn term_min(context: &PropagationContextMut<'_>, coefficient: i64, var: IntVar) -> i64 {
        if coefficient > 0 {
            coefficient * context.lower_bound(var)
        } else {
            coefficient * context.upper_bound(var)
        }
    }
}

impl Constraint for LinearLessOrEqual {
    fn name(&self) -> &str {
        "LinearLessOrEqual"
    }

    fn post(&mut self, context: &mut PostContext<'_>) {
        // A full re-scan is the only propagation rule, so run it delayed.
        let demon = context.new_demon(DemonPriority::Delayed, 0);
        for &(_, var) in &self.terms {
            context.watch(var, DomainEvents::RANGE, demon);
        }
    }

    fn initial_propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        let min_sum: i64 = self
            .terms
            .iter()
            .map(|&(coefficient, var)| Self::term_min(context, coefficient, var))
            .sum();

        if min_sum > self.rhs {
            return Err(context.fail());
        }

        for &(coefficient, var) in &self.terms {
            let slack = self.rhs - (min_sum - Self::term_min(context, coefficient, var));
            if coefficient > 0 {
                context.set_max(var, div_floor(slack, coefficient))?;
            } else {
                context.set_min(var, -div_floor(slack, -coefficient))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_solver::TestSolver;

    #[test]
    fn upper_bounds_follow_from_the_slack() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);
        let y = solver.new_variable(2, 10);
        solver
            .post(LinearLessOrEqual::new(vec![(1, x), (1, y)], 7))
            .expect("feasible");

        assert_eq!(solver.upper_bound(x), 5);
        assert_eq!(solver.upper_bound(y), 7);
    }

    #[test]
    fn coefficients_scale_the_bounds() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);
        // 3x <= 7
        solver
            .post(LinearLessOrEqual::new(vec![(3, x)], 7))
            .expect("feasible");

        assert_eq!(solver.upper_bound(x), 2);
    }

    #[test]
    fn negative_coefficients_raise_lower_bounds() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(-10, 10);
        // -2x <= -6, i.e. x >= 3
        solver
            .post(LinearLessOrEqual::new(vec![(-2, x)], -6))
            .expect("feasible");

        assert_eq!(solver.lower_bound(x), 3);
    }

    #[test]
    fn tightening_an_operand_reawakens_the_constraint() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);
        let y = solver.new_variable(0, 10);
        solver
            .post(LinearLessOrEqual::new(vec![(1, x), (1, y)], 7))
            .expect("feasible");

        solver.set_min_and_propagate(x, 6).expect("non-empty");

        assert_eq!(solver.upper_bound(y), 1);
    }

    #[test]
    fn an_unsatisfiable_sum_breaks_the_model() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(5, 10);
        let y = solver.new_variable(5, 10);

        let result = solver.post(LinearLessOrEqual::new(vec![(1, x), (1, y)], 9));

        assert!(result.is_err());
    }
}
