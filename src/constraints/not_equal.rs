use crate::basic_types::PropagationStatus;
use crate::engine::DemonPriority;
use crate::engine::DomainEvents;
use crate::engine::PostContext;
use crate::engine::PropagationContextMut;
use crate::engine::Constraint;
use crate::variables::IntVar;

/// `x != y + offset`.
pub struct NotEqual {
    x: IntVar,
    y: IntVar,
    offset: i64,
}

impl NotEqual {
    pub fn new(x: IntVar, y: IntVar, offset: i64) -> Self {
        NotEqual { x, y, offset }
    }
}

const X_BOUND: u64 = 0;
const Y_BOUND: u64 = 1;

impl Constraint for NotEqual {
    fn name(&self) -> &str {
        "NotEqual"
    }

    fn post(&mut self, context: &mut PostContext<'_>) {
        let x_demon = context.new_demon(DemonPriority::Normal, X_BOUND);
        context.watch(self.x, DomainEvents::BOUND, x_demon);
        let y_demon = context.new_demon(DemonPriority::Normal, Y_BOUND);
        context.watch(self.y, DomainEvents::BOUND, y_demon);
    }

    fn initial_propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        if context.is_assigned(self.x) {
            self.run_demon(X_BOUND, context)?;
        }
        if context.is_assigned(self.y) {
            self.run_demon(Y_BOUND, context)?;
        }
        Ok(())
    }

    fn run_demon(
        &mut self,
        payload: u64,
        context: &mut PropagationContextMut<'_>,
    ) -> PropagationStatus {
        match payload {
            X_BOUND => {
                if context.is_assigned(self.x) {
                    context.remove_value(self.y, context.value(self.x) - self.offset)?;
                }
            }
            _ => {
                if context.is_assigned(self.y) {
                    context.remove_value(self.x, context.value(self.y) + self.offset)?;
                }
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
    fn binding_one_side_prunes_the_other() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 5);
        let y = solver.new_variable(0, 5);
        solver.post(NotEqual::new(x, y, 0)).expect("feasible");

        solver.set_value_and_propagate(x, 3).expect("non-empty");

        assert!(!solver.contains(y, 3));
        assert_eq!(solver.lower_bound(y), 0);
    }

    #[test]
    fn the_offset_shifts_the_forbidden_value() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);
        let y = solver.new_variable(0, 10);
        // x != y + 2
        solver.post(NotEqual::new(x, y, 2)).expect("feasible");

        solver.set_value_and_propagate(y, 4).expect("non-empty");

        assert!(!solver.contains(x, 6));
        assert!(solver.contains(x, 4));
    }

    #[test]
    fn two_fixed_equal_sides_are_infeasible() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(3, 3);
        let y = solver.new_variable(3, 3);

        let result = solver.post(NotEqual::new(x, y, 0));

        assert!(result.is_err());
    }
}
