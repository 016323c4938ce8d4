use crate::basic_types::PropagationStatus;
use crate::engine::DemonPriority;
use crate::engine::DomainEvents;
use crate::engine::PostContext;
use crate::engine::PropagationContextMut;
use crate::engine::Constraint;
use crate::variables::ExprId;
use crate::variables::IntVar;

/// Channels `var == expr`: the shadow variable tracks the expression's
/// range, and bound requests on the variable flow back into the
/// expression's operands. This is what casting an expression to a variable
/// posts.
pub struct LinkExprVar {
    var: IntVar,
    expr: ExprId,
    operands: Vec<IntVar>,
}

impl LinkExprVar {
    pub fn new(var: IntVar, expr: ExprId, operands: Vec<IntVar>) -> Self {
        LinkExprVar {
            var,
            expr,
            operands,
        }
    }

    fn propagate(&self, context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        context.set_min(self.var, context.expr_min(self.expr))?;
        context.set_max(self.var, context.expr_max(self.expr))?;
        let min = context.lower_bound(self.var);
        let max = context.upper_bound(self.var);
        context.expr_set_min(self.expr, min)?;
        context.expr_set_max(self.expr, max)?;
        Ok(())
    }
}

impl Constraint for LinkExprVar {
    fn name(&self) -> &str {
        "LinkExprVar"
    }

    fn post(&mut self, context: &mut PostContext<'_>) {
        let demon = context.new_demon(DemonPriority::Normal, 0);
        context.watch(self.var, DomainEvents::RANGE, demon);
        for &operand in &self.operands {
            context.watch(operand, DomainEvents::RANGE, demon);
        }
    }

    fn initial_propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        self.propagate(context)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::test_solver::TestSolver;

    #[test]
    fn the_shadow_variable_tracks_the_expression() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 5);
        let y = solver.new_variable(0, 5);
        let sum = solver.solver.plus(x, y);
        let shadow = solver.solver.expr_var(sum);

        assert_eq!(solver.lower_bound(shadow), 0);
        assert_eq!(solver.upper_bound(shadow), 10);

        solver.set_min_and_propagate(x, 3).expect("non-empty");
        assert_eq!(solver.lower_bound(shadow), 3);

        solver.set_max_and_propagate(y, 1).expect("non-empty");
        assert_eq!(solver.upper_bound(shadow), 6);
    }

    #[test]
    fn bounding_the_shadow_narrows_the_operands() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 5);
        let y = solver.new_variable(0, 5);
        let sum = solver.solver.plus(x, y);
        let shadow = solver.solver.expr_var(sum);

        solver.set_min_and_propagate(shadow, 9).expect("non-empty");

        assert_eq!(solver.lower_bound(x), 4);
        assert_eq!(solver.lower_bound(y), 4);
    }

    #[test]
    fn casting_is_memoized_per_expression() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 5);
        let y = solver.new_variable(0, 5);
        let sum = solver.solver.plus(x, y);

        let first = solver.solver.expr_var(sum);
        let second = solver.solver.expr_var(sum);
        assert_eq!(first, second);

        let other = solver.solver.plus(x, y);
        assert_ne!(first, solver.solver.expr_var(other));
    }
}
