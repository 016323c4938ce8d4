//! End-to-end behaviour of the search engine.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use peregrine_solver::basic_types::PropagationStatus;
use peregrine_solver::branching::FirstFail;
use peregrine_solver::branching::InputOrder;
use peregrine_solver::constraints::LinearLessOrEqual;
use peregrine_solver::constraints::NotEqual;
use peregrine_solver::engine::Constraint;
use peregrine_solver::engine::DemonPriority;
use peregrine_solver::engine::DomainEvents;
use peregrine_solver::engine::PostContext;
use peregrine_solver::engine::PropagationContextMut;
use peregrine_solver::search::SearchLog;
use peregrine_solver::search::SolutionLimit;
use peregrine_solver::search::TimeLimit;
use peregrine_solver::ModelError;
use peregrine_solver::SearchStatus;
use peregrine_solver::Solver;

#[test]
fn a_simple_model_is_solved_to_a_consistent_assignment() {
    let mut solver = Solver::new();
    let x = solver.new_int_var(0, 9);
    let y = solver.new_int_var(0, 9);
    solver
        .add_constraint(LinearLessOrEqual::new(vec![(1, x), (1, y)], 3))
        .expect("feasible");
    solver
        .add_constraint(NotEqual::new(x, y, 0))
        .expect("feasible");

    let result = solver.solve(InputOrder::new(vec![x, y]), vec![]);

    assert_eq!(result.status, SearchStatus::Feasible);
    let solution = result.assignment.expect("a solution");
    assert!(solution.value(x) + solution.value(y) <= 3);
    assert_ne!(solution.value(x), solution.value(y));
    assert!(solver.check_assignment(&solution));
}

#[test]
fn domain_mutators_narrow_and_backtracking_is_exact() {
    let mut solver = Solver::new();
    let v = solver.new_int_var(0, 10);

    solver.set_min(v, 3).expect("non-empty");
    assert_eq!((solver.lower_bound(v), solver.upper_bound(v)), (3, 10));
    solver.set_max(v, 5).expect("non-empty");
    assert_eq!((solver.lower_bound(v), solver.upper_bound(v)), (3, 5));
    solver.remove_value(v, 4).expect("non-empty");
    assert_eq!(solver.domain_size(v), 2);
    solver.set_value(v, 3).expect("non-empty");
    assert!(solver.is_bound(v));
}

#[test]
fn an_infeasible_model_breaks_the_solver() {
    let mut solver = Solver::new();
    let x = solver.new_int_var(5, 10);
    let y = solver.new_int_var(5, 10);

    let posted = solver.add_constraint(LinearLessOrEqual::new(vec![(1, x), (1, y)], 4));
    assert_eq!(posted, Err(ModelError::Infeasible));
    assert!(solver.is_broken());

    let further = solver.add_constraint(NotEqual::new(x, y, 0));
    assert_eq!(further, Err(ModelError::Broken));

    let result = solver.solve(InputOrder::new(vec![x, y]), vec![]);
    assert_eq!(result.status, SearchStatus::Infeasible);
    assert!(result.assignment.is_none());
}

#[test]
fn the_resumable_search_enumerates_every_solution() {
    let mut solver = Solver::new();
    let x = solver.new_int_var(0, 2);
    let y = solver.new_int_var(0, 2);
    solver
        .add_constraint(LinearLessOrEqual::new(vec![(1, x), (1, y)], 2))
        .expect("feasible");

    solver.new_search(InputOrder::new(vec![x, y]), vec![]);
    let mut solutions = Vec::new();
    while solver.next_solution() {
        solutions.push((solver.value(x), solver.value(y)));
    }
    let status = solver.end_search();

    assert_eq!(status, SearchStatus::Feasible);
    assert_eq!(
        solutions,
        vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (2, 0)]
    );
}

#[test]
fn first_fail_prefers_the_tightest_domain() {
    let mut solver = Solver::new();
    let wide = solver.new_int_var(0, 100);
    let narrow = solver.new_int_var(0, 1);

    let result = solver.solve(FirstFail::new(vec![wide, narrow]), vec![]);
    assert_eq!(result.status, SearchStatus::Feasible);

    let statistics = *solver.statistics();
    // Both variables get one decision each; first-fail just orders them.
    assert_eq!(statistics.num_decisions, 2);
    assert_eq!(statistics.num_solutions, 1);
}

#[test]
fn a_solution_limit_stops_the_enumeration() {
    let mut solver = Solver::new();
    let x = solver.new_int_var(0, 9);

    solver.new_search(
        InputOrder::new(vec![x]),
        vec![Box::new(SolutionLimit::new(1))],
    );
    assert!(solver.next_solution());
    assert!(!solver.next_solution());
    let status = solver.end_search();

    // A solution was found before the limit kicked in.
    assert_eq!(status, SearchStatus::Feasible);
}

#[test]
fn an_expired_time_limit_prevents_any_search() {
    let mut solver = Solver::new();
    let x = solver.new_int_var(0, 9);

    solver.new_search(
        InputOrder::new(vec![x]),
        vec![Box::new(TimeLimit::new(Duration::ZERO))],
    );
    assert!(!solver.next_solution());
    let status = solver.end_search();

    assert_eq!(status, SearchStatus::LimitReached);
}

#[test]
fn the_search_log_observes_a_full_run() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut solver = Solver::new();
    let x = solver.new_int_var(0, 3);
    let y = solver.new_int_var(0, 3);
    let objective = {
        let sum = solver.plus(x, y);
        solver.expr_var(sum)
    };

    let log = SearchLog::new(1).with_objective(objective);
    let result = solver.solve(InputOrder::new(vec![x, y]), vec![Box::new(log)]);

    assert_eq!(result.status, SearchStatus::Feasible);
}

/// A constraint with one normal and one delayed demon on the same
/// variable; the normal one re-enqueues itself once by narrowing the
/// variable again.
struct PriorityProbe {
    var: peregrine_solver::variables::IntVar,
    trace: Rc<RefCell<Vec<&'static str>>>,
    bumped: bool,
}

impl Constraint for PriorityProbe {
    fn name(&self) -> &str {
        "PriorityProbe"
    }

    fn post(&mut self, context: &mut PostContext<'_>) {
        let normal = context.new_demon(DemonPriority::Normal, 0);
        context.watch(self.var, DomainEvents::ANY, normal);
        let delayed = context.new_demon(DemonPriority::Delayed, 1);
        context.watch(self.var, DomainEvents::ANY, delayed);
    }

    fn initial_propagate(&mut self, _context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        Ok(())
    }

    fn run_demon(
        &mut self,
        payload: u64,
        context: &mut PropagationContextMut<'_>,
    ) -> PropagationStatus {
        if payload == 0 {
            self.trace.borrow_mut().push("N");
            if !self.bumped {
                self.bumped = true;
                let bumped_min = context.lower_bound(self.var) + 1;
                context.set_min(self.var, bumped_min)?;
            }
        } else {
            self.trace.borrow_mut().push("D");
        }
        Ok(())
    }
}

#[test]
fn normal_demons_run_to_quiescence_before_the_delayed_one() {
    let trace = Rc::new(RefCell::new(Vec::new()));
    let mut solver = Solver::new();
    let var = solver.new_int_var(0, 10);
    solver
        .add_constraint(PriorityProbe {
            var,
            trace: Rc::clone(&trace),
            bumped: false,
        })
        .expect("feasible");

    solver.set_min(var, 1).expect("non-empty");

    assert_eq!(*trace.borrow(), vec!["N", "N", "D"]);
}

#[test]
fn the_propagation_monitor_observes_every_mutation() {
    use peregrine_solver::engine::PropagationEvent;
    use peregrine_solver::engine::RecordingMonitor;

    let mut solver = Solver::new();
    let x = solver.new_int_var(0, 9);
    let y = solver.new_int_var(0, 9);

    let monitor = RecordingMonitor::default();
    let events = monitor.events();
    solver.set_propagation_monitor(Box::new(monitor));

    solver
        .add_constraint(LinearLessOrEqual::new(vec![(1, x), (1, y)], 3))
        .expect("feasible");

    let recorded = events.borrow();
    assert!(recorded
        .iter()
        .any(|event| matches!(event, PropagationEvent::BeginInitialPropagation { .. })));
    assert!(recorded
        .iter()
        .any(|event| matches!(event, PropagationEvent::SetMax { value: 3, .. })));
    assert!(recorded
        .iter()
        .any(|event| matches!(event, PropagationEvent::BeginDemonRun { .. })));
}

#[test]
fn propagation_reaches_a_true_fixpoint() {
    let mut solver = Solver::new();
    let x = solver.new_int_var(0, 9);
    let y = solver.new_int_var(0, 9);
    solver
        .add_constraint(LinearLessOrEqual::new(vec![(1, x), (1, y)], 5))
        .expect("feasible");

    let runs_after_build = solver.statistics().num_demon_runs;

    // Nothing changed, so nothing may run.
    solver.set_min(x, 0).expect("no-op");
    assert_eq!(solver.statistics().num_demon_runs, runs_after_build);
}
