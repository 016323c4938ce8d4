//! The local-search driver against the propagation engine.

use peregrine_solver::assignment::Assignment;
use peregrine_solver::constraints::LinearLessOrEqual;
use peregrine_solver::local_search::BaseLns;
use peregrine_solver::local_search::ChangeValue;
use peregrine_solver::local_search::LocalSearch;
use peregrine_solver::local_search::ObjectiveSumFilter;
use peregrine_solver::local_search::OneVarFragments;
use peregrine_solver::local_search::Relocate;
use peregrine_solver::Solver;

#[test]
fn decrement_moves_drive_the_objective_to_its_minimum() {
    let mut solver = Solver::new();
    let vars: Vec<_> = (0..3).map(|_| solver.new_int_var(2, 10)).collect();
    let objective = {
        let sum = solver.sum(vars.clone());
        solver.expr_var(sum)
    };

    let mut base = Assignment::default();
    for &var in &vars {
        base.set_value(var, 10);
    }

    let mut local_search = LocalSearch::new();
    local_search.add_operator(Box::new(ChangeValue::new(
        vars.clone(),
        Box::new(|_, value| value - 1),
    )));
    local_search.add_filter(Box::new(ObjectiveSumFilter::new(
        vars.clone(),
        vec![2, 2, 2],
    )));

    let moves = local_search.optimize(&mut solver, &mut base, Some(objective));

    assert_eq!(moves, 24);
    assert!(vars.iter().all(|&var| base.value(var) == 2));
    assert!(solver.check_assignment(&base));
}

#[test]
fn lns_fragments_resolve_to_the_relaxed_optimum() {
    let mut solver = Solver::new();
    let vars: Vec<_> = (0..4).map(|_| solver.new_int_var(0, 10)).collect();
    let objective = {
        let sum = solver.sum(vars.clone());
        solver.expr_var(sum)
    };

    let mut base = Assignment::default();
    for &var in &vars {
        base.set_value(var, 10);
    }

    let mut local_search = LocalSearch::new();
    local_search.add_operator(Box::new(BaseLns::new(
        vars.clone(),
        Box::new(OneVarFragments::new()),
    )));

    let moves = local_search.optimize(&mut solver, &mut base, Some(objective));

    // Each variable is relaxed once and re-solved to its minimum.
    assert_eq!(moves, 4);
    assert!(vars.iter().all(|&var| base.value(var) == 0));
}

#[test]
fn infeasible_moves_are_silently_discarded() {
    let mut solver = Solver::new();
    let vars: Vec<_> = (0..2).map(|_| solver.new_int_var(0, 10)).collect();
    // The sum must stay at least 19, so only one decrement fits.
    solver
        .add_constraint(LinearLessOrEqual::new(vec![(-1, vars[0]), (-1, vars[1])], -19))
        .expect("feasible");
    let objective = {
        let sum = solver.sum(vars.clone());
        solver.expr_var(sum)
    };

    let mut base = Assignment::default();
    for &var in &vars {
        base.set_value(var, 10);
    }

    let mut local_search = LocalSearch::new();
    local_search.add_operator(Box::new(ChangeValue::new(
        vars.clone(),
        Box::new(|_, value| value - 1),
    )));

    let moves = local_search.optimize(&mut solver, &mut base, Some(objective));

    assert_eq!(moves, 1);
    assert_eq!(base.value(vars[0]) + base.value(vars[1]), 19);
    assert!(solver.check_assignment(&base));
}

#[test]
fn a_relocate_move_produces_a_different_feasible_path() {
    let mut solver = Solver::new();
    // next[i] for five nodes; a value of 5 is the end of the path.
    let nexts: Vec<_> = (0..5).map(|_| solver.new_int_var(0, 5)).collect();

    let mut base = Assignment::default();
    for (node, &var) in nexts.iter().enumerate() {
        base.set_value(var, node as i64 + 1);
    }
    let original = base.clone();

    let mut local_search = LocalSearch::new();
    local_search.add_operator(Box::new(Relocate::new(nexts.clone(), Vec::new(), 1)));

    // Without an objective, the first feasible neighbor is committed.
    let moves = local_search.optimize(&mut solver, &mut base, None);

    assert_eq!(moves, 1);
    assert_ne!(base, original);
    assert!(solver.check_assignment(&base));
}
