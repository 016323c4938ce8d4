//! Persisting solutions and loading them back.

use peregrine_solver::assignment::io::read_assignment;
use peregrine_solver::assignment::io::write_assignment;
use peregrine_solver::branching::InputOrder;
use peregrine_solver::constraints::LinearLessOrEqual;
use peregrine_solver::SearchStatus;
use peregrine_solver::Solver;

#[test]
fn a_solved_assignment_survives_the_disk_format() {
    let mut solver = Solver::new();
    let x = solver.new_int_var(0, 9);
    let y = solver.new_int_var(0, 9);
    solver
        .add_constraint(LinearLessOrEqual::new(vec![(2, x), (3, y)], 12))
        .expect("feasible");

    let result = solver.solve(InputOrder::new(vec![x, y]), vec![]);
    assert_eq!(result.status, SearchStatus::Feasible);
    let solution = result.assignment.expect("a solution");

    let mut buffer = Vec::new();
    write_assignment(&mut buffer, &solution).expect("write to memory");
    let restored = read_assignment(&mut buffer.as_slice()).expect("read back");

    assert_eq!(solution, restored);
    assert!(solver.check_assignment(&restored));
}
