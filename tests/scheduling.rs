//! Interval and sequence variables through the public interface.

use peregrine_solver::assignment::io::read_assignment;
use peregrine_solver::assignment::io::write_assignment;
use peregrine_solver::branching::InputOrder;
use peregrine_solver::constraints::StartsAfterEnd;
use peregrine_solver::SearchStatus;
use peregrine_solver::Solver;

#[test]
fn a_chain_of_precedences_pushes_starts_forward() {
    let mut solver = Solver::new();
    let first = solver.new_interval_var(0, 100, 4, 4, false);
    let second = solver.new_interval_var(0, 100, 6, 6, false);
    let third = solver.new_interval_var(0, 100, 2, 2, false);
    solver
        .add_constraint(StartsAfterEnd::new(first, second))
        .expect("feasible");
    solver
        .add_constraint(StartsAfterEnd::with_delay(second, third, 5))
        .expect("feasible");

    assert_eq!(solver.start_min(second), 4);
    assert_eq!(solver.start_min(third), 15);
    assert_eq!(solver.end_min(third), 17);
}

#[test]
fn an_overfull_horizon_is_infeasible_for_required_intervals() {
    let mut solver = Solver::new();
    let first = solver.new_interval_var(0, 3, 4, 4, false);
    let second = solver.new_interval_var(0, 3, 4, 4, false);

    let result = solver.add_constraint(StartsAfterEnd::new(first, second));

    assert!(result.is_err());
    assert!(solver.is_broken());
}

#[test]
fn sequences_and_intervals_round_trip_through_assignments() {
    let mut solver = Solver::new();
    let members: Vec<_> = (0..3)
        .map(|_| solver.new_interval_var(0, 50, 5, 5, true))
        .collect();
    let sequence = solver.new_sequence_var(members.clone());

    // Decide an order up front: 2 first, 0 last, 1 unperformed.
    {
        let assignment = {
            let mut template = solver.save_assignment();
            template.set_sequence(sequence, vec![2], vec![0], vec![1]);
            template.set_interval(members[1], 0, 5, false);
            template
        };
        assert!(solver.check_assignment(&assignment));

        let mut buffer = Vec::new();
        write_assignment(&mut buffer, &assignment).expect("write to memory");
        let restored = read_assignment(&mut buffer.as_slice()).expect("read back");
        assert_eq!(assignment, restored);
    }

    // The same ordering applied for real.
    let x = solver.new_int_var(0, 0);
    solver.restore_assignment(&{
        let mut ordering = peregrine_solver::assignment::Assignment::default();
        ordering.set_sequence(sequence, vec![2], vec![0], vec![1]);
        ordering
    })
    .expect("consistent ordering");

    assert_eq!(solver.ranked_first(sequence), vec![2]);
    assert_eq!(solver.ranked_last(sequence), vec![0]);
    assert!(!solver.may_be_performed(members[1]));
    assert!(solver.must_be_performed(members[2]));

    let result = solver.solve(InputOrder::new(vec![x]), vec![]);
    assert_eq!(result.status, SearchStatus::Feasible);
}
