//! # Peregrine
//! Peregrine is a finite-domain constraint programming engine with local
//! search support for vehicle-routing style problems.
//!
//! The engine is built around three mechanisms:
//! * **Reversible state**: every in-search mutation is recorded on a
//!   trail, so backtracking restores the solver byte for byte
//!   ([`state`], [`containers`]).
//! * **Priority-scheduled propagation**: constraints attach demons to
//!   variable events; a two-tier queue drains them to a fixpoint
//!   ([`engine`], [`constraints`]).
//! * **Local search**: neighborhood operators diff assignments,
//!   filters reject hopeless moves early, and surviving candidates are
//!   validated by full propagation inside a scratch frame
//!   ([`local_search`]).
//!
//! # Solving a model
//!
//! Variables and constraints are created through the [`Solver`]:
//!
//! ```rust
//! use peregrine_solver::branching::InputOrder;
//! use peregrine_solver::constraints::LinearLessOrEqual;
//! use peregrine_solver::SearchStatus;
//! use peregrine_solver::Solver;
//!
//! let mut solver = Solver::new();
//! let x = solver.new_int_var(0, 9);
//! let y = solver.new_int_var(0, 9);
//!
//! solver
//!     .add_constraint(LinearLessOrEqual::new(vec![(1, x), (1, y)], 3))
//!     .expect("the model is feasible");
//!
//! let result = solver.solve(InputOrder::new(vec![x, y]), vec![]);
//! assert_eq!(result.status, SearchStatus::Feasible);
//!
//! let solution = result.assignment.expect("a solution was found");
//! assert!(solution.value(x) + solution.value(y) <= 3);
//! ```
//!
//! # Enumerating solutions
//!
//! The resumable interface steps from solution to solution:
//!
//! ```rust
//! use peregrine_solver::branching::InputOrder;
//! use peregrine_solver::constraints::NotEqual;
//! use peregrine_solver::Solver;
//!
//! let mut solver = Solver::new();
//! let x = solver.new_int_var(0, 1);
//! let y = solver.new_int_var(0, 1);
//! solver
//!     .add_constraint(NotEqual::new(x, y, 0))
//!     .expect("the model is feasible");
//!
//! solver.new_search(InputOrder::new(vec![x, y]), vec![]);
//! let mut num_solutions = 0;
//! while solver.next_solution() {
//!     num_solutions += 1;
//! }
//! let _ = solver.end_search();
//! assert_eq!(num_solutions, 2);
//! ```
//!
//! # Improving a solution with local search
//!
//! A solution becomes the base assignment of a [`local_search::LocalSearch`]
//! run; operators propose deltas and the engine validates them:
//!
//! ```rust
//! use peregrine_solver::assignment::Assignment;
//! use peregrine_solver::local_search::ChangeValue;
//! use peregrine_solver::local_search::LocalSearch;
//! use peregrine_solver::Solver;
//!
//! let mut solver = Solver::new();
//! let vars: Vec<_> = (0..4).map(|_| solver.new_int_var(0, 10)).collect();
//! let objective = {
//!     let sum = solver.sum(vars.clone());
//!     solver.expr_var(sum)
//! };
//!
//! // Start from every variable at 10.
//! let mut base = Assignment::default();
//! for &var in &vars {
//!     base.set_value(var, 10);
//! }
//!
//! let mut local_search = LocalSearch::new();
//! local_search.add_operator(Box::new(ChangeValue::new(
//!     vars.clone(),
//!     Box::new(|_, value| value - 1),
//! )));
//!
//! let moves = local_search.optimize(&mut solver, &mut base, Some(objective));
//! assert!(moves > 0);
//! assert!(vars.iter().all(|&var| base.value(var) < 10));
//! ```

pub mod asserts;
pub mod assignment;
pub mod basic_types;
pub mod branching;
pub mod constraints;
pub mod containers;
pub mod engine;
pub mod local_search;
pub mod search;
pub mod state;
pub mod statistics;
pub mod variables;

mod solver;

pub use basic_types::SearchStatus;
pub use solver::ModelError;
pub use solver::SolveResult;
pub use solver::Solver;
