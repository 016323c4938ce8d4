//! Local search: neighborhood operators, filters, and the driver that
//! validates candidate moves against the propagation engine.
//!
//! Operators synthesize candidate *deltas* against a base
//! [`Assignment`](crate::assignment::Assignment); filters cheaply reject
//! hopeless deltas; surviving deltas are re-applied inside a trail-marked
//! frame that runs full propagation before a move is committed.

mod change_value;
mod driver;
mod filter;
mod lns;
mod operator;
mod path;

pub use change_value::ChangeValue;
pub use driver::LocalSearch;
pub use filter::IntVarLocalSearchFilter;
pub use filter::LocalSearchFilter;
pub use filter::ObjectiveSumFilter;
pub use lns::BaseLns;
pub use lns::FragmentSelector;
pub use lns::OneVarFragments;
pub use lns::RandomFragments;
pub use operator::IntVarLocalSearchOperator;
pub use operator::LocalSearchOperator;
pub use path::MakeActiveOperator;
pub use path::MakeChainInactiveOperator;
pub use path::PathOperator;
pub use path::Relocate;
pub use path::TwoOpt;
