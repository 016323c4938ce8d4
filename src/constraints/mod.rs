//! Concrete constraints.
//!
//! The catalogue is intentionally small: the engine needs channeling
//! between expressions and their shadow variables, linear inequalities for
//! objectives and capacities, and disequality for pairwise separation.
//! Further constraints implement [`Constraint`](crate::engine::Constraint)
//! the same way these do.

mod linear_less_or_equal;
mod link_expr_var;
mod not_equal;
mod precedence;

pub use linear_less_or_equal::LinearLessOrEqual;
pub use link_expr_var::LinkExprVar;
pub use not_equal::NotEqual;
pub use precedence::StartsAfterEnd;
