//! Decisions and decision builders.
//!
//! A decision is a literal `var ⋈ value` with a left (apply) and right
//! (refute) branch; a [`DecisionBuilder`] produces the next decision for
//! the search engine, or `None` once every variable it cares about is
//! fixed.

mod decision;
mod first_fail;
mod input_order;

pub use decision::Decision;
pub use decision::Relation;
pub use first_fail::FirstFail;
pub use input_order::InputOrder;

use crate::engine::domains::Domains;
use crate::variables::IntVar;

/// The read-only view of the domains a decision builder selects from.
pub struct SelectionContext<'a> {
    domains: &'a Domains,
}

impl<'a> SelectionContext<'a> {
    pub(crate) fn new(domains: &'a Domains) -> Self {
        SelectionContext { domains }
    }

    pub fn lower_bound(&self, var: IntVar) -> i64 {
        self.domains.lower_bound(var)
    }

    pub fn upper_bound(&self, var: IntVar) -> i64 {
        self.domains.upper_bound(var)
    }

    pub fn is_bound(&self, var: IntVar) -> bool {
        self.domains.is_assigned(var)
    }

    pub fn size(&self, var: IntVar) -> i64 {
        self.domains.size(var)
    }

    pub fn contains(&self, var: IntVar, value: i64) -> bool {
        self.domains.contains(var, value)
    }
}

/// Produces the decisions that drive the depth-first search.
pub trait DecisionBuilder {
    /// The next decision to branch on, or `None` when this builder
    /// considers the current state a solution.
    fn next_decision(&mut self, context: &SelectionContext<'_>) -> Option<Decision>;
}

impl<F> DecisionBuilder for F
where
    F: FnMut(&SelectionContext<'_>) -> Option<Decision>,
{
    fn next_decision(&mut self, context: &SelectionContext<'_>) -> Option<Decision> {
        self(context)
    }
}
