use downcast_rs::impl_downcast;
use downcast_rs::Downcast;

use super::contexts::PostContext;
use super::contexts::PropagationContextMut;
use crate::basic_types::PropagationStatus;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;

/// Key of a constraint in the solver's constraint store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId {
    id: u32,
}

impl StorageKey for ConstraintId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        ConstraintId { id: index as u32 }
    }
}

impl std::fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.id)
    }
}

/// A constraint enforces a relation between variables by reacting to their
/// domain events.
///
/// [`Constraint::post`] interns demons and attaches them to variable
/// events; [`Constraint::initial_propagate`] enforces the constraint once
/// on the initial domains. Both run when the constraint is added, inside a
/// single scoped step: a failure there leaves the solver in a broken state.
///
/// During search, attached demons fire through [`Constraint::run_demon`]
/// with whatever payload they were interned with. The default
/// implementation re-runs the full initial propagation, which is always
/// sound; constraints with cheap incremental rules dispatch on the payload
/// instead.
pub trait Constraint: Downcast {
    /// The name of the constraint, used for tracing.
    fn name(&self) -> &str;

    /// Intern demons and attach them to the variables this constraint
    /// propagates on.
    fn post(&mut self, context: &mut PostContext<'_>);

    /// Enforce the constraint once on the current domains.
    fn initial_propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus;

    /// Run one attached demon.
    fn run_demon(
        &mut self,
        _payload: u64,
        context: &mut PropagationContextMut<'_>,
    ) -> PropagationStatus {
        self.initial_propagate(context)
    }
}

impl_downcast!(Constraint);

#[derive(Default)]
pub(crate) struct ConstraintStore {
    constraints: KeyedVec<ConstraintId, Box<dyn Constraint>>,
}

impl ConstraintStore {
    pub(crate) fn alloc(&mut self, constraint: Box<dyn Constraint>) -> ConstraintId {
        self.constraints.push(constraint)
    }

    pub(crate) fn len(&self) -> usize {
        self.constraints.len()
    }
}

impl std::ops::Index<ConstraintId> for ConstraintStore {
    type Output = Box<dyn Constraint>;

    fn index(&self, index: ConstraintId) -> &Self::Output {
        &self.constraints[index]
    }
}

impl std::ops::IndexMut<ConstraintId> for ConstraintStore {
    fn index_mut(&mut self, index: ConstraintId) -> &mut Self::Output {
        &mut self.constraints[index]
    }
}

impl std::fmt::Debug for ConstraintStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintStore")
            .field("num_constraints", &self.constraints.len())
            .finish()
    }
}
