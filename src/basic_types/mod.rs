mod trail;

pub use trail::Trail;

/// Raised when a domain mutation would leave a variable with no admissible
/// values. Carries no payload; the propagation monitor is the observation
/// channel for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyDomain;

/// A propagation failure: either a domain became empty or a constraint
/// detected infeasibility on its own. Failures unwind to the nearest
/// enclosing search frame, which undoes the trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Failure;

impl From<EmptyDomain> for Failure {
    fn from(_: EmptyDomain) -> Self {
        Failure
    }
}

/// The result type of every propagation step.
pub type PropagationStatus = Result<(), Failure>;

/// The conclusion of a finished search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    /// At least one solution was found.
    Feasible,
    /// The search space was exhausted without finding a solution, or the
    /// model was already inconsistent when it was built.
    Infeasible,
    /// A search monitor stopped the search before it could conclude.
    LimitReached,
}
