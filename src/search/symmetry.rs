use crate::branching::Decision;
use crate::branching::Relation;
use crate::containers::RevFifo;
use crate::engine::domains::Domains;
use crate::state::TrailedValues;
use crate::variables::IntVar;

/// A symmetry breaker visits every applied decision and contributes the
/// symmetric image of that decision as literals. When the decision is
/// refuted and the recorded path images still hold, the images' negations
/// are enforced, pruning the symmetric subtree.
pub trait SymmetryBreaker {
    fn visit_decision(&mut self, decision: &Decision, context: &mut SymmetryContext);
}

/// Collects the literals a breaker contributes for one decision.
#[derive(Debug, Default)]
pub struct SymmetryContext {
    literals: Vec<Decision>,
}

impl SymmetryContext {
    pub fn add_equal(&mut self, var: IntVar, value: i64) {
        self.literals.push(Decision::assign(var, value));
    }

    pub fn add_less_or_equal(&mut self, var: IntVar, value: i64) {
        self.literals.push(Decision::less_or_equal(var, value));
    }

    pub fn add_greater_or_equal(&mut self, var: IntVar, value: i64) {
        self.literals.push(Decision::greater_or_equal(var, value));
    }
}

/// Tracks, per breaker, the symmetric images of the decisions on the
/// active branch. The images live in reversible FIFOs, so backtracking
/// discards them together with the decisions they mirror.
pub(crate) struct SymmetryManager {
    breakers: Vec<Box<dyn SymmetryBreaker>>,
    path_literals: Vec<RevFifo<Decision>>,
}

impl SymmetryManager {
    pub(crate) fn new() -> Self {
        SymmetryManager {
            breakers: Vec::new(),
            path_literals: Vec::new(),
        }
    }

    pub(crate) fn add_breaker(
        &mut self,
        trailed: &mut TrailedValues,
        breaker: Box<dyn SymmetryBreaker>,
    ) {
        self.breakers.push(breaker);
        self.path_literals.push(RevFifo::new(trailed));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }

    /// Visit an applied decision. Returns `(breaker, literal)` pairs to be
    /// remembered by the search frame, and records each literal on the
    /// breaker's reversible path.
    pub(crate) fn on_apply(
        &mut self,
        trailed: &mut TrailedValues,
        decision: &Decision,
    ) -> Vec<(usize, Decision)> {
        let mut collected = Vec::new();
        for (index, breaker) in self.breakers.iter_mut().enumerate() {
            let mut context = SymmetryContext::default();
            breaker.visit_decision(decision, &mut context);
            for literal in context.literals {
                self.path_literals[index].push(trailed, literal);
                collected.push((index, literal));
            }
        }
        collected
    }

    /// Whether every literal recorded on the breaker's path is entailed by
    /// the current domains. Only then is pruning on refutation sound.
    pub(crate) fn path_entailed(
        &self,
        trailed: &TrailedValues,
        domains: &Domains,
        breaker: usize,
    ) -> bool {
        self.path_literals[breaker]
            .iter(trailed)
            .all(|literal| is_entailed(domains, &literal))
    }
}

fn is_entailed(domains: &Domains, literal: &Decision) -> bool {
    match literal.relation {
        Relation::Equal => {
            domains.is_assigned(literal.var) && domains.assigned_value(literal.var) == literal.value
        }
        Relation::NotEqual => !domains.contains(literal.var, literal.value),
        Relation::LessOrEqual => domains.upper_bound(literal.var) <= literal.value,
        Relation::GreaterOrEqual => domains.lower_bound(literal.var) >= literal.value,
    }
}
