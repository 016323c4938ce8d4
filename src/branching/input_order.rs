use super::Decision;
use super::DecisionBuilder;
use super::SelectionContext;
use crate::variables::IntVar;

/// Branches on the first unbound variable in the given order, trying its
/// smallest value first.
#[derive(Debug, Clone)]
pub struct InputOrder {
    vars: Vec<IntVar>,
}

impl InputOrder {
    pub fn new(vars: Vec<IntVar>) -> Self {
        InputOrder { vars }
    }
}

impl DecisionBuilder for InputOrder {
    fn next_decision(&mut self, context: &SelectionContext<'_>) -> Option<Decision> {
        self.vars
            .iter()
            .find(|&&var| !context.is_bound(var))
            .map(|&var| Decision::assign(var, context.lower_bound(var)))
    }
}
