use super::Decision;
use super::DecisionBuilder;
use super::SelectionContext;
use crate::variables::IntVar;

/// Branches on the unbound variable with the smallest domain, trying its
/// smallest value first. Ties break towards the variable listed first.
#[derive(Debug, Clone)]
pub struct FirstFail {
    vars: Vec<IntVar>,
}

impl FirstFail {
    pub fn new(vars: Vec<IntVar>) -> Self {
        FirstFail { vars }
    }
}

impl DecisionBuilder for FirstFail {
    fn next_decision(&mut self, context: &SelectionContext<'_>) -> Option<Decision> {
        self.vars
            .iter()
            .filter(|&&var| !context.is_bound(var))
            .min_by_key(|&&var| context.size(var))
            .map(|&var| Decision::assign(var, context.lower_bound(var)))
    }
}
