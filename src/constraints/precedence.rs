use crate::basic_types::PropagationStatus;
use crate::engine::DemonPriority;
use crate::engine::PostContext;
use crate::engine::PropagationContextMut;
use crate::engine::Constraint;
use crate::variables::IntervalVar;

/// `after.start >= before.end + delay`, skipped while either interval may
/// still be unperformed.
pub struct StartsAfterEnd {
    before: IntervalVar,
    after: IntervalVar,
    delay: i64,
}

impl StartsAfterEnd {
    pub fn new(before: IntervalVar, after: IntervalVar) -> Self {
        Self::with_delay(before, after, 0)
    }

    pub fn with_delay(before: IntervalVar, after: IntervalVar, delay: i64) -> Self {
        StartsAfterEnd {
            before,
            after,
            delay,
        }
    }
}

impl Constraint for StartsAfterEnd {
    fn name(&self) -> &str {
        "StartsAfterEnd"
    }

    fn post(&mut self, context: &mut PostContext<'_>) {
        let demon = context.new_demon(DemonPriority::Normal, 0);
        context.watch_interval(self.before, demon);
        context.watch_interval(self.after, demon);
    }

    fn initial_propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        if !context.must_be_performed(self.before) || !context.may_be_performed(self.after) {
            return Ok(());
        }
        context.set_start_min(self.after, context.end_min(self.before) + self.delay)?;
        if context.must_be_performed(self.after) {
            context.set_end_max(self.before, context.start_max(self.after) - self.delay)?;
        }
        Ok(())
    }
}
