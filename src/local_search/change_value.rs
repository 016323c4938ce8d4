use super::IntVarLocalSearchOperator;
use super::LocalSearchOperator;
use crate::assignment::Assignment;
use crate::variables::IntVar;

/// An operator whose neighbors each change the value of exactly one
/// variable, as computed by the modifier from the index and current value.
pub struct ChangeValue {
    state: IntVarLocalSearchOperator,
    modify: Box<dyn FnMut(usize, i64) -> i64>,
    index: usize,
}

impl ChangeValue {
    pub fn new(vars: Vec<IntVar>, modify: Box<dyn FnMut(usize, i64) -> i64>) -> Self {
        ChangeValue {
            state: IntVarLocalSearchOperator::new(vars),
            modify,
            index: 0,
        }
    }

    /// The neighborhood that increments each variable by one.
    pub fn increment(vars: Vec<IntVar>) -> Self {
        Self::new(vars, Box::new(|_, value| value + 1))
    }
}

impl LocalSearchOperator for ChangeValue {
    fn start(&mut self, assignment: &Assignment) {
        self.state.start(assignment);
        self.index = 0;
    }

    fn make_next_neighbor(&mut self, delta: &mut Assignment, deltadelta: &mut Assignment) -> bool {
        while self.index < self.state.size() {
            self.state.revert_changes(false);
            let index = self.index;
            self.index += 1;
            let value = (self.modify)(index, self.state.value(index));
            self.state.set_value(index, value);
            if self.state.apply_changes(delta, deltadelta) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;

    #[test]
    fn each_neighbor_changes_one_variable() {
        let vars = (0..3).map(IntVar::create_from_index).collect::<Vec<_>>();
        let mut assignment = Assignment::default();
        for (position, &var) in vars.iter().enumerate() {
            assignment.set_value(var, position as i64);
        }

        let mut operator = ChangeValue::increment(vars.clone());
        operator.start(&assignment);

        let mut delta = Assignment::default();
        let mut deltadelta = Assignment::default();
        for expected in 0..3 {
            assert!(operator.make_next_neighbor(&mut delta, &mut deltadelta));
            assert_eq!(delta.num_int_elements(), 1);
            assert_eq!(delta.value(vars[expected]), expected as i64 + 1);
        }
        assert!(!operator.make_next_neighbor(&mut delta, &mut deltadelta));
    }
}
