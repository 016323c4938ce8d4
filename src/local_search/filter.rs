use fnv::FnvHashMap;

use crate::assignment::Assignment;
use crate::peregrine_assert_simple;
use crate::variables::IntVar;

/// Fast rejection of candidate moves.
///
/// A filter is synchronized with the base assignment after every accepted
/// move, and asked to accept or reject each candidate delta before the
/// engine validates it. Filters are conservative: a spurious `false` loses
/// a neighbor, but `true` must never contradict the filter's own
/// invariant.
pub trait LocalSearchFilter {
    /// Whether the filter's invariant can survive applying `delta` to the
    /// base.
    fn accept(&mut self, delta: &Assignment, deltadelta: &Assignment) -> bool;

    /// Called with the new base after every accepted move.
    fn synchronize(&mut self, assignment: &Assignment);

    fn is_incremental(&self) -> bool {
        false
    }
}

/// The bookkeeping core of filters over integer variables: tracked values
/// of the base assignment with a hashed variable-to-index lookup.
#[derive(Debug)]
pub struct IntVarLocalSearchFilter {
    vars: Vec<IntVar>,
    values: Vec<i64>,
    var_to_index: FnvHashMap<IntVar, usize>,
}

impl IntVarLocalSearchFilter {
    pub fn new(vars: Vec<IntVar>) -> Self {
        let var_to_index = vars
            .iter()
            .enumerate()
            .map(|(index, &var)| (var, index))
            .collect();
        let size = vars.len();
        IntVarLocalSearchFilter {
            vars,
            values: vec![0; size],
            var_to_index,
        }
    }

    pub fn size(&self) -> usize {
        self.vars.len()
    }

    pub fn var(&self, index: usize) -> IntVar {
        self.vars[index]
    }

    pub fn value(&self, index: usize) -> i64 {
        self.values[index]
    }

    pub fn find_index(&self, var: IntVar) -> Option<usize> {
        self.var_to_index.get(&var).copied()
    }

    pub fn synchronize(&mut self, assignment: &Assignment) {
        for (index, &var) in self.vars.iter().enumerate() {
            if assignment.has_var(var) {
                self.values[index] = assignment.value(var);
            }
        }
    }
}

/// Rejects moves that cannot lower the sum of the tracked variables.
///
/// Deltas that relax variables are bounded from below by the per-variable
/// minima supplied at construction, so the filter stays sound for
/// large-neighborhood moves.
pub struct ObjectiveSumFilter {
    state: IntVarLocalSearchFilter,
    minimums: Vec<i64>,
    current_sum: i64,
}

impl ObjectiveSumFilter {
    /// `minimums[i]` must bound the smallest value `vars[i]` can take.
    pub fn new(vars: Vec<IntVar>, minimums: Vec<i64>) -> Self {
        peregrine_assert_simple!(vars.len() == minimums.len());
        ObjectiveSumFilter {
            state: IntVarLocalSearchFilter::new(vars),
            minimums,
            current_sum: 0,
        }
    }
}

impl LocalSearchFilter for ObjectiveSumFilter {
    fn accept(&mut self, delta: &Assignment, _deltadelta: &Assignment) -> bool {
        let mut candidate_sum = self.current_sum;
        for element in delta.int_elements() {
            let Some(index) = self.state.find_index(element.var) else {
                continue;
            };
            let contribution = if element.activated {
                element.value
            } else {
                self.minimums[index]
            };
            candidate_sum += contribution - self.state.value(index);
        }
        candidate_sum < self.current_sum
    }

    fn synchronize(&mut self, assignment: &Assignment) {
        self.state.synchronize(assignment);
        self.current_sum = (0..self.state.size()).map(|index| self.state.value(index)).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;

    fn vars_and_base(values: &[i64]) -> (Vec<IntVar>, Assignment) {
        let vars = (0..values.len())
            .map(IntVar::create_from_index)
            .collect::<Vec<_>>();
        let mut base = Assignment::default();
        for (&var, &value) in vars.iter().zip(values) {
            base.set_value(var, value);
        }
        (vars, base)
    }

    #[test]
    fn worsening_moves_are_rejected() {
        let (vars, base) = vars_and_base(&[5, 5]);
        let mut filter = ObjectiveSumFilter::new(vars.clone(), vec![0, 0]);
        filter.synchronize(&base);

        let mut improving = Assignment::default();
        improving.set_value(vars[0], 3);
        assert!(filter.accept(&improving, &Assignment::default()));

        let mut worsening = Assignment::default();
        worsening.set_value(vars[0], 9);
        assert!(!filter.accept(&worsening, &Assignment::default()));
    }

    #[test]
    fn relaxed_variables_count_their_minimum() {
        let (vars, base) = vars_and_base(&[5, 5]);
        let mut filter = ObjectiveSumFilter::new(vars.clone(), vec![4, 4]);
        filter.synchronize(&base);

        let mut relaxing = Assignment::default();
        relaxing.deactivate(vars[0]);
        // The relaxed variable could drop to 4, so the move may improve.
        assert!(filter.accept(&relaxing, &Assignment::default()));

        let mut hopeless = ObjectiveSumFilter::new(vars.clone(), vec![5, 5]);
        hopeless.synchronize(&base);
        assert!(!hopeless.accept(&relaxing, &Assignment::default()));
    }

    #[test]
    fn untracked_variables_are_ignored() {
        let (vars, base) = vars_and_base(&[5]);
        let mut filter = ObjectiveSumFilter::new(vars, vec![0]);
        filter.synchronize(&base);

        let stranger = IntVar::create_from_index(99);
        let mut delta = Assignment::default();
        delta.set_value(stranger, 1_000);
        assert!(!filter.accept(&delta, &Assignment::default()));
    }
}
