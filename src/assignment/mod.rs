//! Assignments: snapshots of variable values.
//!
//! An assignment maps a subset of the solver's variables to values. A full
//! assignment is a solution; a *delta* assignment holds only the changes a
//! local-search move proposes against a base, with deactivated entries
//! marking variables the move relaxes instead of fixing.

pub mod io;

use fnv::FnvHashMap;

use crate::peregrine_assert_simple;
use crate::variables::IntervalVar;
use crate::variables::IntVar;
use crate::variables::SequenceVar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntElement {
    pub var: IntVar,
    pub value: i64,
    pub activated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalElement {
    pub var: IntervalVar,
    pub start: i64,
    pub duration: i64,
    pub performed: bool,
    pub activated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceElement {
    pub var: SequenceVar,
    /// Interval indices ranked from the front, in order.
    pub forward: Vec<u32>,
    /// Interval indices ranked from the back, in order.
    pub backward: Vec<u32>,
    /// Interval indices left unperformed.
    pub unperformed: Vec<u32>,
    pub activated: bool,
}

/// A typed snapshot of variable values with O(1) per-variable lookup.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    int_elements: Vec<IntElement>,
    int_index: FnvHashMap<IntVar, usize>,
    interval_elements: Vec<IntervalElement>,
    interval_index: FnvHashMap<IntervalVar, usize>,
    sequence_elements: Vec<SequenceElement>,
    sequence_index: FnvHashMap<SequenceVar, usize>,
}

impl PartialEq for Assignment {
    fn eq(&self, other: &Self) -> bool {
        self.int_elements == other.int_elements
            && self.interval_elements == other.interval_elements
            && self.sequence_elements == other.sequence_elements
    }
}

impl Assignment {
    pub fn is_empty(&self) -> bool {
        self.int_elements.is_empty()
            && self.interval_elements.is_empty()
            && self.sequence_elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.int_elements.clear();
        self.int_index.clear();
        self.interval_elements.clear();
        self.interval_index.clear();
        self.sequence_elements.clear();
        self.sequence_index.clear();
    }

    pub fn copy_from(&mut self, other: &Assignment) {
        self.clone_from(other);
    }
}

// integer elements
impl Assignment {
    /// Record `var = value`, overwriting an existing entry.
    pub fn set_value(&mut self, var: IntVar, value: i64) {
        match self.int_index.get(&var) {
            Some(&position) => {
                self.int_elements[position].value = value;
                self.int_elements[position].activated = true;
            }
            None => {
                let _ = self.int_index.insert(var, self.int_elements.len());
                self.int_elements.push(IntElement {
                    var,
                    value,
                    activated: true,
                });
            }
        }
    }

    pub fn has_var(&self, var: IntVar) -> bool {
        self.int_index.contains_key(&var)
    }

    pub fn value(&self, var: IntVar) -> i64 {
        peregrine_assert_simple!(self.has_var(var), "variable not in assignment");
        self.int_elements[self.int_index[&var]].value
    }

    pub fn activated(&self, var: IntVar) -> bool {
        peregrine_assert_simple!(self.has_var(var), "variable not in assignment");
        self.int_elements[self.int_index[&var]].activated
    }

    pub fn activate(&mut self, var: IntVar) {
        let position = self.int_index[&var];
        self.int_elements[position].activated = true;
    }

    /// Mark `var` as relaxed: a delta containing a deactivated entry frees
    /// the variable instead of fixing it.
    pub fn deactivate(&mut self, var: IntVar) {
        match self.int_index.get(&var) {
            Some(&position) => self.int_elements[position].activated = false,
            None => {
                let _ = self.int_index.insert(var, self.int_elements.len());
                self.int_elements.push(IntElement {
                    var,
                    value: 0,
                    activated: false,
                });
            }
        }
    }

    pub fn int_elements(&self) -> &[IntElement] {
        &self.int_elements
    }

    pub fn num_int_elements(&self) -> usize {
        self.int_elements.len()
    }
}

// interval elements
impl Assignment {
    pub fn set_interval(&mut self, var: IntervalVar, start: i64, duration: i64, performed: bool) {
        let element = IntervalElement {
            var,
            start,
            duration,
            performed,
            activated: true,
        };
        match self.interval_index.get(&var) {
            Some(&position) => self.interval_elements[position] = element,
            None => {
                let _ = self.interval_index.insert(var, self.interval_elements.len());
                self.interval_elements.push(element);
            }
        }
    }

    pub fn has_interval(&self, var: IntervalVar) -> bool {
        self.interval_index.contains_key(&var)
    }

    pub fn interval(&self, var: IntervalVar) -> &IntervalElement {
        peregrine_assert_simple!(self.has_interval(var), "interval not in assignment");
        &self.interval_elements[self.interval_index[&var]]
    }

    pub fn interval_elements(&self) -> &[IntervalElement] {
        &self.interval_elements
    }
}

// sequence elements
impl Assignment {
    pub fn set_sequence(
        &mut self,
        var: SequenceVar,
        forward: Vec<u32>,
        backward: Vec<u32>,
        unperformed: Vec<u32>,
    ) {
        let element = SequenceElement {
            var,
            forward,
            backward,
            unperformed,
            activated: true,
        };
        match self.sequence_index.get(&var) {
            Some(&position) => self.sequence_elements[position] = element,
            None => {
                let _ = self.sequence_index.insert(var, self.sequence_elements.len());
                self.sequence_elements.push(element);
            }
        }
    }

    pub fn has_sequence(&self, var: SequenceVar) -> bool {
        self.sequence_index.contains_key(&var)
    }

    pub fn sequence(&self, var: SequenceVar) -> &SequenceElement {
        peregrine_assert_simple!(self.has_sequence(var), "sequence not in assignment");
        &self.sequence_elements[self.sequence_index[&var]]
    }

    pub fn sequence_elements(&self) -> &[SequenceElement] {
        &self.sequence_elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;

    #[test]
    fn values_overwrite_and_reactivate() {
        let mut assignment = Assignment::default();
        let var = IntVar::create_from_index(3);

        assignment.set_value(var, 7);
        assert_eq!(assignment.value(var), 7);
        assert!(assignment.activated(var));

        assignment.deactivate(var);
        assert!(!assignment.activated(var));

        assignment.set_value(var, 9);
        assert_eq!(assignment.value(var), 9);
        assert!(assignment.activated(var));
        assert_eq!(assignment.num_int_elements(), 1);
    }

    #[test]
    fn deactivating_an_unknown_variable_creates_a_relaxed_entry() {
        let mut assignment = Assignment::default();
        let var = IntVar::create_from_index(0);

        assignment.deactivate(var);

        assert!(assignment.has_var(var));
        assert!(!assignment.activated(var));
    }

    #[test]
    fn comparison_ignores_index_internals() {
        let a_var = IntVar::create_from_index(0);
        let b_var = IntVar::create_from_index(1);

        let mut left = Assignment::default();
        left.set_value(a_var, 1);
        left.set_value(b_var, 2);

        let mut right = Assignment::default();
        right.set_value(a_var, 1);
        right.set_value(b_var, 2);

        assert_eq!(left, right);

        right.set_value(b_var, 3);
        assert_ne!(left, right);
    }
}
