use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use super::IntVarLocalSearchOperator;
use super::LocalSearchOperator;
use crate::assignment::Assignment;
use crate::peregrine_assert_simple;
use crate::variables::IntVar;

/// Chooses which variables to relax for large-neighborhood search. The
/// sequence of fragments is finite: `next_fragment` returns `false` when
/// it is exhausted.
pub trait FragmentSelector {
    fn init_fragments(&mut self, _num_vars: usize) {}

    /// Fill `fragment` with the indices to relax. Returning `false`
    /// terminates the neighborhood.
    fn next_fragment(&mut self, fragment: &mut Vec<usize>, num_vars: usize) -> bool;
}

/// The large-neighborhood operator: each fragment becomes one neighbor
/// whose delta deactivates the fragment's variables, leaving the remainder
/// fixed. The driver re-solves the relaxed variables when it validates the
/// move.
pub struct BaseLns {
    state: IntVarLocalSearchOperator,
    selector: Box<dyn FragmentSelector>,
    fragment: Vec<usize>,
}

impl BaseLns {
    pub fn new(vars: Vec<IntVar>, selector: Box<dyn FragmentSelector>) -> Self {
        BaseLns {
            state: IntVarLocalSearchOperator::new(vars),
            selector,
            fragment: Vec::new(),
        }
    }
}

impl LocalSearchOperator for BaseLns {
    fn start(&mut self, assignment: &Assignment) {
        self.state.start(assignment);
        self.selector.init_fragments(self.state.size());
    }

    fn make_next_neighbor(&mut self, delta: &mut Assignment, deltadelta: &mut Assignment) -> bool {
        loop {
            self.state.revert_changes(false);
            self.fragment.clear();
            if !self
                .selector
                .next_fragment(&mut self.fragment, self.state.size())
            {
                return false;
            }
            for &index in &self.fragment {
                peregrine_assert_simple!(index < self.state.size());
                self.state.deactivate(index);
            }
            if self.state.apply_changes(delta, deltadelta) {
                return true;
            }
        }
    }
}

/// Relaxes one variable at a time, in index order.
#[derive(Debug, Default)]
pub struct OneVarFragments {
    index: usize,
}

impl OneVarFragments {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FragmentSelector for OneVarFragments {
    fn init_fragments(&mut self, _num_vars: usize) {
        self.index = 0;
    }

    fn next_fragment(&mut self, fragment: &mut Vec<usize>, num_vars: usize) -> bool {
        if self.index < num_vars {
            fragment.push(self.index);
            self.index += 1;
            true
        } else {
            false
        }
    }
}

/// Relaxes a fixed number of randomly chosen variables per fragment, for a
/// fixed number of fragments. Seeded, so runs are reproducible.
#[derive(Debug)]
pub struct RandomFragments {
    rng: SmallRng,
    fragment_size: usize,
    num_fragments: usize,
    emitted: usize,
}

impl RandomFragments {
    pub fn new(seed: u64, fragment_size: usize, num_fragments: usize) -> Self {
        peregrine_assert_simple!(fragment_size >= 1);
        RandomFragments {
            rng: SmallRng::seed_from_u64(seed),
            fragment_size,
            num_fragments,
            emitted: 0,
        }
    }
}

impl FragmentSelector for RandomFragments {
    fn init_fragments(&mut self, _num_vars: usize) {
        self.emitted = 0;
    }

    fn next_fragment(&mut self, fragment: &mut Vec<usize>, num_vars: usize) -> bool {
        if self.emitted >= self.num_fragments || num_vars == 0 {
            return false;
        }
        self.emitted += 1;
        while fragment.len() < self.fragment_size.min(num_vars) {
            let candidate = self.rng.gen_range(0..num_vars);
            if !fragment.contains(&candidate) {
                fragment.push(candidate);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;

    #[test]
    fn one_var_fragments_relax_each_position_once() {
        let vars = (0..4).map(IntVar::create_from_index).collect::<Vec<_>>();
        let mut assignment = Assignment::default();
        for (position, &var) in vars.iter().enumerate() {
            assignment.set_value(var, (position as i64 + 1) * 10);
        }

        let mut operator = BaseLns::new(vars.clone(), Box::new(OneVarFragments::new()));
        operator.start(&assignment);

        let mut delta = Assignment::default();
        let mut deltadelta = Assignment::default();
        for position in 0..4 {
            assert!(operator.make_next_neighbor(&mut delta, &mut deltadelta));
            assert_eq!(delta.num_int_elements(), 1);
            assert!(delta.has_var(vars[position]));
            assert!(!delta.activated(vars[position]));
        }
        assert!(!operator.make_next_neighbor(&mut delta, &mut deltadelta));
    }

    #[test]
    fn random_fragments_have_the_requested_size() {
        let vars = (0..6).map(IntVar::create_from_index).collect::<Vec<_>>();
        let mut assignment = Assignment::default();
        for &var in &vars {
            assignment.set_value(var, 1);
        }

        let mut operator = BaseLns::new(vars, Box::new(RandomFragments::new(7, 2, 3)));
        operator.start(&assignment);

        let mut delta = Assignment::default();
        let mut deltadelta = Assignment::default();
        let mut count = 0;
        while operator.make_next_neighbor(&mut delta, &mut deltadelta) {
            assert_eq!(delta.num_int_elements(), 2);
            count += 1;
        }
        assert_eq!(count, 3);
    }
}
