use fnv::FnvHashSet;

use super::domain_events::DomainEvent;
use super::event_sink::EventSink;
use crate::basic_types::EmptyDomain;
use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::peregrine_assert_moderate;
use crate::peregrine_assert_simple;
use crate::variables::IntVar;

/// One undone step of a domain: the bounds before the mutation, and the
/// removed inner value if the mutation punched a hole.
#[derive(Debug, Clone, Copy)]
struct DomainChange {
    var: IntVar,
    old_lower_bound: i64,
    old_upper_bound: i64,
    removed_value: Option<i64>,
}

/// The store of integer domains.
///
/// A domain is a pair of bounds plus a set of holes strictly inside them;
/// the bounds are always admissible values. Every mutation either narrows
/// the domain (recording an undo step and raising events) or fails with
/// [`EmptyDomain`] leaving the domain untouched.
#[derive(Debug, Default)]
pub(crate) struct Domains {
    trail: Trail<DomainChange>,
    domains: KeyedVec<IntVar, Domain>,
    pub(crate) events: EventSink,
}

#[derive(Debug)]
struct Domain {
    lower_bound: i64,
    upper_bound: i64,
    /// Removed values strictly inside the current bounds. May temporarily
    /// keep values outside the bounds; those are cleaned up on backtrack.
    holes: FnvHashSet<i64>,
}

impl Domain {
    fn contains(&self, value: i64) -> bool {
        self.lower_bound <= value && value <= self.upper_bound && !self.holes.contains(&value)
    }
}

impl Domains {
    pub(crate) fn grow(&mut self, lower_bound: i64, upper_bound: i64) -> IntVar {
        peregrine_assert_simple!(lower_bound <= upper_bound, "cannot create an empty domain");

        self.events.grow();
        self.domains.push(Domain {
            lower_bound,
            upper_bound,
            holes: FnvHashSet::default(),
        })
    }

    pub(crate) fn num_domains(&self) -> usize {
        self.domains.len()
    }

    pub(crate) fn level(&self) -> usize {
        self.trail.level()
    }

    pub(crate) fn push_level(&mut self) {
        self.trail.push_level();
    }

    pub(crate) fn undo_to(&mut self, level: usize) {
        let domains = &mut self.domains;
        self.trail.undo_to(level).for_each(|change| {
            let domain = &mut domains[change.var];
            if let Some(value) = change.removed_value {
                let _ = domain.holes.remove(&value);
            }
            domain.lower_bound = change.old_lower_bound;
            domain.upper_bound = change.old_upper_bound;
        });
        self.events.clear();
    }
}

// inspection
impl Domains {
    pub(crate) fn lower_bound(&self, var: IntVar) -> i64 {
        self.domains[var].lower_bound
    }

    pub(crate) fn upper_bound(&self, var: IntVar) -> i64 {
        self.domains[var].upper_bound
    }

    pub(crate) fn contains(&self, var: IntVar, value: i64) -> bool {
        self.domains[var].contains(value)
    }

    pub(crate) fn is_assigned(&self, var: IntVar) -> bool {
        self.domains[var].lower_bound == self.domains[var].upper_bound
    }

    pub(crate) fn assigned_value(&self, var: IntVar) -> i64 {
        peregrine_assert_simple!(self.is_assigned(var));
        self.domains[var].lower_bound
    }

    /// The number of admissible values.
    pub(crate) fn size(&self, var: IntVar) -> i64 {
        let domain = &self.domains[var];
        let span = domain.upper_bound - domain.lower_bound + 1;
        let holes = domain
            .holes
            .iter()
            .filter(|&&value| domain.lower_bound < value && value < domain.upper_bound)
            .count() as i64;
        span - holes
    }

    pub(crate) fn iter_domain(&self, var: IntVar) -> impl Iterator<Item = i64> + '_ {
        let domain = &self.domains[var];
        (domain.lower_bound..=domain.upper_bound).filter(move |value| !domain.holes.contains(value))
    }
}

// mutation
impl Domains {
    pub(crate) fn set_min(&mut self, var: IntVar, value: i64) -> Result<(), EmptyDomain> {
        let domain = &self.domains[var];
        if value <= domain.lower_bound {
            return Ok(());
        }

        // Land the bound on an admissible value.
        let mut new_lower_bound = value;
        while new_lower_bound <= domain.upper_bound && domain.holes.contains(&new_lower_bound) {
            new_lower_bound += 1;
        }
        if new_lower_bound > domain.upper_bound {
            return Err(EmptyDomain);
        }

        self.record(var, None);
        let domain = &mut self.domains[var];
        domain.lower_bound = new_lower_bound;
        self.events.event_occurred(DomainEvent::LowerBound, var);
        self.fire_assign_if_bound(var);
        Ok(())
    }

    pub(crate) fn set_max(&mut self, var: IntVar, value: i64) -> Result<(), EmptyDomain> {
        let domain = &self.domains[var];
        if value >= domain.upper_bound {
            return Ok(());
        }

        let mut new_upper_bound = value;
        while new_upper_bound >= domain.lower_bound && domain.holes.contains(&new_upper_bound) {
            new_upper_bound -= 1;
        }
        if new_upper_bound < domain.lower_bound {
            return Err(EmptyDomain);
        }

        self.record(var, None);
        let domain = &mut self.domains[var];
        domain.upper_bound = new_upper_bound;
        self.events.event_occurred(DomainEvent::UpperBound, var);
        self.fire_assign_if_bound(var);
        Ok(())
    }

    pub(crate) fn set_value(&mut self, var: IntVar, value: i64) -> Result<(), EmptyDomain> {
        if !self.domains[var].contains(value) {
            return Err(EmptyDomain);
        }
        if self.is_assigned(var) {
            return Ok(());
        }

        self.record(var, None);
        let domain = &mut self.domains[var];
        if domain.lower_bound < value {
            domain.lower_bound = value;
            self.events.event_occurred(DomainEvent::LowerBound, var);
        }
        let domain = &mut self.domains[var];
        if domain.upper_bound > value {
            domain.upper_bound = value;
            self.events.event_occurred(DomainEvent::UpperBound, var);
        }
        self.events.event_occurred(DomainEvent::Assign, var);
        Ok(())
    }

    pub(crate) fn remove_value(&mut self, var: IntVar, value: i64) -> Result<(), EmptyDomain> {
        let domain = &self.domains[var];
        if !domain.contains(value) {
            return Ok(());
        }
        if domain.lower_bound == domain.upper_bound {
            // Removing the only value.
            return Err(EmptyDomain);
        }

        if value == domain.lower_bound {
            // The upper bound is admissible, so a new lower bound exists.
            let mut new_lower_bound = value + 1;
            while domain.holes.contains(&new_lower_bound) {
                new_lower_bound += 1;
            }
            peregrine_assert_moderate!(new_lower_bound <= domain.upper_bound);

            self.record(var, None);
            self.domains[var].lower_bound = new_lower_bound;
            self.events.event_occurred(DomainEvent::Removal, var);
            self.events.event_occurred(DomainEvent::LowerBound, var);
            self.fire_assign_if_bound(var);
        } else if value == domain.upper_bound {
            let mut new_upper_bound = value - 1;
            while domain.holes.contains(&new_upper_bound) {
                new_upper_bound -= 1;
            }
            peregrine_assert_moderate!(new_upper_bound >= domain.lower_bound);

            self.record(var, None);
            self.domains[var].upper_bound = new_upper_bound;
            self.events.event_occurred(DomainEvent::Removal, var);
            self.events.event_occurred(DomainEvent::UpperBound, var);
            self.fire_assign_if_bound(var);
        } else {
            self.record(var, Some(value));
            let _ = self.domains[var].holes.insert(value);
            self.events.event_occurred(DomainEvent::Removal, var);
        }
        Ok(())
    }

    /// Remove every value in `lower..=upper` from the domain.
    pub(crate) fn remove_interval(
        &mut self,
        var: IntVar,
        lower: i64,
        upper: i64,
    ) -> Result<(), EmptyDomain> {
        if lower > upper {
            return Ok(());
        }
        let domain = &self.domains[var];
        if lower <= domain.lower_bound && upper >= domain.upper_bound {
            return Err(EmptyDomain);
        }
        if lower <= domain.lower_bound {
            return self.set_min(var, upper + 1);
        }
        if upper >= domain.upper_bound {
            return self.set_max(var, lower - 1);
        }
        for value in lower..=upper {
            self.remove_value(var, value)?;
        }
        Ok(())
    }

    fn record(&mut self, var: IntVar, removed_value: Option<i64>) {
        let domain = &self.domains[var];
        self.trail.push(DomainChange {
            var,
            old_lower_bound: domain.lower_bound,
            old_upper_bound: domain.upper_bound,
            removed_value,
        });
    }

    fn fire_assign_if_bound(&mut self, var: IntVar) {
        if self.is_assigned(var) {
            self.events.event_occurred(DomainEvent::Assign, var);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(domains: &mut Domains) -> Vec<(DomainEvent, IntVar)> {
        domains.events.drain().collect()
    }

    #[test]
    fn narrowing_steps_fire_matching_events() {
        let mut domains = Domains::default();
        let var = domains.grow(0, 10);

        domains.set_min(var, 3).expect("non-empty");
        assert_eq!((3, 10), (domains.lower_bound(var), domains.upper_bound(var)));
        assert_eq!(vec![(DomainEvent::LowerBound, var)], drain(&mut domains));

        domains.set_max(var, 5).expect("non-empty");
        assert_eq!((3, 5), (domains.lower_bound(var), domains.upper_bound(var)));
        assert_eq!(vec![(DomainEvent::UpperBound, var)], drain(&mut domains));

        domains.remove_value(var, 4).expect("non-empty");
        assert!(!domains.contains(var, 4));
        assert_eq!(domains.size(var), 2);
        assert_eq!(vec![(DomainEvent::Removal, var)], drain(&mut domains));

        domains.set_value(var, 3).expect("non-empty");
        assert!(domains.is_assigned(var));
        assert_eq!(
            vec![(DomainEvent::UpperBound, var), (DomainEvent::Assign, var)],
            drain(&mut domains)
        );
    }

    #[test]
    fn backtracking_restores_the_exact_prior_domain() {
        let mut domains = Domains::default();
        let var = domains.grow(0, 10);

        domains.push_level();
        domains.set_min(var, 3).expect("non-empty");
        domains.set_max(var, 5).expect("non-empty");
        domains.remove_value(var, 4).expect("non-empty");
        domains.set_value(var, 3).expect("non-empty");

        domains.undo_to(0);

        assert_eq!((0, 10), (domains.lower_bound(var), domains.upper_bound(var)));
        assert_eq!(domains.size(var), 11);
        assert!(domains.contains(var, 4));
    }

    #[test]
    fn widening_requests_are_no_ops() {
        let mut domains = Domains::default();
        let var = domains.grow(3, 7);

        domains.set_min(var, 1).expect("no-op");
        domains.set_max(var, 9).expect("no-op");

        assert_eq!((3, 7), (domains.lower_bound(var), domains.upper_bound(var)));
        assert!(drain(&mut domains).is_empty());
    }

    #[test]
    fn crossing_bounds_fails_without_mutating() {
        let mut domains = Domains::default();
        let var = domains.grow(0, 5);

        assert_eq!(Err(EmptyDomain), domains.set_min(var, 6));
        assert_eq!(Err(EmptyDomain), domains.set_max(var, -1));
        assert_eq!((0, 5), (domains.lower_bound(var), domains.upper_bound(var)));
    }

    #[test]
    fn bounds_skip_over_holes() {
        let mut domains = Domains::default();
        let var = domains.grow(0, 10);

        domains.remove_value(var, 4).expect("non-empty");
        domains.remove_value(var, 5).expect("non-empty");
        domains.set_min(var, 4).expect("non-empty");

        assert_eq!(domains.lower_bound(var), 6);
    }

    #[test]
    fn removing_a_bound_value_advances_the_bound() {
        let mut domains = Domains::default();
        let var = domains.grow(0, 3);

        domains.remove_value(var, 1).expect("non-empty");
        domains.remove_value(var, 0).expect("non-empty");

        assert_eq!(domains.lower_bound(var), 2);
        assert_eq!(domains.size(var), 2);
    }

    #[test]
    fn removing_the_last_value_fails() {
        let mut domains = Domains::default();
        let var = domains.grow(5, 5);

        assert_eq!(Err(EmptyDomain), domains.remove_value(var, 5));
    }

    #[test]
    fn remove_interval_splits_and_trims() {
        let mut domains = Domains::default();
        let var = domains.grow(0, 10);

        domains.remove_interval(var, 3, 5).expect("non-empty");
        assert_eq!(domains.size(var), 8);
        assert!(!domains.contains(var, 4));

        domains.remove_interval(var, 8, 12).expect("non-empty");
        assert_eq!(domains.upper_bound(var), 7);

        assert_eq!(Err(EmptyDomain), domains.remove_interval(var, -5, 20));
    }
}
