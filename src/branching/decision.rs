use crate::variables::IntVar;

/// The relation a decision or no-good literal asserts between a variable
/// and a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Equal,
    NotEqual,
    LessOrEqual,
    GreaterOrEqual,
}

/// A search-tree split: applying the decision asserts `var relation value`,
/// refuting it asserts the negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decision {
    pub var: IntVar,
    pub relation: Relation,
    pub value: i64,
}

impl Decision {
    pub fn assign(var: IntVar, value: i64) -> Self {
        Decision {
            var,
            relation: Relation::Equal,
            value,
        }
    }

    pub fn less_or_equal(var: IntVar, value: i64) -> Self {
        Decision {
            var,
            relation: Relation::LessOrEqual,
            value,
        }
    }

    pub fn greater_or_equal(var: IntVar, value: i64) -> Self {
        Decision {
            var,
            relation: Relation::GreaterOrEqual,
            value,
        }
    }

    /// The refutation branch of this decision.
    pub fn negation(&self) -> Decision {
        let (relation, value) = match self.relation {
            Relation::Equal => (Relation::NotEqual, self.value),
            Relation::NotEqual => (Relation::Equal, self.value),
            Relation::LessOrEqual => (Relation::GreaterOrEqual, self.value + 1),
            Relation::GreaterOrEqual => (Relation::LessOrEqual, self.value - 1),
        };
        Decision {
            var: self.var,
            relation,
            value,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self.relation {
            Relation::Equal => "==",
            Relation::NotEqual => "!=",
            Relation::LessOrEqual => "<=",
            Relation::GreaterOrEqual => ">=",
        };
        write!(f, "{} {} {}", self.var, op, self.value)
    }
}

// A placeholder used by reversible containers of decisions; never a valid
// decision by itself.
impl Default for Decision {
    fn default() -> Self {
        Decision {
            var: crate::containers::StorageKey::create_from_index(u32::MAX as usize),
            relation: Relation::Equal,
            value: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;

    #[test]
    fn negation_flips_the_relation() {
        let var = IntVar::create_from_index(0);

        assert_eq!(
            Decision::assign(var, 3).negation(),
            Decision {
                var,
                relation: Relation::NotEqual,
                value: 3
            }
        );
        assert_eq!(
            Decision::less_or_equal(var, 3).negation(),
            Decision::greater_or_equal(var, 4)
        );
        assert_eq!(
            Decision::greater_or_equal(var, 3).negation(),
            Decision::less_or_equal(var, 2)
        );
    }

    #[test]
    fn double_negation_is_identity() {
        let var = IntVar::create_from_index(1);
        for decision in [
            Decision::assign(var, 5),
            Decision::less_or_equal(var, 5),
            Decision::greater_or_equal(var, 5),
        ] {
            assert_eq!(decision, decision.negation().negation());
        }
    }
}
