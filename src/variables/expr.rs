use crate::basic_types::PropagationStatus;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::engine::contexts::PropagationContextMut;
use crate::engine::domains::Domains;
use crate::peregrine_assert_simple;
use crate::variables::IntVar;

/// Key of an expression in the solver's expression store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId {
    id: u32,
}

impl StorageKey for ExprId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        ExprId { id: index as u32 }
    }
}

/// A stateless integer expression: bounds are recomputed from the operands
/// on every query, and bound requests propagate into the operands.
///
/// Expressions are range-only and not monotonic the way variables are; code
/// that needs a stateful, monotonic view casts the expression to a shadow
/// variable through the solver.
pub(crate) trait IntExpr {
    fn min(&self, domains: &Domains) -> i64;

    fn max(&self, domains: &Domains) -> i64;

    fn set_min(&self, context: &mut PropagationContextMut<'_>, value: i64) -> PropagationStatus;

    fn set_max(&self, context: &mut PropagationContextMut<'_>, value: i64) -> PropagationStatus;

    /// The variables this expression is computed from, for demon
    /// registration when the expression is channeled to a variable.
    fn operands(&self) -> &[IntVar];
}

#[derive(Default)]
pub(crate) struct ExprStore {
    exprs: KeyedVec<ExprId, Box<dyn IntExpr>>,
}

impl ExprStore {
    pub(crate) fn alloc(&mut self, expr: Box<dyn IntExpr>) -> ExprId {
        self.exprs.push(expr)
    }

    pub(crate) fn get(&self, expr: ExprId) -> &dyn IntExpr {
        self.exprs[expr].as_ref()
    }
}

impl std::fmt::Debug for ExprStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExprStore")
            .field("num_exprs", &self.exprs.len())
            .finish()
    }
}

pub(crate) fn div_floor(a: i64, b: i64) -> i64 {
    let quotient = a / b;
    let remainder = a % b;
    if remainder != 0 && ((remainder < 0) != (b < 0)) {
        quotient - 1
    } else {
        quotient
    }
}

pub(crate) fn div_ceil(a: i64, b: i64) -> i64 {
    let quotient = a / b;
    let remainder = a % b;
    if remainder != 0 && ((remainder < 0) == (b < 0)) {
        quotient + 1
    } else {
        quotient
    }
}

/// `a + b`.
pub(crate) struct PlusExpr {
    operands: [IntVar; 2],
}

impl PlusExpr {
    pub(crate) fn new(a: IntVar, b: IntVar) -> Self {
        PlusExpr { operands: [a, b] }
    }
}

impl IntExpr for PlusExpr {
    fn min(&self, domains: &Domains) -> i64 {
        domains.lower_bound(self.operands[0]) + domains.lower_bound(self.operands[1])
    }

    fn max(&self, domains: &Domains) -> i64 {
        domains.upper_bound(self.operands[0]) + domains.upper_bound(self.operands[1])
    }

    fn set_min(&self, context: &mut PropagationContextMut<'_>, value: i64) -> PropagationStatus {
        let [a, b] = self.operands;
        context.set_min(a, value - context.upper_bound(b))?;
        context.set_min(b, value - context.upper_bound(a))?;
        Ok(())
    }

    fn set_max(&self, context: &mut PropagationContextMut<'_>, value: i64) -> PropagationStatus {
        let [a, b] = self.operands;
        context.set_max(a, value - context.lower_bound(b))?;
        context.set_max(b, value - context.lower_bound(a))?;
        Ok(())
    }

    fn operands(&self) -> &[IntVar] {
        &self.operands
    }
}

/// `Σ vars`.
pub(crate) struct SumExpr {
    operands: Vec<IntVar>,
}

impl SumExpr {
    pub(crate) fn new(operands: Vec<IntVar>) -> Self {
        SumExpr { operands }
    }
}

impl IntExpr for SumExpr {
    fn min(&self, domains: &Domains) -> i64 {
        self.operands
            .iter()
            .map(|&var| domains.lower_bound(var))
            .sum()
    }

    fn max(&self, domains: &Domains) -> i64 {
        self.operands
            .iter()
            .map(|&var| domains.upper_bound(var))
            .sum()
    }

    fn set_min(&self, context: &mut PropagationContextMut<'_>, value: i64) -> PropagationStatus {
        let max_sum: i64 = self
            .operands
            .iter()
            .map(|&var| context.upper_bound(var))
            .sum();
        for &var in &self.operands {
            let others = max_sum - context.upper_bound(var);
            context.set_min(var, value - others)?;
        }
        Ok(())
    }

    fn set_max(&self, context: &mut PropagationContextMut<'_>, value: i64) -> PropagationStatus {
        let min_sum: i64 = self
            .operands
            .iter()
            .map(|&var| context.lower_bound(var))
            .sum();
        for &var in &self.operands {
            let others = min_sum - context.lower_bound(var);
            context.set_max(var, value - others)?;
        }
        Ok(())
    }

    fn operands(&self) -> &[IntVar] {
        &self.operands
    }
}

/// `scale · var + offset` with a non-zero scale. A scale of -1 and offset
/// of 0 is the negation view.
pub(crate) struct AffineExpr {
    operands: [IntVar; 1],
    scale: i64,
    offset: i64,
}

impl AffineExpr {
    pub(crate) fn new(var: IntVar, scale: i64, offset: i64) -> Self {
        peregrine_assert_simple!(scale != 0);
        AffineExpr {
            operands: [var],
            scale,
            offset,
        }
    }

    fn map(&self, value: i64) -> i64 {
        self.scale * value + self.offset
    }
}

impl IntExpr for AffineExpr {
    fn min(&self, domains: &Domains) -> i64 {
        if self.scale < 0 {
            self.map(domains.upper_bound(self.operands[0]))
        } else {
            self.map(domains.lower_bound(self.operands[0]))
        }
    }

    fn max(&self, domains: &Domains) -> i64 {
        if self.scale < 0 {
            self.map(domains.lower_bound(self.operands[0]))
        } else {
            self.map(domains.upper_bound(self.operands[0]))
        }
    }

    fn set_min(&self, context: &mut PropagationContextMut<'_>, value: i64) -> PropagationStatus {
        let var = self.operands[0];
        if self.scale < 0 {
            context.set_max(var, div_floor(value - self.offset, self.scale))
        } else {
            context.set_min(var, div_ceil(value - self.offset, self.scale))
        }
    }

    fn set_max(&self, context: &mut PropagationContextMut<'_>, value: i64) -> PropagationStatus {
        let var = self.operands[0];
        if self.scale < 0 {
            context.set_min(var, div_ceil(value - self.offset, self.scale))
        } else {
            context.set_max(var, div_floor(value - self.offset, self.scale))
        }
    }

    fn operands(&self) -> &[IntVar] {
        &self.operands
    }
}
