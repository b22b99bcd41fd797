use std::{cmp::Ordering, fmt};

/// Binary set operators.
///
/// All three require both operands to share exactly the same schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    /// Union (`|`)
    Union,
    /// Intersection (`&`)
    Intersect,
    /// Difference (`\`)
    Difference,
}

impl SetOp {
    /// Operation name as used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            SetOp::Union => "Union",
            SetOp::Intersect => "Intersection",
            SetOp::Difference => "Difference",
        }
    }
}

impl fmt::Display for SetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comparison operators usable in a selection condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// Equal (`=`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
}

impl Comparator {
    /// Whether a comparison outcome satisfies this comparator.
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Comparator::Equal => ordering.is_eq(),
            Comparator::NotEqual => ordering.is_ne(),
            Comparator::LessThan => ordering.is_lt(),
            Comparator::LessEqual => ordering.is_le(),
            Comparator::GreaterThan => ordering.is_gt(),
            Comparator::GreaterEqual => ordering.is_ge(),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Equal => "=",
            Comparator::NotEqual => "!=",
            Comparator::LessThan => "<",
            Comparator::LessEqual => "<=",
            Comparator::GreaterThan => ">",
            Comparator::GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
