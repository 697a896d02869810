//! Per-row operators that kernels are specialized over.
//!
//! Each operator is a zero-sized type, so a kernel instantiated with it
//! compiles down to a loop with the comparison inlined. Mixed integer/double
//! operands are widened inside the operator, once per type pair at
//! instantiation time rather than per row.

use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::types::DataType;

use super::column::VectorElement;
use super::evaluator::{ArithmeticOp, ComparisonOp, LogicalOp, Operator};

/// Ordering between two possibly different physical element types.
///
/// `None` means the values are unordered (a `NaN` is involved).
pub trait MixedOrd<Rhs: ?Sized> {
    /// Compares `self` with `other`.
    fn mixed_cmp(&self, other: &Rhs) -> Option<Ordering>;
}

impl MixedOrd<i64> for i64 {
    #[inline]
    fn mixed_cmp(&self, other: &i64) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl MixedOrd<f64> for f64 {
    #[inline]
    fn mixed_cmp(&self, other: &f64) -> Option<Ordering> {
        self.partial_cmp(other)
    }
}

#[allow(clippy::cast_precision_loss)]
impl MixedOrd<f64> for i64 {
    #[inline]
    fn mixed_cmp(&self, other: &f64) -> Option<Ordering> {
        (*self as f64).partial_cmp(other)
    }
}

#[allow(clippy::cast_precision_loss)]
impl MixedOrd<i64> for f64 {
    #[inline]
    fn mixed_cmp(&self, other: &i64) -> Option<Ordering> {
        self.partial_cmp(&(*other as f64))
    }
}

impl MixedOrd<Vec<u8>> for Vec<u8> {
    #[inline]
    fn mixed_cmp(&self, other: &Vec<u8>) -> Option<Ordering> {
        Some(self.as_slice().cmp(other.as_slice()))
    }
}

/// A boolean predicate over one left and one right operand.
pub trait Predicate<L, R>: Send + Sync + 'static {
    /// Operator symbol this predicate implements.
    const OP: Operator;

    /// Evaluates the predicate on two non-null operands.
    fn test(left: &L, right: &R) -> bool;
}

macro_rules! comparison_predicate {
    ($(#[$doc:meta])* $name:ident, $op:expr, |$ord:ident| $body:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl<L, R> Predicate<L, R> for $name
        where
            L: MixedOrd<R> + 'static,
            R: 'static,
        {
            const OP: Operator = Operator::Comparison($op);

            #[inline]
            fn test(left: &L, right: &R) -> bool {
                let $ord = left.mixed_cmp(right);
                $body
            }
        }
    };
}

comparison_predicate!(
    /// `left = right`.
    Equal, ComparisonOp::Eq, |ord| ord == Some(Ordering::Equal)
);
comparison_predicate!(
    /// `left <> right`; true for unordered operands.
    NotEqual, ComparisonOp::Neq, |ord| ord != Some(Ordering::Equal)
);
comparison_predicate!(
    /// `left < right`.
    Less, ComparisonOp::Lt, |ord| ord == Some(Ordering::Less)
);
comparison_predicate!(
    /// `left <= right`.
    LessEqual, ComparisonOp::Lte, |ord| matches!(ord, Some(Ordering::Less | Ordering::Equal))
);
comparison_predicate!(
    /// `left > right`.
    Greater, ComparisonOp::Gt, |ord| ord == Some(Ordering::Greater)
);
comparison_predicate!(
    /// `left >= right`.
    GreaterEqual, ComparisonOp::Gte, |ord| matches!(ord, Some(Ordering::Greater | Ordering::Equal))
);

/// Logical AND over boolean long columns (non-zero is true).
#[derive(Debug, Clone, Copy, Default)]
pub struct And;

impl Predicate<i64, i64> for And {
    const OP: Operator = Operator::Logical(LogicalOp::And);

    #[inline]
    fn test(left: &i64, right: &i64) -> bool {
        *left != 0 && *right != 0
    }
}

/// A value-producing operator over one left and one right operand.
pub trait BinaryOp<L, R>: Send + Sync + 'static {
    /// Element type of the output column.
    type Output: VectorElement;

    /// Operator symbol this operation implements.
    const OP: Operator;

    /// Logical type of the output column.
    const OUTPUT_TYPE: DataType;

    /// Computes the output for two non-null operands; `None` yields a null row.
    fn apply(left: &L, right: &R) -> Option<Self::Output>;
}

/// Numeric element types.
pub trait Numeric: VectorElement + Copy {
    /// Widens the value to a double.
    fn to_f64(self) -> f64;
}

impl Numeric for i64 {
    #[allow(clippy::cast_precision_loss)]
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Numeric for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

/// Result-type rules for `+`, `-` and `*` between two numeric operands.
///
/// Two longs stay long (wrapping on overflow); anything involving a double
/// becomes double.
pub trait NumericPair<R>: Numeric {
    /// Element type of the result.
    type Output: VectorElement;

    /// Logical type of the result.
    const OUTPUT_TYPE: DataType;

    /// `self + right`.
    fn add(self, right: R) -> Self::Output;
    /// `self - right`.
    fn sub(self, right: R) -> Self::Output;
    /// `self * right`.
    fn mul(self, right: R) -> Self::Output;
}

impl NumericPair<i64> for i64 {
    type Output = i64;
    const OUTPUT_TYPE: DataType = DataType::Int64;

    #[inline]
    fn add(self, right: i64) -> i64 {
        self.wrapping_add(right)
    }

    #[inline]
    fn sub(self, right: i64) -> i64 {
        self.wrapping_sub(right)
    }

    #[inline]
    fn mul(self, right: i64) -> i64 {
        self.wrapping_mul(right)
    }
}

macro_rules! double_pair {
    ($left:ty, $right:ty) => {
        impl NumericPair<$right> for $left {
            type Output = f64;
            const OUTPUT_TYPE: DataType = DataType::Float64;

            #[inline]
            fn add(self, right: $right) -> f64 {
                self.to_f64() + right.to_f64()
            }

            #[inline]
            fn sub(self, right: $right) -> f64 {
                self.to_f64() - right.to_f64()
            }

            #[inline]
            fn mul(self, right: $right) -> f64 {
                self.to_f64() * right.to_f64()
            }
        }
    };
}

double_pair!(i64, f64);
double_pair!(f64, i64);
double_pair!(f64, f64);

macro_rules! arithmetic_op {
    ($(#[$doc:meta])* $name:ident, $op:expr, $method:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl<L, R> BinaryOp<L, R> for $name
        where
            L: NumericPair<R>,
            R: Numeric,
        {
            type Output = <L as NumericPair<R>>::Output;
            const OP: Operator = Operator::Arithmetic($op);
            const OUTPUT_TYPE: DataType = <L as NumericPair<R>>::OUTPUT_TYPE;

            #[inline]
            fn apply(left: &L, right: &R) -> Option<Self::Output> {
                Some(<L as NumericPair<R>>::$method(*left, *right))
            }
        }
    };
}

arithmetic_op!(
    /// `left + right`.
    Add, ArithmeticOp::Add, add
);
arithmetic_op!(
    /// `left - right`.
    Subtract, ArithmeticOp::Sub, sub
);
arithmetic_op!(
    /// `left * right`.
    Multiply, ArithmeticOp::Mul, mul
);

/// `left / right` as a double; a zero divisor yields null.
#[derive(Debug, Clone, Copy, Default)]
pub struct Divide;

impl<L: Numeric, R: Numeric> BinaryOp<L, R> for Divide {
    type Output = f64;
    const OP: Operator = Operator::Arithmetic(ArithmeticOp::Div);
    const OUTPUT_TYPE: DataType = DataType::Float64;

    #[inline]
    fn apply(left: &L, right: &R) -> Option<f64> {
        let divisor = right.to_f64();
        if divisor == 0.0 {
            None
        } else {
            Some(left.to_f64() / divisor)
        }
    }
}

/// Materializes a predicate as a boolean long column (0 or 1).
#[derive(Debug, Clone, Copy, Default)]
pub struct Compare<P>(PhantomData<P>);

impl<L, R, P> BinaryOp<L, R> for Compare<P>
where
    L: 'static,
    R: 'static,
    P: Predicate<L, R>,
{
    type Output = i64;
    const OP: Operator = P::OP;
    const OUTPUT_TYPE: DataType = DataType::Bool;

    #[inline]
    fn apply(left: &L, right: &R) -> Option<i64> {
        Some(i64::from(P::test(left, right)))
    }
}
