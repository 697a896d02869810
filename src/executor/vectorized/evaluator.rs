//! Vectorized expression interface and operator symbols.

use std::fmt;

use crate::types::DataType;

use super::batch::VectorizedRowBatch;

/// A specialized, stateless evaluator for one operator over one operand-type
/// combination.
///
/// Filter expressions narrow the batch's live rows in place and produce no
/// column. Projection expressions write one pre-allocated output column for
/// the live rows and leave the selection untouched.
pub trait VectorExpression: fmt::Debug + Send + Sync {
    /// Evaluates this expression against the batch.
    ///
    /// # Panics
    ///
    /// Panics if a bound column is missing or holds the wrong physical type.
    fn evaluate(&self, batch: &mut VectorizedRowBatch);

    /// Returns the column written by this expression, or `None` for filters.
    fn output_column(&self) -> Option<usize>;

    /// Returns the logical type this expression produces.
    fn output_type(&self) -> DataType;
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// Equal (=).
    Eq,
    /// Not equal (<>).
    Neq,
    /// Less than (<).
    Lt,
    /// Less than or equal (<=).
    Lte,
    /// Greater than (>).
    Gt,
    /// Greater than or equal (>=).
    Gte,
}

impl ComparisonOp {
    /// Every comparison operator.
    pub const ALL: [ComparisonOp; 6] = [
        ComparisonOp::Eq,
        ComparisonOp::Neq,
        ComparisonOp::Lt,
        ComparisonOp::Lte,
        ComparisonOp::Gt,
        ComparisonOp::Gte,
    ];

    /// Returns the string representation of this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Neq => "<>",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
        }
    }
}

/// Logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
}

impl LogicalOp {
    /// Returns the string representation of this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    /// Addition (+).
    Add,
    /// Subtraction (-).
    Sub,
    /// Multiplication (*).
    Mul,
    /// Division (/), always producing a double.
    Div,
}

impl ArithmeticOp {
    /// Returns the string representation of this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
        }
    }
}

/// A resolved operator symbol, as handed over by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Comparison operator.
    Comparison(ComparisonOp),
    /// Logical operator.
    Logical(LogicalOp),
    /// Arithmetic operator.
    Arithmetic(ArithmeticOp),
}

impl Operator {
    /// Returns the string representation of this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Comparison(op) => op.as_str(),
            Operator::Logical(op) => op.as_str(),
            Operator::Arithmetic(op) => op.as_str(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ComparisonOp> for Operator {
    fn from(op: ComparisonOp) -> Self {
        Operator::Comparison(op)
    }
}

impl From<LogicalOp> for Operator {
    fn from(op: LogicalOp) -> Self {
        Operator::Logical(op)
    }
}

impl From<ArithmeticOp> for Operator {
    fn from(op: ArithmeticOp) -> Self {
        Operator::Arithmetic(op)
    }
}
