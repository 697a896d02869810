//! Vectorized execution module.
//!
//! This module provides the batch-oriented primitives: fixed-capacity row
//! batches with a selection vector, typed column vectors, the specialized
//! filter and projection kernels, and the registry that resolves them.

pub mod batch;
pub mod column;
pub mod combinator;
pub mod evaluator;
pub mod filter;
pub mod predicate;
pub mod projection;
pub mod registry;
pub mod scalar;

pub use batch::{LiveRows, Selection, VectorizedRowBatch, DEFAULT_BATCH_SIZE};
pub use column::{
    BytesColumnVector, ColumnVector, DoubleColumnVector, LongColumnVector, TypedColumnVector,
    VectorElement,
};
pub use combinator::{FilterExprAnd, FilterExprOr};
pub use evaluator::{ArithmeticOp, ComparisonOp, LogicalOp, Operator, VectorExpression};
pub use filter::FilterColumnColumn;
pub use projection::ColumnBinaryColumn;
pub use registry::{KernelRegistry, KernelShape};
pub use scalar::{FilterColumnScalar, FilterScalarColumn};
