//! vexpr - vectorized batch expression evaluation.
//!
//! Row batches of fixed capacity flow through an ordered pipeline of
//! specialized kernels. Filter kernels shrink a batch's selection vector in
//! place; projection kernels write computed values into an output column.
//! Kernels are resolved once at plan time from the [`KernelRegistry`] by
//! operator and operand types, then run without per-row dispatch.
//!
//! The [`session`] module wraps submission of compiled work to a remote
//! compute system behind an explicit open/close lifecycle.

pub mod error;
pub mod executor;
pub mod session;
pub mod types;

pub use error::{Result, VexprError};
pub use executor::vectorized::{
    ColumnVector, ComparisonOp, KernelRegistry, Selection, VectorExpression, VectorizedRowBatch,
};
pub use executor::{ExecutorConfig, VectorPipeline};
pub use session::{ExecutionSession, SessionConfig, SessionManager};
pub use types::{DataType, PhysicalType, Scalar};
