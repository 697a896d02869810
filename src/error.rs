//! Error types for vexpr operations.

use thiserror::Error;

/// Result type alias using [`VexprError`].
pub type Result<T> = std::result::Result<T, VexprError>;

/// Error types for vexpr operations.
///
/// Kernel evaluation itself never returns an error: a malformed batch is an
/// invariant violation and panics. Errors only surface at plan time (kernel
/// resolution), at the Arrow boundary, and at the session boundary.
#[derive(Debug, Error)]
pub enum VexprError {
    // ==================== Plan-time Errors ====================
    /// No kernel specialization exists for the requested triple.
    #[error("Unsupported combination: {op} over ({left}, {right})")]
    UnsupportedCombination {
        op: String,
        left: String,
        right: String,
    },

    /// Column numbers that no kernel can be bound to.
    #[error("Invalid column binding: {0}")]
    InvalidColumnBinding(String),

    /// Arrow type with no physical column mapping.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    // ==================== Session Errors ====================
    /// Operation invoked on a session in the wrong lifecycle state.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Failure while releasing a remote compute client.
    #[error("Resource release failure: {0}")]
    ResourceReleaseFailure(String),

    /// Failure while acquiring a remote client or submitting work to it.
    #[error("Client error: {0}")]
    ClientError(String),

    // ==================== Boundary Errors ====================
    /// Error raised by Arrow while building record batches.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl VexprError {
    /// Builds an [`VexprError::UnsupportedCombination`] from displayable parts.
    pub fn unsupported(
        op: impl std::fmt::Display,
        left: impl std::fmt::Display,
        right: impl std::fmt::Display,
    ) -> Self {
        VexprError::UnsupportedCombination {
            op: op.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        }
    }
}
