//! Type definitions shared by columns, kernels and the registry.

mod value;

pub use value::{DataType, PhysicalType, Scalar};
