//! Logical types, physical column types and scalar literals.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical representation of a column's values.
///
/// Several logical types share one physical layout; kernels are specialized
/// per physical type only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalType {
    /// `i64` values (integers, booleans, dates, timestamps).
    Long,
    /// `f64` values.
    Double,
    /// Byte strings (UTF-8 strings and binary).
    Bytes,
}

impl PhysicalType {
    /// Returns the display name of this physical type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PhysicalType::Long => "LONG",
            PhysicalType::Double => "DOUBLE",
            PhysicalType::Bytes => "BYTES",
        }
    }

    /// Returns whether values of this type take part in arithmetic.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, PhysicalType::Long | PhysicalType::Double)
    }
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Supported logical data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Boolean, stored as 0/1 in a long column.
    Bool,
    /// 64-bit signed integer.
    Int64,
    /// Date (days since epoch).
    Date,
    /// Timestamp (microseconds since epoch).
    Timestamp,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Raw bytes.
    Binary,
}

impl DataType {
    /// Returns the name of the data type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Bool => "BOOL",
            DataType::Int64 => "INT64",
            DataType::Date => "DATE",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Float64 => "FLOAT64",
            DataType::String => "STRING",
            DataType::Binary => "BINARY",
        }
    }

    /// Returns the physical column layout used for this type.
    #[must_use]
    pub fn physical(&self) -> PhysicalType {
        match self {
            DataType::Bool | DataType::Int64 | DataType::Date | DataType::Timestamp => {
                PhysicalType::Long
            }
            DataType::Float64 => PhysicalType::Double,
            DataType::String | DataType::Binary => PhysicalType::Bytes,
        }
    }

    /// Converts from an Arrow data type.
    ///
    /// Returns None for Arrow types without a physical column mapping.
    #[must_use]
    pub fn from_arrow(arrow_type: &arrow::datatypes::DataType) -> Option<Self> {
        use arrow::datatypes::DataType as Arrow;
        match arrow_type {
            Arrow::Boolean => Some(DataType::Bool),
            Arrow::Int8 | Arrow::Int16 | Arrow::Int32 | Arrow::Int64 => Some(DataType::Int64),
            Arrow::Date32 => Some(DataType::Date),
            Arrow::Timestamp(_, _) => Some(DataType::Timestamp),
            Arrow::Float32 | Arrow::Float64 => Some(DataType::Float64),
            Arrow::Utf8 | Arrow::LargeUtf8 => Some(DataType::String),
            Arrow::Binary | Arrow::LargeBinary => Some(DataType::Binary),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A non-null literal operand bound into a scalar kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// Long literal.
    Long(i64),
    /// Double literal.
    Double(f64),
    /// Byte-string literal.
    Bytes(Vec<u8>),
}

impl Scalar {
    /// Returns the physical type of this literal.
    #[must_use]
    pub fn physical_type(&self) -> PhysicalType {
        match self {
            Scalar::Long(_) => PhysicalType::Long,
            Scalar::Double(_) => PhysicalType::Double,
            Scalar::Bytes(_) => PhysicalType::Bytes,
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Bytes(s.as_bytes().to_vec())
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Long(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Double(v)
    }
}
