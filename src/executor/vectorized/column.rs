//! Typed, nullable, optionally-repeating column vectors.

use std::fmt::Debug;

use crate::types::{PhysicalType, Scalar};

/// One column of a batch, stored as a flat array of a single physical type.
///
/// `is_null` is only meaningful while `no_nulls` is false; when `no_nulls` is
/// true its contents may be stale from a previous batch and must not be read.
/// When `is_repeating` is true, slot 0 of `vector` and `is_null` is the value
/// of every live row.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedColumnVector<T> {
    /// Values, one slot per row of batch capacity.
    pub vector: Vec<T>,
    /// Null flags, parallel to `vector`.
    pub is_null: Vec<bool>,
    /// True when no row of the batch is null.
    pub no_nulls: bool,
    /// True when slot 0 applies to every row.
    pub is_repeating: bool,
}

/// Column of `i64` values.
pub type LongColumnVector = TypedColumnVector<i64>;
/// Column of `f64` values.
pub type DoubleColumnVector = TypedColumnVector<f64>;
/// Column of byte-string values.
pub type BytesColumnVector = TypedColumnVector<Vec<u8>>;

impl<T: Clone + Default> TypedColumnVector<T> {
    /// Creates a non-null, non-repeating column with `capacity` default slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        TypedColumnVector {
            vector: vec![T::default(); capacity],
            is_null: vec![false; capacity],
            no_nulls: true,
            is_repeating: false,
        }
    }

    /// Creates a column holding `values` in its first slots.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not fit in `capacity`.
    #[must_use]
    pub fn from_values(capacity: usize, values: &[T]) -> Self {
        assert!(values.len() <= capacity, "values exceed column capacity");
        let mut column = Self::new(capacity);
        column.vector[..values.len()].clone_from_slice(values);
        column
    }

    /// Creates a column from optional values, `None` marking a null row.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not fit in `capacity`.
    #[must_use]
    pub fn from_options(capacity: usize, values: &[Option<T>]) -> Self {
        assert!(values.len() <= capacity, "values exceed column capacity");
        let mut column = Self::new(capacity);
        for (i, value) in values.iter().enumerate() {
            match value {
                Some(v) => column.set_value(i, v.clone()),
                None => column.set_null(i),
            }
        }
        column
    }

    /// Creates a column whose single value is broadcast to every row.
    #[must_use]
    pub fn repeating(capacity: usize, value: T) -> Self {
        let mut column = Self::new(capacity.max(1));
        column.set_repeating_value(value);
        column
    }

    /// Creates a column whose every row is null.
    #[must_use]
    pub fn repeating_null(capacity: usize) -> Self {
        let mut column = Self::new(capacity.max(1));
        column.set_repeating_null();
        column
    }

    /// Returns the number of slots in this column.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.vector.len()
    }

    /// Restores the column to the non-null, non-repeating state for reuse.
    ///
    /// Values are left in place; they are overwritten by the next fill.
    pub fn reset(&mut self) {
        if !self.no_nulls {
            self.is_null.fill(false);
        }
        self.no_nulls = true;
        self.is_repeating = false;
    }

    /// Writes a non-null value at row `index`.
    pub fn set_value(&mut self, index: usize, value: T) {
        self.vector[index] = value;
        self.is_null[index] = false;
    }

    /// Marks row `index` null.
    ///
    /// The first null written into a null-free column clears whatever flags
    /// were left behind, so only rows marked since then read as null.
    pub fn set_null(&mut self, index: usize) {
        if self.no_nulls {
            self.is_null.fill(false);
            self.no_nulls = false;
        }
        self.is_null[index] = true;
    }

    /// Makes the column repeat a single non-null value.
    pub fn set_repeating_value(&mut self, value: T) {
        self.vector[0] = value;
        self.is_null[0] = false;
        self.is_repeating = true;
    }

    /// Makes the column repeat a single null.
    pub fn set_repeating_null(&mut self) {
        self.set_null(0);
        self.is_repeating = true;
    }
}

impl<T> TypedColumnVector<T> {
    /// Returns the null flags, or `None` when the column has no nulls.
    ///
    /// This is the only way kernels read `is_null`, so stale flags behind a
    /// `no_nulls` column are never observed.
    #[inline]
    #[must_use]
    pub fn null_flags(&self) -> Option<&[bool]> {
        if self.no_nulls {
            None
        } else {
            Some(&self.is_null)
        }
    }

    /// Returns whether logical row `index` is null.
    #[inline]
    #[must_use]
    pub fn is_null_at(&self, index: usize) -> bool {
        let slot = if self.is_repeating { 0 } else { index };
        !self.no_nulls && self.is_null[slot]
    }

    /// Returns the value of logical row `index`, or `None` when it is null.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<&T> {
        if self.is_null_at(index) {
            None
        } else {
            let slot = if self.is_repeating { 0 } else { index };
            Some(&self.vector[slot])
        }
    }
}

/// A column of any supported physical type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnVector {
    /// `i64` column.
    Long(LongColumnVector),
    /// `f64` column.
    Double(DoubleColumnVector),
    /// Byte-string column.
    Bytes(BytesColumnVector),
}

impl ColumnVector {
    /// Allocates an empty column of the given physical type.
    #[must_use]
    pub fn new(physical: PhysicalType, capacity: usize) -> Self {
        match physical {
            PhysicalType::Long => ColumnVector::Long(TypedColumnVector::new(capacity)),
            PhysicalType::Double => ColumnVector::Double(TypedColumnVector::new(capacity)),
            PhysicalType::Bytes => ColumnVector::Bytes(TypedColumnVector::new(capacity)),
        }
    }

    /// Returns the physical type of this column.
    #[must_use]
    pub fn physical_type(&self) -> PhysicalType {
        match self {
            ColumnVector::Long(_) => PhysicalType::Long,
            ColumnVector::Double(_) => PhysicalType::Double,
            ColumnVector::Bytes(_) => PhysicalType::Bytes,
        }
    }

    /// Returns the number of slots in this column.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match self {
            ColumnVector::Long(c) => c.capacity(),
            ColumnVector::Double(c) => c.capacity(),
            ColumnVector::Bytes(c) => c.capacity(),
        }
    }

    /// Returns true when no row is null.
    #[must_use]
    pub fn no_nulls(&self) -> bool {
        match self {
            ColumnVector::Long(c) => c.no_nulls,
            ColumnVector::Double(c) => c.no_nulls,
            ColumnVector::Bytes(c) => c.no_nulls,
        }
    }

    /// Returns true when slot 0 is broadcast to every row.
    #[must_use]
    pub fn is_repeating(&self) -> bool {
        match self {
            ColumnVector::Long(c) => c.is_repeating,
            ColumnVector::Double(c) => c.is_repeating,
            ColumnVector::Bytes(c) => c.is_repeating,
        }
    }

    /// Returns whether logical row `index` is null.
    #[must_use]
    pub fn is_null_at(&self, index: usize) -> bool {
        match self {
            ColumnVector::Long(c) => c.is_null_at(index),
            ColumnVector::Double(c) => c.is_null_at(index),
            ColumnVector::Bytes(c) => c.is_null_at(index),
        }
    }

    /// Restores the column flags for reuse by the next batch.
    pub fn reset(&mut self) {
        match self {
            ColumnVector::Long(c) => c.reset(),
            ColumnVector::Double(c) => c.reset(),
            ColumnVector::Bytes(c) => c.reset(),
        }
    }
}

impl From<LongColumnVector> for ColumnVector {
    fn from(column: LongColumnVector) -> Self {
        ColumnVector::Long(column)
    }
}

impl From<DoubleColumnVector> for ColumnVector {
    fn from(column: DoubleColumnVector) -> Self {
        ColumnVector::Double(column)
    }
}

impl From<BytesColumnVector> for ColumnVector {
    fn from(column: BytesColumnVector) -> Self {
        ColumnVector::Bytes(column)
    }
}

/// Element type of a typed column.
///
/// Kernels are generic over their operand element types; this trait resolves
/// the concrete typed column from a [`ColumnVector`] once per evaluation.
pub trait VectorElement: Clone + Default + Debug + Send + Sync + 'static {
    /// Physical type of columns holding this element.
    const PHYSICAL: PhysicalType;

    /// Borrows the typed column.
    ///
    /// # Panics
    ///
    /// Panics when `column` holds a different physical type; a kernel bound to
    /// the wrong column is a planning bug, not a recoverable condition.
    fn column(column: &ColumnVector) -> &TypedColumnVector<Self>;

    /// Mutably borrows the typed column.
    ///
    /// # Panics
    ///
    /// Panics when `column` holds a different physical type.
    fn column_mut(column: &mut ColumnVector) -> &mut TypedColumnVector<Self>;

    /// Extracts a literal of this element type.
    fn from_scalar(scalar: &Scalar) -> Option<Self>;
}

fn type_mismatch(actual: PhysicalType, expected: PhysicalType) -> ! {
    panic!("column holds {actual} values, kernel expects {expected}")
}

impl VectorElement for i64 {
    const PHYSICAL: PhysicalType = PhysicalType::Long;

    fn column(column: &ColumnVector) -> &LongColumnVector {
        match column {
            ColumnVector::Long(c) => c,
            other => type_mismatch(other.physical_type(), Self::PHYSICAL),
        }
    }

    fn column_mut(column: &mut ColumnVector) -> &mut LongColumnVector {
        match column {
            ColumnVector::Long(c) => c,
            other => type_mismatch(other.physical_type(), Self::PHYSICAL),
        }
    }

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Long(v) => Some(*v),
            _ => None,
        }
    }
}

impl VectorElement for f64 {
    const PHYSICAL: PhysicalType = PhysicalType::Double;

    fn column(column: &ColumnVector) -> &DoubleColumnVector {
        match column {
            ColumnVector::Double(c) => c,
            other => type_mismatch(other.physical_type(), Self::PHYSICAL),
        }
    }

    fn column_mut(column: &mut ColumnVector) -> &mut DoubleColumnVector {
        match column {
            ColumnVector::Double(c) => c,
            other => type_mismatch(other.physical_type(), Self::PHYSICAL),
        }
    }

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl VectorElement for Vec<u8> {
    const PHYSICAL: PhysicalType = PhysicalType::Bytes;

    fn column(column: &ColumnVector) -> &BytesColumnVector {
        match column {
            ColumnVector::Bytes(c) => c,
            other => type_mismatch(other.physical_type(), Self::PHYSICAL),
        }
    }

    fn column_mut(column: &mut ColumnVector) -> &mut BytesColumnVector {
        match column {
            ColumnVector::Bytes(c) => c,
            other => type_mismatch(other.physical_type(), Self::PHYSICAL),
        }
    }

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Bytes(v) => Some(v.clone()),
            _ => None,
        }
    }
}
