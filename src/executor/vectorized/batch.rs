//! Fixed-capacity row batch with a selection vector.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BinaryArray, Float64Array, Int64Array};
use arrow::datatypes::{DataType as ArrowDataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::{Result, VexprError};
use crate::types::{DataType, PhysicalType};

use super::column::{BytesColumnVector, ColumnVector, DoubleColumnVector, LongColumnVector};

/// Default batch capacity for vectorized execution (rows per batch).
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// The set of live rows of a batch.
///
/// `size`, `selected_in_use` and `selected` always change together. When
/// `selected_in_use` is false the live rows are `0..size`; otherwise they are
/// `selected[..size]`, in the order rows were found live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    size: usize,
    selected_in_use: bool,
    selected: Vec<usize>,
}

impl Selection {
    /// Creates an empty selection over `capacity` rows.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Selection {
            size: 0,
            selected_in_use: false,
            selected: vec![0; capacity],
        }
    }

    /// Returns the number of live rows.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true if no rows are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns true if the live rows are given by [`Selection::selected`].
    #[must_use]
    pub fn selected_in_use(&self) -> bool {
        self.selected_in_use
    }

    /// Returns the meaningful prefix of the selection array.
    ///
    /// Only describes the live rows while `selected_in_use` is true.
    #[must_use]
    pub fn selected(&self) -> &[usize] {
        &self.selected[..self.size]
    }

    /// Returns the number of row slots this selection can describe.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.selected.len()
    }

    /// Iterates the live row indices in order.
    pub fn iter(&self) -> LiveRows<'_> {
        if self.selected_in_use {
            LiveRows::Selected(self.selected[..self.size].iter())
        } else {
            LiveRows::Contiguous(0..self.size)
        }
    }

    /// Makes rows `0..size` live, dropping any selection array.
    ///
    /// # Panics
    ///
    /// Panics if `size` exceeds capacity.
    pub fn set_contiguous(&mut self, size: usize) {
        assert!(size <= self.capacity(), "size {size} exceeds capacity");
        self.size = size;
        self.selected_in_use = false;
    }

    /// Makes exactly `rows` live, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if a row index is out of range or there are more rows than
    /// capacity.
    pub fn set_selected(&mut self, rows: &[usize]) {
        let capacity = self.capacity();
        assert!(rows.len() <= capacity, "selection exceeds capacity");
        assert!(
            rows.iter().all(|&row| row < capacity),
            "selected row out of range"
        );
        self.selected[..rows.len()].copy_from_slice(rows);
        self.size = rows.len();
        self.selected_in_use = true;
    }

    /// Drops every live row. The selection mode is left as it was.
    pub fn clear(&mut self) {
        self.size = 0;
    }

    /// Keeps the live rows for which `keep` returns true, preserving order.
    ///
    /// With an active selection the survivors are compacted in place. With the
    /// implicit contiguous range the survivors are written into the selection
    /// array, and selection mode is switched on only if a row was dropped.
    /// Once on, selection mode stays on even if nothing is dropped.
    #[inline]
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(usize) -> bool,
    {
        let n = self.size;
        let sel = &mut self.selected;
        let mut new_size = 0;
        if self.selected_in_use {
            for j in 0..n {
                let i = sel[j];
                if keep(i) {
                    sel[new_size] = i;
                    new_size += 1;
                }
            }
            self.size = new_size;
        } else {
            for i in 0..n {
                if keep(i) {
                    sel[new_size] = i;
                    new_size += 1;
                }
            }
            if new_size < n {
                self.size = new_size;
                self.selected_in_use = true;
            }
        }
    }
}

/// Iterator over the live rows of a [`Selection`].
#[derive(Debug, Clone)]
pub enum LiveRows<'a> {
    /// Implicit `0..size` range.
    Contiguous(std::ops::Range<usize>),
    /// Explicit selection array.
    Selected(std::slice::Iter<'a, usize>),
}

impl Iterator for LiveRows<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        match self {
            LiveRows::Contiguous(range) => range.next(),
            LiveRows::Selected(iter) => iter.next().copied(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            LiveRows::Contiguous(range) => range.size_hint(),
            LiveRows::Selected(iter) => iter.size_hint(),
        }
    }
}

/// A fixed-capacity window of rows stored as parallel column vectors.
///
/// Batches are allocated once and refilled every cycle; kernels mutate the
/// selection in place (filters) or write into pre-allocated columns
/// (projections).
#[derive(Debug, Clone)]
pub struct VectorizedRowBatch {
    capacity: usize,
    selection: Selection,
    columns: Vec<ColumnVector>,
}

impl VectorizedRowBatch {
    /// Allocates an empty batch with one column per physical type.
    #[must_use]
    pub fn new(types: &[PhysicalType], capacity: usize) -> Self {
        VectorizedRowBatch {
            capacity,
            selection: Selection::new(capacity),
            columns: types
                .iter()
                .map(|&physical| ColumnVector::new(physical, capacity))
                .collect(),
        }
    }

    /// Wraps populated columns, making rows `0..size` live.
    ///
    /// The capacity is the smallest column capacity.
    ///
    /// # Panics
    ///
    /// Panics if `size` exceeds the capacity.
    #[must_use]
    pub fn from_columns(columns: Vec<ColumnVector>, size: usize) -> Self {
        let capacity = columns
            .iter()
            .map(ColumnVector::capacity)
            .min()
            .unwrap_or(size);
        let mut selection = Selection::new(capacity);
        selection.set_contiguous(size);
        VectorizedRowBatch {
            capacity,
            selection,
            columns,
        }
    }

    /// Returns the fixed maximum row count.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of live rows.
    #[must_use]
    pub fn size(&self) -> usize {
        self.selection.size()
    }

    /// Returns true if the live rows are given by an explicit selection.
    #[must_use]
    pub fn selected_in_use(&self) -> bool {
        self.selection.selected_in_use()
    }

    /// Returns the meaningful prefix of the selection array.
    #[must_use]
    pub fn selected(&self) -> &[usize] {
        self.selection.selected()
    }

    /// Returns the live-row view.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Returns the live-row view for mutation.
    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Makes rows `0..size` live.
    ///
    /// # Panics
    ///
    /// Panics if `size` exceeds capacity.
    pub fn set_size(&mut self, size: usize) {
        self.selection.set_contiguous(size);
    }

    /// Makes exactly `rows` live, in order.
    ///
    /// # Panics
    ///
    /// Panics if a row index is out of range.
    pub fn set_selected(&mut self, rows: &[usize]) {
        self.selection.set_selected(rows);
    }

    /// Iterates the live row indices in order.
    pub fn live_rows(&self) -> LiveRows<'_> {
        self.selection.iter()
    }

    /// Returns the number of columns in this batch.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns a column by index.
    #[must_use]
    pub fn column(&self, index: usize) -> &ColumnVector {
        &self.columns[index]
    }

    /// Returns a column by index for mutation.
    pub fn column_mut(&mut self, index: usize) -> &mut ColumnVector {
        &mut self.columns[index]
    }

    /// Returns all columns.
    #[must_use]
    pub fn columns(&self) -> &[ColumnVector] {
        &self.columns
    }

    /// Splits the batch into read-only columns and the mutable selection.
    pub fn filter_parts(&mut self) -> (&[ColumnVector], &mut Selection) {
        (&self.columns, &mut self.selection)
    }

    /// Splits the batch into mutable columns and the read-only selection.
    pub fn project_parts(&mut self) -> (&mut [ColumnVector], &Selection) {
        (&mut self.columns, &self.selection)
    }

    /// Clears the batch for refilling: no live rows, every column reset.
    pub fn reset(&mut self) {
        self.selection.set_contiguous(0);
        for column in &mut self.columns {
            column.reset();
        }
    }

    /// Builds a batch from an Arrow record batch.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` if a column has no physical mapping, or an
    /// Arrow error if a cast fails.
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        let rows = batch.num_rows();
        let capacity = rows.max(1);
        let mut columns = Vec::with_capacity(batch.num_columns());

        let schema = batch.schema();
        for (field, array) in schema.fields().iter().zip(batch.columns()) {
            let data_type = DataType::from_arrow(field.data_type()).ok_or_else(|| {
                VexprError::UnsupportedType(format!(
                    "column '{}' has type {}",
                    field.name(),
                    field.data_type()
                ))
            })?;
            let column = match data_type.physical() {
                PhysicalType::Long => ColumnVector::Long(long_column(array, capacity)?),
                PhysicalType::Double => ColumnVector::Double(double_column(array, capacity)?),
                PhysicalType::Bytes => ColumnVector::Bytes(bytes_column(array, capacity)?),
            };
            columns.push(column);
        }

        let mut selection = Selection::new(capacity);
        selection.set_contiguous(rows);
        Ok(VectorizedRowBatch {
            capacity,
            selection,
            columns,
        })
    }

    /// Emits the live rows, in selection order, as an Arrow record batch.
    ///
    /// Repeating columns are expanded and nulls preserved. Columns are named
    /// `_col0`, `_col1`, ...
    ///
    /// # Errors
    ///
    /// Returns an Arrow error if the record batch cannot be assembled.
    pub fn materialize(&self) -> Result<RecordBatch> {
        let mut fields = Vec::with_capacity(self.columns.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.columns.len());

        for (index, column) in self.columns.iter().enumerate() {
            let name = format!("_col{index}");
            match column {
                ColumnVector::Long(c) => {
                    let values: Vec<Option<i64>> =
                        self.live_rows().map(|row| c.value_at(row).copied()).collect();
                    fields.push(Field::new(name, ArrowDataType::Int64, true));
                    arrays.push(Arc::new(Int64Array::from(values)));
                }
                ColumnVector::Double(c) => {
                    let values: Vec<Option<f64>> =
                        self.live_rows().map(|row| c.value_at(row).copied()).collect();
                    fields.push(Field::new(name, ArrowDataType::Float64, true));
                    arrays.push(Arc::new(Float64Array::from(values)));
                }
                ColumnVector::Bytes(c) => {
                    let values: Vec<Option<&[u8]>> = self
                        .live_rows()
                        .map(|row| c.value_at(row).map(Vec::as_slice))
                        .collect();
                    fields.push(Field::new(name, ArrowDataType::Binary, true));
                    arrays.push(Arc::new(BinaryArray::from_opt_vec(values)));
                }
            }
        }

        let schema = Arc::new(Schema::new(fields));
        if arrays.is_empty() {
            return Ok(RecordBatch::new_empty(schema));
        }
        Ok(RecordBatch::try_new(schema, arrays)?)
    }
}

fn long_column(array: &ArrayRef, capacity: usize) -> Result<LongColumnVector> {
    let casted = arrow::compute::cast(array, &ArrowDataType::Int64)?;
    let values = casted.as_primitive::<Int64Type>();
    let mut column = LongColumnVector::new(capacity);
    for i in 0..values.len() {
        if values.is_null(i) {
            column.set_null(i);
        } else {
            column.set_value(i, values.value(i));
        }
    }
    Ok(column)
}

fn double_column(array: &ArrayRef, capacity: usize) -> Result<DoubleColumnVector> {
    let casted = arrow::compute::cast(array, &ArrowDataType::Float64)?;
    let values = casted.as_primitive::<Float64Type>();
    let mut column = DoubleColumnVector::new(capacity);
    for i in 0..values.len() {
        if values.is_null(i) {
            column.set_null(i);
        } else {
            column.set_value(i, values.value(i));
        }
    }
    Ok(column)
}

fn bytes_column(array: &ArrayRef, capacity: usize) -> Result<BytesColumnVector> {
    let casted = arrow::compute::cast(array, &ArrowDataType::LargeBinary)?;
    let values = casted.as_binary::<i64>();
    let mut column = BytesColumnVector::new(capacity);
    for i in 0..values.len() {
        if values.is_null(i) {
            column.set_null(i);
        } else {
            column.set_value(i, values.value(i).to_vec());
        }
    }
    Ok(column)
}
