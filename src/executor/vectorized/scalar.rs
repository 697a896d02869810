//! Column-versus-literal filter kernels.
//!
//! A literal is never null and behaves like a null-free repeating column, so
//! these kernels follow the same branch order as the column/column filter
//! with one operand fixed.

use std::fmt;
use std::marker::PhantomData;

use crate::types::DataType;

use super::batch::{Selection, VectorizedRowBatch};
use super::column::{TypedColumnVector, VectorElement};
use super::evaluator::VectorExpression;
use super::predicate::Predicate;

/// Keeps the live rows where `keep(value)` holds for the column's value,
/// excluding null rows.
#[inline]
fn retain_by_value<T, F>(column: &TypedColumnVector<T>, selection: &mut Selection, keep: F)
where
    F: Fn(&T) -> bool,
{
    let values = &column.vector;
    if column.is_repeating {
        if column.is_null_at(0) || !keep(&values[0]) {
            selection.clear();
        }
        return;
    }
    match column.null_flags() {
        Some(nulls) => selection.retain(|i| !nulls[i] && keep(&values[i])),
        None => selection.retain(|i| keep(&values[i])),
    }
}

/// Narrows a batch to the rows where `P(column[i], literal)` holds.
pub struct FilterColumnScalar<C, S, P> {
    column: usize,
    value: S,
    _types: PhantomData<fn() -> (C, P)>,
}

impl<C, S, P> FilterColumnScalar<C, S, P> {
    /// Creates a filter comparing `column` against `value`.
    #[must_use]
    pub fn new(column: usize, value: S) -> Self {
        FilterColumnScalar {
            column,
            value,
            _types: PhantomData,
        }
    }
}

impl<C, S, P> fmt::Debug for FilterColumnScalar<C, S, P>
where
    C: VectorElement,
    S: VectorElement,
    P: Predicate<C, S>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterColumnScalar")
            .field("op", &P::OP)
            .field("column", &(self.column, C::PHYSICAL))
            .field("value", &self.value)
            .finish()
    }
}

impl<C, S, P> VectorExpression for FilterColumnScalar<C, S, P>
where
    C: VectorElement,
    S: VectorElement,
    P: Predicate<C, S>,
{
    fn evaluate(&self, batch: &mut VectorizedRowBatch) {
        if batch.size() == 0 {
            return;
        }
        let (columns, selection) = batch.filter_parts();
        let column = C::column(&columns[self.column]);
        let value = &self.value;
        retain_by_value(column, selection, |v| P::test(v, value));
    }

    fn output_column(&self) -> Option<usize> {
        None
    }

    fn output_type(&self) -> DataType {
        DataType::Bool
    }
}

/// Narrows a batch to the rows where `P(literal, column[i])` holds.
pub struct FilterScalarColumn<S, C, P> {
    value: S,
    column: usize,
    _types: PhantomData<fn() -> (C, P)>,
}

impl<S, C, P> FilterScalarColumn<S, C, P> {
    /// Creates a filter comparing `value` against `column`.
    #[must_use]
    pub fn new(value: S, column: usize) -> Self {
        FilterScalarColumn {
            value,
            column,
            _types: PhantomData,
        }
    }
}

impl<S, C, P> fmt::Debug for FilterScalarColumn<S, C, P>
where
    S: VectorElement,
    C: VectorElement,
    P: Predicate<S, C>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterScalarColumn")
            .field("op", &P::OP)
            .field("value", &self.value)
            .field("column", &(self.column, C::PHYSICAL))
            .finish()
    }
}

impl<S, C, P> VectorExpression for FilterScalarColumn<S, C, P>
where
    S: VectorElement,
    C: VectorElement,
    P: Predicate<S, C>,
{
    fn evaluate(&self, batch: &mut VectorizedRowBatch) {
        if batch.size() == 0 {
            return;
        }
        let (columns, selection) = batch.filter_parts();
        let column = C::column(&columns[self.column]);
        let value = &self.value;
        retain_by_value(column, selection, |v| P::test(value, v));
    }

    fn output_column(&self) -> Option<usize> {
        None
    }

    fn output_type(&self) -> DataType {
        DataType::Bool
    }
}
