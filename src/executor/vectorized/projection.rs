//! Column-versus-column projection kernel.

use std::fmt;
use std::marker::PhantomData;

use crate::types::DataType;

use super::batch::{Selection, VectorizedRowBatch};
use super::column::{ColumnVector, TypedColumnVector, VectorElement};
use super::evaluator::VectorExpression;
use super::predicate::BinaryOp;

/// Borrows the two input columns and the output column at once.
fn split_io(
    columns: &mut [ColumnVector],
    left: usize,
    right: usize,
    output: usize,
) -> (&ColumnVector, &ColumnVector, &mut ColumnVector) {
    let (head, tail) = columns.split_at_mut(output);
    let (out, tail) = tail.split_at_mut(1);
    let head: &[ColumnVector] = head;
    let tail: &[ColumnVector] = tail;
    let pick = move |i: usize| -> &ColumnVector {
        if i < output {
            &head[i]
        } else {
            &tail[i - output - 1]
        }
    };
    (pick(left), pick(right), &mut out[0])
}

/// Writes one computed value; `None` turns the row null.
///
/// When the output was null-free so far, the null flags of the live rows are
/// cleared first so that flipping `no_nulls` never exposes stale flags.
#[inline]
fn store<T: Clone + Default>(
    out: &mut TypedColumnVector<T>,
    selection: &Selection,
    row: usize,
    value: Option<T>,
) {
    match value {
        Some(v) => out.vector[row] = v,
        None => {
            if out.no_nulls {
                for i in selection.iter() {
                    out.is_null[i] = false;
                }
                out.no_nulls = false;
            }
            out.vector[row] = T::default();
            out.is_null[row] = true;
        }
    }
}

/// Writes `Op(left[i], right[i])` into an output column for every live row.
///
/// The output repeats only when both inputs repeat, and is null-free only when
/// both inputs are. Otherwise a live row is null when either input row is.
pub struct ColumnBinaryColumn<L, R, Op> {
    left: usize,
    right: usize,
    output: usize,
    _types: PhantomData<fn() -> (L, R, Op)>,
}

impl<L, R, Op> ColumnBinaryColumn<L, R, Op> {
    /// Creates a projection of `left` and `right` into `output`.
    ///
    /// # Panics
    ///
    /// Panics if `output` is also an input column.
    #[must_use]
    pub fn new(left: usize, right: usize, output: usize) -> Self {
        assert!(
            output != left && output != right,
            "output column {output} overlaps an input column"
        );
        ColumnBinaryColumn {
            left,
            right,
            output,
            _types: PhantomData,
        }
    }
}

impl<L, R, Op> fmt::Debug for ColumnBinaryColumn<L, R, Op>
where
    L: VectorElement,
    R: VectorElement,
    Op: BinaryOp<L, R>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnBinaryColumn")
            .field("op", &Op::OP)
            .field("left", &(self.left, L::PHYSICAL))
            .field("right", &(self.right, R::PHYSICAL))
            .field("output", &(self.output, Op::OUTPUT_TYPE))
            .finish()
    }
}

impl<L, R, Op> VectorExpression for ColumnBinaryColumn<L, R, Op>
where
    L: VectorElement,
    R: VectorElement,
    Op: BinaryOp<L, R>,
{
    fn evaluate(&self, batch: &mut VectorizedRowBatch) {
        if batch.size() == 0 {
            return;
        }

        let (columns, selection) = batch.project_parts();
        let (left, right, out) = split_io(columns, self.left, self.right, self.output);
        let left = L::column(left);
        let right = R::column(right);
        let out = Op::Output::column_mut(out);
        let lv = &left.vector;
        let rv = &right.vector;

        out.no_nulls = left.no_nulls && right.no_nulls;
        out.is_repeating = left.is_repeating && right.is_repeating;

        if out.is_repeating {
            if left.is_null_at(0) || right.is_null_at(0) {
                out.is_null[0] = true;
            } else {
                out.is_null[0] = false;
                store(out, selection, 0, Op::apply(&lv[0], &rv[0]));
            }
            return;
        }

        if !out.no_nulls {
            for i in selection.iter() {
                out.is_null[i] = left.is_null_at(i) || right.is_null_at(i);
            }
        }

        match (left.is_repeating, right.is_repeating) {
            (true, _) => {
                let l0 = &lv[0];
                for i in selection.iter() {
                    store(out, selection, i, Op::apply(l0, &rv[i]));
                }
            }
            (false, true) => {
                let r0 = &rv[0];
                for i in selection.iter() {
                    store(out, selection, i, Op::apply(&lv[i], r0));
                }
            }
            (false, false) => {
                for i in selection.iter() {
                    store(out, selection, i, Op::apply(&lv[i], &rv[i]));
                }
            }
        }
    }

    fn output_column(&self) -> Option<usize> {
        Some(self.output)
    }

    fn output_type(&self) -> DataType {
        Op::OUTPUT_TYPE
    }
}
