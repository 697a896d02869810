//! Column-versus-column filter kernel.

use std::fmt;
use std::marker::PhantomData;

use crate::types::DataType;

use super::batch::VectorizedRowBatch;
use super::column::VectorElement;
use super::evaluator::VectorExpression;
use super::predicate::Predicate;

/// Narrows a batch to the rows where `P(left[i], right[i])` holds.
///
/// A row whose left or right operand is null never survives. The null and
/// repetition flags of both operands are inspected once per batch to pick a
/// specialized loop, so the inner loops only test what the batch requires.
pub struct FilterColumnColumn<L, R, P> {
    left: usize,
    right: usize,
    _types: PhantomData<fn() -> (L, R, P)>,
}

impl<L, R, P> FilterColumnColumn<L, R, P> {
    /// Creates a filter over columns `left` and `right`.
    #[must_use]
    pub fn new(left: usize, right: usize) -> Self {
        FilterColumnColumn {
            left,
            right,
            _types: PhantomData,
        }
    }

    /// Returns the bound (left, right) column numbers.
    #[must_use]
    pub fn columns(&self) -> (usize, usize) {
        (self.left, self.right)
    }
}

impl<L, R, P> fmt::Debug for FilterColumnColumn<L, R, P>
where
    L: VectorElement,
    R: VectorElement,
    P: Predicate<L, R>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterColumnColumn")
            .field("op", &P::OP)
            .field("left", &(self.left, L::PHYSICAL))
            .field("right", &(self.right, R::PHYSICAL))
            .finish()
    }
}

impl<L, R, P> VectorExpression for FilterColumnColumn<L, R, P>
where
    L: VectorElement,
    R: VectorElement,
    P: Predicate<L, R>,
{
    fn evaluate(&self, batch: &mut VectorizedRowBatch) {
        if batch.size() == 0 {
            return;
        }

        let (columns, selection) = batch.filter_parts();
        let left = L::column(&columns[self.left]);
        let right = R::column(&columns[self.right]);
        let lv = &left.vector;
        let rv = &right.vector;

        if left.no_nulls && right.no_nulls {
            match (left.is_repeating, right.is_repeating) {
                (true, true) => {
                    // Every live row already sees the same pair.
                    if !P::test(&lv[0], &rv[0]) {
                        selection.clear();
                    }
                }
                (true, false) => {
                    let l0 = &lv[0];
                    selection.retain(|i| P::test(l0, &rv[i]));
                }
                (false, true) => {
                    let r0 = &rv[0];
                    selection.retain(|i| P::test(&lv[i], r0));
                }
                (false, false) => {
                    selection.retain(|i| P::test(&lv[i], &rv[i]));
                }
            }
            return;
        }

        match (left.is_repeating, right.is_repeating) {
            (true, true) => {
                if left.is_null_at(0) || right.is_null_at(0) || !P::test(&lv[0], &rv[0]) {
                    selection.clear();
                }
            }
            (true, false) => {
                if left.is_null_at(0) {
                    selection.clear();
                    return;
                }
                let l0 = &lv[0];
                match right.null_flags() {
                    Some(rn) => selection.retain(|i| !rn[i] && P::test(l0, &rv[i])),
                    None => selection.retain(|i| P::test(l0, &rv[i])),
                }
            }
            (false, true) => {
                if right.is_null_at(0) {
                    selection.clear();
                    return;
                }
                let r0 = &rv[0];
                match left.null_flags() {
                    Some(ln) => selection.retain(|i| !ln[i] && P::test(&lv[i], r0)),
                    None => selection.retain(|i| P::test(&lv[i], r0)),
                }
            }
            (false, false) => match (left.null_flags(), right.null_flags()) {
                (Some(ln), Some(rn)) => {
                    selection.retain(|i| !ln[i] && !rn[i] && P::test(&lv[i], &rv[i]));
                }
                (Some(ln), None) => selection.retain(|i| !ln[i] && P::test(&lv[i], &rv[i])),
                (None, Some(rn)) => selection.retain(|i| !rn[i] && P::test(&lv[i], &rv[i])),
                (None, None) => unreachable!("null-free operands take the fast path"),
            },
        }
    }

    fn output_column(&self) -> Option<usize> {
        None
    }

    fn output_type(&self) -> DataType {
        DataType::Bool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::vectorized::column::{DoubleColumnVector, LongColumnVector};
    use crate::executor::vectorized::predicate::{And, Equal, LessEqual, NotEqual};

    type DoubleLteLong = FilterColumnColumn<f64, i64, LessEqual>;

    fn batch(left: DoubleColumnVector, right: LongColumnVector, size: usize) -> VectorizedRowBatch {
        VectorizedRowBatch::from_columns(vec![left.into(), right.into()], size)
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut b = batch(
            DoubleColumnVector::from_values(4, &[9.0, 9.0, 9.0, 9.0]),
            LongColumnVector::from_values(4, &[0, 0, 0, 0]),
            0,
        );
        b.set_selected(&[2, 1]);
        b.selection_mut().clear();

        DoubleLteLong::new(0, 1).evaluate(&mut b);
        assert_eq!(b.size(), 0);
        assert!(b.selected_in_use());
    }

    #[test]
    fn test_both_repeating_true_keeps_batch() {
        let mut b = batch(
            DoubleColumnVector::repeating(4, 1.0),
            LongColumnVector::repeating(4, 1),
            4,
        );
        DoubleLteLong::new(0, 1).evaluate(&mut b);
        assert_eq!(b.size(), 4);
        assert!(!b.selected_in_use());
    }

    #[test]
    fn test_both_repeating_false_empties_batch() {
        let mut b = batch(
            DoubleColumnVector::repeating(4, 3.0),
            LongColumnVector::repeating(4, 1),
            4,
        );
        DoubleLteLong::new(0, 1).evaluate(&mut b);
        assert_eq!(b.size(), 0);
    }

    #[test]
    fn test_both_repeating_with_nulls_still_compares() {
        let mut left = DoubleColumnVector::repeating(4, 3.0);
        left.no_nulls = false;
        let mut b = batch(left, LongColumnVector::repeating(4, 1), 4);
        DoubleLteLong::new(0, 1).evaluate(&mut b);
        assert_eq!(b.size(), 0);
    }

    #[test]
    fn test_no_nulls_neither_repeating() {
        let mut b = batch(
            DoubleColumnVector::from_values(4, &[1.0, 5.0, 2.0, 7.0]),
            LongColumnVector::from_values(4, &[1, 4, 3, 7]),
            4,
        );
        DoubleLteLong::new(0, 1).evaluate(&mut b);
        assert!(b.selected_in_use());
        assert_eq!(b.selected(), &[0, 2, 3]);
    }

    #[test]
    fn test_nothing_filtered_keeps_contiguous_mode() {
        let mut b = batch(
            DoubleColumnVector::from_values(4, &[1.0, 2.0, 3.0, 4.0]),
            LongColumnVector::from_values(4, &[5, 5, 5, 5]),
            4,
        );
        DoubleLteLong::new(0, 1).evaluate(&mut b);
        assert!(!b.selected_in_use());
        assert_eq!(b.size(), 4);
    }

    #[test]
    fn test_varying_nulls_excluded() {
        let mut b = batch(
            DoubleColumnVector::from_options(4, &[Some(1.0), None, Some(2.0), Some(9.0)]),
            LongColumnVector::from_options(4, &[Some(1), Some(1), None, Some(9)]),
            4,
        );
        DoubleLteLong::new(0, 1).evaluate(&mut b);
        assert_eq!(b.selected(), &[0, 3]);
    }

    #[test]
    fn test_stale_null_flags_ignored() {
        let mut right = LongColumnVector::from_values(4, &[5, 5, 5, 5]);
        right.is_null.fill(true);
        let left = DoubleColumnVector::from_options(4, &[Some(1.0), None, Some(2.0), Some(3.0)]);
        let mut b = batch(left, right, 4);
        DoubleLteLong::new(0, 1).evaluate(&mut b);
        assert_eq!(b.selected(), &[0, 2, 3]);
    }

    #[test]
    fn test_first_null_write_discards_stale_flags() {
        let mut right = LongColumnVector::from_values(4, &[5, 5, 5, 5]);
        right.is_null[2] = true;
        right.set_null(1);
        let mut b = batch(
            DoubleColumnVector::from_values(4, &[1.0, 2.0, 3.0, 4.0]),
            right,
            4,
        );
        DoubleLteLong::new(0, 1).evaluate(&mut b);
        assert_eq!(b.selected(), &[0, 2, 3]);
    }

    #[test]
    fn test_reused_column_after_reset() {
        let mut right = LongColumnVector::from_values(4, &[5, 5, 5, 5]);
        right.is_null.fill(true);
        right.reset();
        right.set_null(3);
        let mut b = batch(
            DoubleColumnVector::from_values(4, &[1.0, 2.0, 3.0, 4.0]),
            right,
            4,
        );
        DoubleLteLong::new(0, 1).evaluate(&mut b);
        assert_eq!(b.selected(), &[0, 1, 2]);
    }

    #[test]
    fn test_repeating_null_empties_batch() {
        let mut b = batch(
            DoubleColumnVector::from_values(4, &[1.0, 2.0, 3.0, 4.0]),
            LongColumnVector::repeating_null(4),
            4,
        );
        DoubleLteLong::new(0, 1).evaluate(&mut b);
        assert_eq!(b.size(), 0);
    }

    #[test]
    fn test_repeating_with_nullable_varying() {
        let mut b = batch(
            DoubleColumnVector::repeating(4, 2.0),
            LongColumnVector::from_options(4, &[Some(3), None, Some(1), Some(2)]),
            4,
        );
        b.set_selected(&[3, 1, 0]);
        DoubleLteLong::new(0, 1).evaluate(&mut b);
        assert_eq!(b.selected(), &[3, 0]);
    }

    #[test]
    fn test_same_column_on_both_sides() {
        let mut b = VectorizedRowBatch::from_columns(
            vec![DoubleColumnVector::from_values(3, &[1.0, f64::NAN, 2.0]).into()],
            3,
        );
        FilterColumnColumn::<f64, f64, Equal>::new(0, 0).evaluate(&mut b);
        assert_eq!(b.selected(), &[0, 2]);

        FilterColumnColumn::<f64, f64, NotEqual>::new(0, 0).evaluate(&mut b);
        assert_eq!(b.size(), 0);
    }

    #[test]
    fn test_and_over_boolean_columns() {
        let mut b = VectorizedRowBatch::from_columns(
            vec![
                LongColumnVector::from_values(4, &[1, 1, 0, 1]).into(),
                LongColumnVector::from_options(4, &[Some(1), Some(0), Some(1), None]).into(),
            ],
            4,
        );
        FilterColumnColumn::<i64, i64, And>::new(0, 1).evaluate(&mut b);
        assert_eq!(b.selected(), &[0]);
    }

    #[test]
    fn test_output_contract() {
        let kernel = DoubleLteLong::new(0, 1);
        assert_eq!(kernel.output_column(), None);
        assert_eq!(kernel.output_type(), DataType::Bool);
        assert_eq!(kernel.columns(), (0, 1));
    }

    #[test]
    #[should_panic(expected = "kernel expects DOUBLE")]
    fn test_wrong_column_type_panics() {
        let mut b = VectorizedRowBatch::from_columns(
            vec![
                LongColumnVector::from_values(2, &[1, 2]).into(),
                LongColumnVector::from_values(2, &[1, 2]).into(),
            ],
            2,
        );
        DoubleLteLong::new(0, 1).evaluate(&mut b);
    }
}
