//! Contract tests for the filter kernels.
//!
//! These tests verify the selection contracts:
//! - Survivors keep their relative order
//! - Rows with a null operand never survive
//! - Repeating columns broadcast entry 0

use vexpr::executor::vectorized::{
    BytesColumnVector, ComparisonOp, DoubleColumnVector, FilterExprAnd, FilterExprOr,
    KernelRegistry, LogicalOp, LongColumnVector, VectorExpression, VectorizedRowBatch,
};
use vexpr::types::{DataType, PhysicalType, Scalar};

fn two_column_batch<A, B>(left: A, right: B, size: usize) -> VectorizedRowBatch
where
    A: Into<vexpr::ColumnVector>,
    B: Into<vexpr::ColumnVector>,
{
    VectorizedRowBatch::from_columns(vec![left.into(), right.into()], size)
}

fn filter(
    op: ComparisonOp,
    left: PhysicalType,
    right: PhysicalType,
) -> Box<dyn VectorExpression> {
    KernelRegistry::global()
        .filter(op, left, right, 0, 1)
        .expect("kernel exists")
}

// -------------------------------------------------------------------------
// Reference scenarios
// -------------------------------------------------------------------------

#[test]
fn test_double_lte_repeating_long() {
    let mut batch = two_column_batch(
        DoubleColumnVector::from_values(4, &[1.0, 2.0, 3.0, 4.0]),
        LongColumnVector::repeating(4, 2),
        4,
    );

    filter(ComparisonOp::Lte, PhysicalType::Double, PhysicalType::Long).evaluate(&mut batch);

    assert!(batch.selected_in_use());
    assert_eq!(batch.size(), 2);
    assert_eq!(batch.selected(), &[0, 1]);
}

#[test]
fn test_repeating_null_right_clears_batch() {
    let mut batch = two_column_batch(
        DoubleColumnVector::from_values(4, &[1.0, 2.0, 3.0, 4.0]),
        LongColumnVector::repeating_null(4),
        4,
    );

    filter(ComparisonOp::Lte, PhysicalType::Double, PhysicalType::Long).evaluate(&mut batch);

    assert_eq!(batch.size(), 0);
}

#[test]
fn test_repeating_left_with_active_selection() {
    let mut batch = two_column_batch(
        DoubleColumnVector::repeating(4, 5.0),
        LongColumnVector::from_values(4, &[1, 6, 3, 10]),
        4,
    );
    batch.set_selected(&[0, 2, 3]);

    filter(ComparisonOp::Lt, PhysicalType::Double, PhysicalType::Long).evaluate(&mut batch);

    assert!(batch.selected_in_use());
    assert_eq!(batch.selected(), &[3]);
}

// -------------------------------------------------------------------------
// Null handling
// -------------------------------------------------------------------------

#[test]
fn test_nulls_on_both_sides_are_excluded() {
    let mut batch = two_column_batch(
        LongColumnVector::from_options(5, &[Some(1), None, Some(3), Some(4), Some(5)]),
        LongColumnVector::from_options(5, &[Some(1), Some(2), None, Some(4), Some(9)]),
        5,
    );

    filter(ComparisonOp::Neq, PhysicalType::Long, PhysicalType::Long).evaluate(&mut batch);

    assert_eq!(batch.selected(), &[4]);
}

#[test]
fn test_repeating_non_null_against_nullable_column() {
    let mut batch = two_column_batch(
        LongColumnVector::repeating(4, 2),
        LongColumnVector::from_options(4, &[Some(2), None, Some(1), Some(2)]),
        4,
    );

    filter(ComparisonOp::Eq, PhysicalType::Long, PhysicalType::Long).evaluate(&mut batch);

    assert_eq!(batch.selected(), &[0, 3]);
}

#[test]
fn test_both_repeating_with_nulls_compares_broadcast_pair() {
    // Right column is nullable but its repeated value is not null.
    let mut right = LongColumnVector::repeating(4, 7);
    right.no_nulls = false;

    let mut batch = two_column_batch(LongColumnVector::repeating(4, 3), right, 4);
    filter(ComparisonOp::Gt, PhysicalType::Long, PhysicalType::Long).evaluate(&mut batch);
    assert_eq!(batch.size(), 0);

    let mut right = LongColumnVector::repeating(4, 1);
    right.no_nulls = false;
    let mut batch = two_column_batch(LongColumnVector::repeating(4, 3), right, 4);
    filter(ComparisonOp::Gt, PhysicalType::Long, PhysicalType::Long).evaluate(&mut batch);
    assert_eq!(batch.size(), 4);
    assert!(!batch.selected_in_use());
}

#[test]
fn test_stale_null_flags_are_ignored() {
    let mut left = LongColumnVector::from_values(3, &[1, 2, 3]);
    left.is_null.fill(true);

    let mut batch = two_column_batch(left, LongColumnVector::from_values(3, &[1, 2, 3]), 3);
    filter(ComparisonOp::Eq, PhysicalType::Long, PhysicalType::Long).evaluate(&mut batch);

    assert_eq!(batch.size(), 3);
}

// -------------------------------------------------------------------------
// Comparison semantics
// -------------------------------------------------------------------------

#[test]
fn test_nan_is_only_not_equal() {
    for op in ComparisonOp::ALL {
        let mut batch = two_column_batch(
            DoubleColumnVector::from_values(1, &[f64::NAN]),
            DoubleColumnVector::from_values(1, &[1.0]),
            1,
        );
        filter(op, PhysicalType::Double, PhysicalType::Double).evaluate(&mut batch);
        let expected = usize::from(op == ComparisonOp::Neq);
        assert_eq!(batch.size(), expected, "{op:?}");
    }
}

#[test]
fn test_bytes_compare_lexicographically() {
    let mut batch = two_column_batch(
        BytesColumnVector::from_values(3, &[b"apple".to_vec(), b"b".to_vec(), b"ab".to_vec()]),
        BytesColumnVector::repeating(3, b"abc".to_vec()),
        3,
    );

    filter(ComparisonOp::Lt, PhysicalType::Bytes, PhysicalType::Bytes).evaluate(&mut batch);

    assert_eq!(batch.selected(), &[2]);
}

#[test]
fn test_empty_batch_is_untouched() {
    let mut batch = two_column_batch(
        LongColumnVector::from_values(2, &[1, 2]),
        LongColumnVector::from_values(2, &[3, 4]),
        0,
    );
    let before = batch.selection().clone();

    filter(ComparisonOp::Lt, PhysicalType::Long, PhysicalType::Long).evaluate(&mut batch);

    assert_eq!(batch.selection(), &before);
}

#[test]
fn test_filter_reports_no_output_column() {
    let kernel = filter(ComparisonOp::Eq, PhysicalType::Long, PhysicalType::Long);
    assert_eq!(kernel.output_column(), None);
    assert_eq!(kernel.output_type(), DataType::Bool);
}

// -------------------------------------------------------------------------
// Literal operands
// -------------------------------------------------------------------------

#[test]
fn test_column_against_literal() {
    let mut batch = two_column_batch(
        LongColumnVector::from_options(4, &[Some(5), Some(15), None, Some(25)]),
        LongColumnVector::new(4),
        4,
    );

    KernelRegistry::global()
        .filter_column_scalar(ComparisonOp::Gte, PhysicalType::Long, 0, &Scalar::Double(15.0))
        .expect("kernel exists")
        .evaluate(&mut batch);

    assert_eq!(batch.selected(), &[1, 3]);
}

#[test]
fn test_literal_against_column() {
    let mut batch = two_column_batch(
        LongColumnVector::new(3),
        BytesColumnVector::from_values(3, &[b"x".to_vec(), b"y".to_vec(), b"z".to_vec()]),
        3,
    );

    KernelRegistry::global()
        .filter_scalar_column(ComparisonOp::Lt, &Scalar::from("x"), PhysicalType::Bytes, 1)
        .expect("kernel exists")
        .evaluate(&mut batch);

    assert_eq!(batch.selected(), &[1, 2]);
}

// -------------------------------------------------------------------------
// Logical combination
// -------------------------------------------------------------------------

#[test]
fn test_and_of_long_flags() {
    let mut batch = two_column_batch(
        LongColumnVector::from_values(4, &[1, 1, 0, 2]),
        LongColumnVector::from_values(4, &[1, 0, 1, 3]),
        4,
    );

    KernelRegistry::global()
        .filter(LogicalOp::And, PhysicalType::Long, PhysicalType::Long, 0, 1)
        .expect("kernel exists")
        .evaluate(&mut batch);

    assert_eq!(batch.selected(), &[0, 3]);
}

#[test]
fn test_or_combinator_keeps_original_order() {
    let registry = KernelRegistry::global();
    let mut batch = two_column_batch(
        LongColumnVector::from_values(5, &[1, 9, 3, 8, 5]),
        LongColumnVector::new(5),
        5,
    );

    let or = FilterExprOr::new(vec![
        registry
            .filter_column_scalar(ComparisonOp::Gt, PhysicalType::Long, 0, &Scalar::Long(7))
            .unwrap(),
        registry
            .filter_column_scalar(ComparisonOp::Lt, PhysicalType::Long, 0, &Scalar::Long(2))
            .unwrap(),
    ]);
    or.evaluate(&mut batch);

    assert_eq!(batch.selected(), &[0, 1, 3]);
}

#[test]
fn test_and_combinator_applies_children_in_sequence() {
    let registry = KernelRegistry::global();
    let mut batch = two_column_batch(
        LongColumnVector::from_values(5, &[1, 9, 3, 8, 5]),
        LongColumnVector::new(5),
        5,
    );

    let and = FilterExprAnd::new(vec![
        registry
            .filter_column_scalar(ComparisonOp::Gt, PhysicalType::Long, 0, &Scalar::Long(2))
            .unwrap(),
        registry
            .filter_column_scalar(ComparisonOp::Lt, PhysicalType::Long, 0, &Scalar::Long(9))
            .unwrap(),
    ]);
    and.evaluate(&mut batch);

    assert_eq!(batch.selected(), &[2, 3, 4]);
}
