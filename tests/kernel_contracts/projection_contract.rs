//! Contract tests for the projection kernels.

use vexpr::executor::vectorized::{
    ArithmeticOp, ColumnVector, ComparisonOp, DoubleColumnVector, KernelRegistry,
    LongColumnVector, VectorElement, VectorizedRowBatch,
};
use vexpr::types::{DataType, PhysicalType};

fn batch(left: ColumnVector, right: ColumnVector, output: PhysicalType, size: usize) -> VectorizedRowBatch {
    let capacity = left.capacity();
    VectorizedRowBatch::from_columns(vec![left, right, ColumnVector::new(output, capacity)], size)
}

#[test]
fn test_mixed_arithmetic_widens_to_double() {
    let mut b = batch(
        LongColumnVector::from_values(3, &[1, 2, 3]).into(),
        DoubleColumnVector::from_values(3, &[0.5, 0.5, 0.5]).into(),
        PhysicalType::Double,
        3,
    );

    let kernel = KernelRegistry::global()
        .project(ArithmeticOp::Add, PhysicalType::Long, PhysicalType::Double, 0, 1, 2)
        .expect("kernel exists");
    assert_eq!(kernel.output_type(), DataType::Float64);
    kernel.evaluate(&mut b);

    let out = f64::column(b.column(2));
    assert_eq!(out.vector, vec![1.5, 2.5, 3.5]);
}

#[test]
fn test_long_arithmetic_wraps() {
    let mut b = batch(
        LongColumnVector::from_values(1, &[i64::MAX]).into(),
        LongColumnVector::from_values(1, &[1]).into(),
        PhysicalType::Long,
        1,
    );

    KernelRegistry::global()
        .project(ArithmeticOp::Add, PhysicalType::Long, PhysicalType::Long, 0, 1, 2)
        .unwrap()
        .evaluate(&mut b);

    assert_eq!(i64::column(b.column(2)).vector[0], i64::MIN);
}

#[test]
fn test_projection_leaves_selection_alone() {
    let mut b = batch(
        LongColumnVector::from_values(4, &[1, 2, 3, 4]).into(),
        LongColumnVector::repeating(4, 10).into(),
        PhysicalType::Long,
        4,
    );
    b.set_selected(&[1, 3]);

    KernelRegistry::global()
        .project(ArithmeticOp::Sub, PhysicalType::Long, PhysicalType::Long, 0, 1, 2)
        .unwrap()
        .evaluate(&mut b);

    assert_eq!(b.selected(), &[1, 3]);
    let out = i64::column(b.column(2));
    assert_eq!(out.vector[1], -8);
    assert_eq!(out.vector[3], -6);
}

#[test]
fn test_comparison_projection_yields_flags() {
    let mut b = batch(
        DoubleColumnVector::from_options(3, &[Some(1.0), None, Some(4.0)]).into(),
        LongColumnVector::repeating(3, 2).into(),
        PhysicalType::Long,
        3,
    );

    let kernel = KernelRegistry::global()
        .project(ComparisonOp::Gt, PhysicalType::Double, PhysicalType::Long, 0, 1, 2)
        .unwrap();
    assert_eq!(kernel.output_type(), DataType::Bool);
    kernel.evaluate(&mut b);

    let out = i64::column(b.column(2));
    assert_eq!(out.value_at(0), Some(&0));
    assert_eq!(out.value_at(1), None);
    assert_eq!(out.value_at(2), Some(&1));
}

#[test]
fn test_division_always_produces_double() {
    let mut b = batch(
        LongColumnVector::from_values(2, &[7, 7]).into(),
        LongColumnVector::from_values(2, &[2, 0]).into(),
        PhysicalType::Double,
        2,
    );

    KernelRegistry::global()
        .project(ArithmeticOp::Div, PhysicalType::Long, PhysicalType::Long, 0, 1, 2)
        .unwrap()
        .evaluate(&mut b);

    let out = f64::column(b.column(2));
    assert_eq!(out.value_at(0), Some(&3.5));
    assert_eq!(out.value_at(1), None);
}
