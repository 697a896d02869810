//! Contract tests for kernel resolution.

use vexpr::executor::vectorized::{
    ArithmeticOp, ComparisonOp, KernelRegistry, KernelShape, LogicalOp,
};
use vexpr::types::{PhysicalType, Scalar};
use vexpr::VexprError;

const NUMERIC: [PhysicalType; 2] = [PhysicalType::Long, PhysicalType::Double];

#[test]
fn test_every_numeric_comparison_resolves() {
    let registry = KernelRegistry::global();
    for op in ComparisonOp::ALL {
        for left in NUMERIC {
            for right in NUMERIC {
                for shape in [
                    KernelShape::ColumnColumn,
                    KernelShape::ColumnScalar,
                    KernelShape::ScalarColumn,
                    KernelShape::Projection,
                ] {
                    assert!(
                        registry.supports(shape, op, left, right),
                        "{shape} {op:?} ({left}, {right})"
                    );
                }
            }
        }
    }
}

#[test]
fn test_bytes_only_compare_with_bytes() {
    let registry = KernelRegistry::global();
    assert!(registry.supports(
        KernelShape::ColumnColumn,
        ComparisonOp::Eq,
        PhysicalType::Bytes,
        PhysicalType::Bytes
    ));
    for other in NUMERIC {
        let err = registry
            .filter(ComparisonOp::Eq, PhysicalType::Bytes, other, 0, 1)
            .unwrap_err();
        assert!(matches!(err, VexprError::UnsupportedCombination { .. }));
    }
}

#[test]
fn test_unsupported_combinations_are_plan_time_errors() {
    let registry = KernelRegistry::global();

    let err = registry
        .filter(LogicalOp::And, PhysicalType::Double, PhysicalType::Long, 0, 1)
        .unwrap_err();
    assert!(err.to_string().contains("DOUBLE"));

    assert!(registry
        .filter(LogicalOp::Or, PhysicalType::Long, PhysicalType::Long, 0, 1)
        .is_err());
    assert!(registry
        .project(ArithmeticOp::Add, PhysicalType::Bytes, PhysicalType::Bytes, 0, 1, 2)
        .is_err());
    assert!(registry
        .filter_column_scalar(ComparisonOp::Lt, PhysicalType::Long, 0, &Scalar::from("a"))
        .is_err());
}

#[test]
fn test_resolution_is_repeatable() {
    let registry = KernelRegistry::global();
    let a = registry
        .filter(ComparisonOp::Lt, PhysicalType::Long, PhysicalType::Double, 3, 4)
        .unwrap();
    let b = registry
        .filter(ComparisonOp::Lt, PhysicalType::Long, PhysicalType::Double, 3, 4)
        .unwrap();
    assert_eq!(format!("{a:?}"), format!("{b:?}"));
}

#[test]
fn test_overlapping_projection_output_is_plan_time_error() {
    let err = KernelRegistry::global()
        .project(ArithmeticOp::Sub, PhysicalType::Double, PhysicalType::Long, 0, 1, 1)
        .unwrap_err();
    assert!(matches!(err, VexprError::InvalidColumnBinding(_)));
    assert!(err.to_string().contains("output column 1"));
}
