//! Kernel registry: resolves (operator, operand types) to a specialized kernel.
//!
//! The registry is filled once from the closed set of supported combinations by
//! instantiating the generic kernels for each type pair, then only read.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use tracing::debug;

use crate::error::{Result, VexprError};
use crate::types::{PhysicalType, Scalar};

use super::column::VectorElement;
use super::evaluator::{Operator, VectorExpression};
use super::filter::FilterColumnColumn;
use super::predicate::{
    Add, And, BinaryOp, Compare, Divide, Equal, Greater, GreaterEqual, Less, LessEqual, MixedOrd,
    Multiply, NotEqual, NumericPair, Predicate, Subtract,
};
use super::projection::ColumnBinaryColumn;
use super::scalar::{FilterColumnScalar, FilterScalarColumn};

/// Operand layout of a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelShape {
    /// Filter over two columns.
    ColumnColumn,
    /// Filter with a column on the left and a literal on the right.
    ColumnScalar,
    /// Filter with a literal on the left and a column on the right.
    ScalarColumn,
    /// Projection of two columns into an output column.
    Projection,
}

impl KernelShape {
    /// Returns the name of this shape.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            KernelShape::ColumnColumn => "filter col/col",
            KernelShape::ColumnScalar => "filter col/scalar",
            KernelShape::ScalarColumn => "filter scalar/col",
            KernelShape::Projection => "project col/col",
        }
    }
}

impl fmt::Display for KernelShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct KernelKey {
    shape: KernelShape,
    op: Operator,
    left: PhysicalType,
    right: PhysicalType,
}

type FilterFactory = fn(usize, usize) -> Box<dyn VectorExpression>;
type ColumnScalarFactory = fn(usize, &Scalar) -> Option<Box<dyn VectorExpression>>;
type ScalarColumnFactory = fn(&Scalar, usize) -> Option<Box<dyn VectorExpression>>;
type ProjectionFactory = fn(usize, usize, usize) -> Box<dyn VectorExpression>;

#[derive(Clone, Copy)]
enum Factory {
    Filter(FilterFactory),
    ColumnScalar(ColumnScalarFactory),
    ScalarColumn(ScalarColumnFactory),
    Projection(ProjectionFactory),
}

fn filter_factory<L, R, P>(left: usize, right: usize) -> Box<dyn VectorExpression>
where
    L: VectorElement,
    R: VectorElement,
    P: Predicate<L, R>,
{
    Box::new(FilterColumnColumn::<L, R, P>::new(left, right))
}

fn column_scalar_factory<C, S, P>(column: usize, scalar: &Scalar) -> Option<Box<dyn VectorExpression>>
where
    C: VectorElement,
    S: VectorElement,
    P: Predicate<C, S>,
{
    let value = S::from_scalar(scalar)?;
    Some(Box::new(FilterColumnScalar::<C, S, P>::new(column, value)))
}

fn scalar_column_factory<S, C, P>(scalar: &Scalar, column: usize) -> Option<Box<dyn VectorExpression>>
where
    S: VectorElement,
    C: VectorElement,
    P: Predicate<S, C>,
{
    let value = S::from_scalar(scalar)?;
    Some(Box::new(FilterScalarColumn::<S, C, P>::new(value, column)))
}

fn projection_factory<L, R, Op>(left: usize, right: usize, output: usize) -> Box<dyn VectorExpression>
where
    L: VectorElement,
    R: VectorElement,
    Op: BinaryOp<L, R>,
{
    Box::new(ColumnBinaryColumn::<L, R, Op>::new(left, right, output))
}

/// Lookup from (shape, operator, left type, right type) to a kernel constructor.
///
/// Resolution happens once per compiled expression; a missing combination is
/// a plan-time [`VexprError::UnsupportedCombination`].
pub struct KernelRegistry {
    factories: HashMap<KernelKey, Factory>,
}

impl fmt::Debug for KernelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelRegistry")
            .field("kernels", &self.factories.len())
            .finish()
    }
}

impl Default for KernelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelRegistry {
    /// Builds a registry holding every supported combination.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = KernelRegistry {
            factories: HashMap::new(),
        };

        registry.register_comparisons::<i64, i64>();
        registry.register_comparisons::<i64, f64>();
        registry.register_comparisons::<f64, i64>();
        registry.register_comparisons::<f64, f64>();
        registry.register_comparisons::<Vec<u8>, Vec<u8>>();

        registry.register_filter::<i64, i64, And>();

        registry.register_arithmetic::<i64, i64>();
        registry.register_arithmetic::<i64, f64>();
        registry.register_arithmetic::<f64, i64>();
        registry.register_arithmetic::<f64, f64>();

        debug!(kernels = registry.len(), "kernel registry populated");
        registry
    }

    /// Returns the process-wide registry, building it on first use.
    pub fn global() -> &'static KernelRegistry {
        static REGISTRY: OnceLock<KernelRegistry> = OnceLock::new();
        REGISTRY.get_or_init(KernelRegistry::new)
    }

    /// Returns the number of registered combinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Returns whether a kernel exists for the combination.
    #[must_use]
    pub fn supports(
        &self,
        shape: KernelShape,
        op: impl Into<Operator>,
        left: PhysicalType,
        right: PhysicalType,
    ) -> bool {
        self.factories.contains_key(&KernelKey {
            shape,
            op: op.into(),
            left,
            right,
        })
    }

    /// Resolves a column/column filter bound to `left_col` and `right_col`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedCombination` if no specialization exists.
    pub fn filter(
        &self,
        op: impl Into<Operator>,
        left: PhysicalType,
        right: PhysicalType,
        left_col: usize,
        right_col: usize,
    ) -> Result<Box<dyn VectorExpression>> {
        let key = KernelKey {
            shape: KernelShape::ColumnColumn,
            op: op.into(),
            left,
            right,
        };
        match self.lookup(key)? {
            Factory::Filter(make) => Ok(make(left_col, right_col)),
            _ => Err(unsupported(key)),
        }
    }

    /// Resolves a filter comparing `column` against a literal.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedCombination` if no specialization exists.
    pub fn filter_column_scalar(
        &self,
        op: impl Into<Operator>,
        column_type: PhysicalType,
        column: usize,
        scalar: &Scalar,
    ) -> Result<Box<dyn VectorExpression>> {
        let key = KernelKey {
            shape: KernelShape::ColumnScalar,
            op: op.into(),
            left: column_type,
            right: scalar.physical_type(),
        };
        match self.lookup(key)? {
            Factory::ColumnScalar(make) => make(column, scalar).ok_or_else(|| unsupported(key)),
            _ => Err(unsupported(key)),
        }
    }

    /// Resolves a filter comparing a literal against `column`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedCombination` if no specialization exists.
    pub fn filter_scalar_column(
        &self,
        op: impl Into<Operator>,
        scalar: &Scalar,
        column_type: PhysicalType,
        column: usize,
    ) -> Result<Box<dyn VectorExpression>> {
        let key = KernelKey {
            shape: KernelShape::ScalarColumn,
            op: op.into(),
            left: scalar.physical_type(),
            right: column_type,
        };
        match self.lookup(key)? {
            Factory::ScalarColumn(make) => make(scalar, column).ok_or_else(|| unsupported(key)),
            _ => Err(unsupported(key)),
        }
    }

    /// Resolves a projection writing into `output_col`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidColumnBinding` if `output_col` is also an input column,
    /// or `UnsupportedCombination` if no specialization exists.
    pub fn project(
        &self,
        op: impl Into<Operator>,
        left: PhysicalType,
        right: PhysicalType,
        left_col: usize,
        right_col: usize,
        output_col: usize,
    ) -> Result<Box<dyn VectorExpression>> {
        if output_col == left_col || output_col == right_col {
            return Err(VexprError::InvalidColumnBinding(format!(
                "output column {output_col} overlaps input columns ({left_col}, {right_col})"
            )));
        }
        let key = KernelKey {
            shape: KernelShape::Projection,
            op: op.into(),
            left,
            right,
        };
        match self.lookup(key)? {
            Factory::Projection(make) => Ok(make(left_col, right_col, output_col)),
            _ => Err(unsupported(key)),
        }
    }

    fn lookup(&self, key: KernelKey) -> Result<Factory> {
        self.factories
            .get(&key)
            .copied()
            .ok_or_else(|| unsupported(key))
    }

    fn insert(&mut self, key: KernelKey, factory: Factory) {
        let previous = self.factories.insert(key, factory);
        debug_assert!(previous.is_none(), "duplicate kernel registration {key:?}");
    }

    fn register_filter<L, R, P>(&mut self)
    where
        L: VectorElement,
        R: VectorElement,
        P: Predicate<L, R>,
    {
        self.insert(
            KernelKey {
                shape: KernelShape::ColumnColumn,
                op: P::OP,
                left: L::PHYSICAL,
                right: R::PHYSICAL,
            },
            Factory::Filter(filter_factory::<L, R, P>),
        );
    }

    fn register_projection<L, R, Op>(&mut self)
    where
        L: VectorElement,
        R: VectorElement,
        Op: BinaryOp<L, R>,
    {
        self.insert(
            KernelKey {
                shape: KernelShape::Projection,
                op: Op::OP,
                left: L::PHYSICAL,
                right: R::PHYSICAL,
            },
            Factory::Projection(projection_factory::<L, R, Op>),
        );
    }

    /// Registers every shape of one comparison over `(L, R)`.
    fn register_comparison<L, R, P>(&mut self)
    where
        L: VectorElement,
        R: VectorElement,
        P: Predicate<L, R>,
    {
        self.register_filter::<L, R, P>();
        self.insert(
            KernelKey {
                shape: KernelShape::ColumnScalar,
                op: P::OP,
                left: L::PHYSICAL,
                right: R::PHYSICAL,
            },
            Factory::ColumnScalar(column_scalar_factory::<L, R, P>),
        );
        self.insert(
            KernelKey {
                shape: KernelShape::ScalarColumn,
                op: P::OP,
                left: L::PHYSICAL,
                right: R::PHYSICAL,
            },
            Factory::ScalarColumn(scalar_column_factory::<L, R, P>),
        );
        self.register_projection::<L, R, Compare<P>>();
    }

    fn register_comparisons<L, R>(&mut self)
    where
        L: VectorElement + MixedOrd<R>,
        R: VectorElement,
    {
        self.register_comparison::<L, R, Equal>();
        self.register_comparison::<L, R, NotEqual>();
        self.register_comparison::<L, R, Less>();
        self.register_comparison::<L, R, LessEqual>();
        self.register_comparison::<L, R, Greater>();
        self.register_comparison::<L, R, GreaterEqual>();
    }

    fn register_arithmetic<L, R>(&mut self)
    where
        L: NumericPair<R>,
        R: super::predicate::Numeric,
    {
        self.register_projection::<L, R, Add>();
        self.register_projection::<L, R, Subtract>();
        self.register_projection::<L, R, Multiply>();
        self.register_projection::<L, R, Divide>();
    }
}

fn unsupported(key: KernelKey) -> VexprError {
    VexprError::unsupported(format!("{} {}", key.shape, key.op), key.left, key.right)
}
