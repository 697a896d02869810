//! Conjunction and disjunction of filter expressions.

use crate::types::DataType;

use super::batch::VectorizedRowBatch;
use super::evaluator::VectorExpression;

fn assert_filters(children: &[Box<dyn VectorExpression>]) {
    assert!(
        children.iter().all(|c| c.output_column().is_none()),
        "filter combinators only accept filter expressions"
    );
}

/// Keeps the rows that pass every child filter.
#[derive(Debug)]
pub struct FilterExprAnd {
    children: Vec<Box<dyn VectorExpression>>,
}

impl FilterExprAnd {
    /// Creates a conjunction of `children`, applied in order.
    ///
    /// # Panics
    ///
    /// Panics if a child is a projection expression.
    #[must_use]
    pub fn new(children: Vec<Box<dyn VectorExpression>>) -> Self {
        assert_filters(&children);
        FilterExprAnd { children }
    }
}

impl VectorExpression for FilterExprAnd {
    fn evaluate(&self, batch: &mut VectorizedRowBatch) {
        for child in &self.children {
            if batch.size() == 0 {
                return;
            }
            child.evaluate(batch);
        }
    }

    fn output_column(&self) -> Option<usize> {
        None
    }

    fn output_type(&self) -> DataType {
        DataType::Bool
    }
}

/// Keeps the rows that pass at least one child filter, in input order.
///
/// Each child only sees the rows no earlier child has accepted.
#[derive(Debug)]
pub struct FilterExprOr {
    children: Vec<Box<dyn VectorExpression>>,
}

impl FilterExprOr {
    /// Creates a disjunction of `children`.
    ///
    /// # Panics
    ///
    /// Panics if a child is a projection expression.
    #[must_use]
    pub fn new(children: Vec<Box<dyn VectorExpression>>) -> Self {
        assert_filters(&children);
        FilterExprOr { children }
    }
}

impl VectorExpression for FilterExprOr {
    fn evaluate(&self, batch: &mut VectorizedRowBatch) {
        if batch.size() == 0 {
            return;
        }

        let input = batch.selection().clone();
        let mut accepted = vec![false; batch.capacity()];
        let mut remaining: Vec<usize> = input.iter().collect();

        for child in &self.children {
            batch.set_selected(&remaining);
            child.evaluate(batch);
            for row in batch.live_rows() {
                accepted[row] = true;
            }
            remaining.retain(|&row| !accepted[row]);
            if remaining.is_empty() {
                break;
            }
        }

        *batch.selection_mut() = input;
        batch.selection_mut().retain(|row| accepted[row]);
    }

    fn output_column(&self) -> Option<usize> {
        None
    }

    fn output_type(&self) -> DataType {
        DataType::Bool
    }
}
