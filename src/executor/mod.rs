//! Executor module for vectorized expression evaluation.
//!
//! This module provides the batch pipeline that feeds row batches through an
//! ordered sequence of resolved kernels. Kernels communicate only through the
//! batch they share; independent batches may be processed in parallel.

pub mod vectorized;

use rayon::prelude::*;

use self::vectorized::{VectorExpression, VectorizedRowBatch, DEFAULT_BATCH_SIZE};

/// Configuration for the batch executor.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Number of rows per batch for vectorized execution.
    pub batch_size: usize,
    /// Whether independent batches are evaluated on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            parallel: true,
        }
    }
}

impl ExecutorConfig {
    /// Creates a new executor configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Enables or disables parallel batch evaluation.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// An ordered sequence of kernels applied to every batch.
#[derive(Debug)]
pub struct VectorPipeline {
    config: ExecutorConfig,
    expressions: Vec<Box<dyn VectorExpression>>,
}

impl VectorPipeline {
    /// Creates a pipeline with the default configuration.
    #[must_use]
    pub fn new(expressions: Vec<Box<dyn VectorExpression>>) -> Self {
        Self::with_config(ExecutorConfig::default(), expressions)
    }

    /// Creates a pipeline with the given configuration.
    #[must_use]
    pub fn with_config(config: ExecutorConfig, expressions: Vec<Box<dyn VectorExpression>>) -> Self {
        Self {
            config,
            expressions,
        }
    }

    /// Returns the executor configuration.
    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Returns the kernels in evaluation order.
    #[must_use]
    pub fn expressions(&self) -> &[Box<dyn VectorExpression>] {
        &self.expressions
    }

    /// Allocates an empty batch with the configured capacity.
    #[must_use]
    pub fn new_batch(&self, types: &[crate::types::PhysicalType]) -> VectorizedRowBatch {
        VectorizedRowBatch::new(types, self.config.batch_size)
    }

    /// Runs every kernel over the batch, in order.
    ///
    /// Stops early once no rows are live.
    pub fn evaluate(&self, batch: &mut VectorizedRowBatch) {
        for expression in &self.expressions {
            if batch.size() == 0 {
                return;
            }
            expression.evaluate(batch);
        }
    }

    /// Runs the pipeline over independent batches.
    pub fn evaluate_all(&self, batches: &mut [VectorizedRowBatch]) {
        if self.config.parallel {
            batches.par_iter_mut().for_each(|batch| self.evaluate(batch));
        } else {
            for batch in batches {
                self.evaluate(batch);
            }
        }
    }
}
