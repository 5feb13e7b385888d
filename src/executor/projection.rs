//! Projection executor implementation.
//!
//! Keeps a subset of the child's attributes, in the requested order.
//! Projection can map distinct input tuples onto the same output tuple, so
//! the executor remembers what it has emitted and suppresses repeats.

use crate::access::Tuple;
use crate::catalog::Schema;
use crate::executor::Executor;
use anyhow::{bail, Result};
use std::collections::HashSet;

/// Executor that projects specific columns from input tuples
pub struct ProjectionExecutor {
    child: Box<dyn Executor>,
    /// Positions in the child's tuples to keep
    column_indices: Vec<usize>,
    output_schema: Schema,
    /// Tuples already produced
    seen: HashSet<Tuple>,
    initialized: bool,
}

impl ProjectionExecutor {
    /// Create a new projection executor
    ///
    /// # Arguments
    /// * `child` - The child executor that produces tuples
    /// * `column_indices` - The indices of columns to project (0-based)
    pub fn new(child: Box<dyn Executor>, column_indices: Vec<usize>) -> Result<Self> {
        let child_schema = child.output_schema();
        for &index in &column_indices {
            if index >= child_schema.len() {
                bail!(
                    "Column index {} out of bounds (input has {} attributes)",
                    index,
                    child_schema.len()
                );
            }
        }
        let output_schema = child_schema.project(&column_indices);
        Ok(Self {
            child,
            column_indices,
            output_schema,
            seen: HashSet::new(),
            initialized: false,
        })
    }
}

impl Executor for ProjectionExecutor {
    fn init(&mut self) -> Result<()> {
        self.child.init()?;
        self.seen.clear();
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        while let Some(tuple) = self.child.next()? {
            let projected = tuple.project(&self.column_indices);
            if self.seen.insert(projected.clone()) {
                return Ok(Some(projected));
            }
        }
        Ok(None)
    }

    fn output_schema(&self) -> &Schema {
        &self.output_schema
    }
}
