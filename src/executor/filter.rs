//! Filter executor implementation.
//!
//! This executor passes through the tuples of its child for which a bound
//! predicate evaluates to true. The output schema is the child's schema.

use crate::access::Tuple;
use crate::catalog::Schema;
use crate::executor::Executor;
use crate::expression::{evaluate_predicate, Expression, TypeChecker};
use anyhow::{bail, Result};

/// Executor that filters tuples based on an expression
pub struct FilterExecutor {
    /// Child executor that produces tuples
    child: Box<dyn Executor>,
    /// Predicate bound against the child's schema
    predicate: Expression,
    output_schema: Schema,
    initialized: bool,
}

impl FilterExecutor {
    pub fn new(child: Box<dyn Executor>, predicate: Expression) -> Self {
        let output_schema = child.output_schema().clone();
        Self {
            child,
            predicate,
            output_schema,
            initialized: false,
        }
    }
}

impl Executor for FilterExecutor {
    fn init(&mut self) -> Result<()> {
        self.child.init()?;

        // Type check the predicate before any tuple is read
        TypeChecker::new(&self.output_schema.data_types())
            .check_filter_predicate(&self.predicate)?;

        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        while let Some(tuple) = self.child.next()? {
            if evaluate_predicate(&self.predicate, tuple.values())? {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }

    fn output_schema(&self) -> &Schema {
        &self.output_schema
    }
}
