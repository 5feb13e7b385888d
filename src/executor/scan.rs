//! Scan over an in-memory relation.

use crate::access::Tuple;
use crate::catalog::Schema;
use crate::executor::Executor;
use crate::relation::Relation;
use anyhow::{bail, Result};
use std::sync::Arc;

/// Executor that yields every tuple of a relation snapshot
pub struct RelationScanExecutor {
    relation: Arc<Relation>,
    schema: Schema,
    tuples: Vec<Tuple>,
    position: usize,
    initialized: bool,
}

impl RelationScanExecutor {
    pub fn new(relation: Arc<Relation>) -> Self {
        let schema = relation.schema().clone();
        Self {
            relation,
            schema,
            tuples: Vec::new(),
            position: 0,
            initialized: false,
        }
    }
}

impl Executor for RelationScanExecutor {
    fn init(&mut self) -> Result<()> {
        self.tuples = self.relation.iter().cloned().collect();
        self.position = 0;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }
        let tuple = self.tuples.get(self.position).cloned();
        if tuple.is_some() {
            self.position += 1;
        }
        Ok(tuple)
    }

    fn output_schema(&self) -> &Schema {
        &self.schema
    }
}
