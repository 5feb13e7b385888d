//! Executor layer for query execution.
//!
//! This module implements the Volcano-style iterator model for executing
//! physical plans. Each executor produces tuples one at a time via the
//! `next()` method, which keeps operators composable: every executor's
//! output is again a stream of tuples over a known schema.

use crate::access::Tuple;
use crate::catalog::Schema;
use crate::relation::Relation;
use anyhow::Result;
use std::collections::BTreeSet;

pub mod cross_product;
pub mod filter;
pub mod hash_join;
pub mod nested_loop_join;
pub mod projection;
pub mod rename;
pub mod scan;
pub mod set_operation;
pub mod sort_merge_join;

pub use cross_product::CrossProductExecutor;
pub use filter::FilterExecutor;
pub use hash_join::HashJoinExecutor;
pub use nested_loop_join::NestedLoopJoinExecutor;
pub use projection::ProjectionExecutor;
pub use rename::RenameExecutor;
pub use scan::RelationScanExecutor;
pub use set_operation::{SetOperationExecutor, SetOperator};
pub use sort_merge_join::SortMergeJoinExecutor;

/// Trait for all query executors
pub trait Executor: Send {
    /// Initialize the executor. This must be called before `next()`.
    fn init(&mut self) -> Result<()>;

    /// Get the next tuple from the executor.
    /// Returns None when there are no more tuples.
    fn next(&mut self) -> Result<Option<Tuple>>;

    /// Get the output schema of this executor
    fn output_schema(&self) -> &Schema;
}

/// Run an executor to completion and gather its output into a relation
pub fn collect(mut executor: Box<dyn Executor>) -> Result<Relation> {
    executor.init()?;
    let mut tuples = BTreeSet::new();
    while let Some(tuple) = executor.next()? {
        tuples.insert(tuple);
    }
    Ok(Relation::from_trusted(
        executor.output_schema().clone(),
        tuples,
    ))
}

/// Drain a child executor into memory
pub(crate) fn materialize(executor: &mut dyn Executor) -> Result<Vec<Tuple>> {
    let mut tuples = Vec::new();
    while let Some(tuple) = executor.next()? {
        tuples.push(tuple);
    }
    Ok(tuples)
}
