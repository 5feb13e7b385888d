//! Sort-merge join executor.
//!
//! Both inputs are drained and sorted on their join keys during `init`.
//! `next` then walks the two sorted runs in step; whenever the keys agree it
//! emits the cross product of the two equal-key blocks.

use crate::access::{Tuple, Value};
use crate::catalog::Schema;
use crate::executor::hash_join::{check_join_keys, key_values};
use crate::executor::{materialize, Executor};
use crate::expression::{evaluate_predicate, Expression, TypeChecker};
use anyhow::{bail, Result};
use std::cmp::Ordering;

/// Pair of equal-key ranges currently being emitted
struct Block {
    left_end: usize,
    right_start: usize,
    right_end: usize,
    left: usize,
    right: usize,
}

pub struct SortMergeJoinExecutor {
    left_child: Box<dyn Executor>,
    right_child: Box<dyn Executor>,
    left_keys: Vec<usize>,
    right_keys: Vec<usize>,
    residual: Option<Expression>,
    output_schema: Schema,
    /// Sorted inputs with their extracted keys
    left_run: Vec<(Vec<Value>, Tuple)>,
    right_run: Vec<(Vec<Value>, Tuple)>,
    left_position: usize,
    right_position: usize,
    block: Option<Block>,
    initialized: bool,
}

impl SortMergeJoinExecutor {
    pub fn new(
        left_child: Box<dyn Executor>,
        right_child: Box<dyn Executor>,
        left_keys: Vec<usize>,
        right_keys: Vec<usize>,
        residual: Option<Expression>,
    ) -> Result<Self> {
        check_join_keys(
            left_child.output_schema(),
            right_child.output_schema(),
            &left_keys,
            &right_keys,
        )?;
        let output_schema = left_child
            .output_schema()
            .concat(right_child.output_schema());
        Ok(Self {
            left_child,
            right_child,
            left_keys,
            right_keys,
            residual,
            output_schema,
            left_run: Vec::new(),
            right_run: Vec::new(),
            left_position: 0,
            right_position: 0,
            block: None,
            initialized: false,
        })
    }

    /// Advance past the next pair of equal-key blocks, or return false when
    /// either run is exhausted
    fn next_block(&mut self) -> bool {
        while self.left_position < self.left_run.len() && self.right_position < self.right_run.len()
        {
            let left_key = &self.left_run[self.left_position].0;
            let right_key = &self.right_run[self.right_position].0;
            match left_key.cmp(right_key) {
                Ordering::Less => self.left_position += 1,
                Ordering::Greater => self.right_position += 1,
                Ordering::Equal => {
                    let left_end = block_end(&self.left_run, self.left_position);
                    let right_end = block_end(&self.right_run, self.right_position);
                    self.block = Some(Block {
                        left_end,
                        right_start: self.right_position,
                        right_end,
                        left: self.left_position,
                        right: self.right_position,
                    });
                    self.left_position = left_end;
                    self.right_position = right_end;
                    return true;
                }
            }
        }
        false
    }
}

/// First position after `start` whose key differs from the key at `start`
fn block_end(run: &[(Vec<Value>, Tuple)], start: usize) -> usize {
    let key = &run[start].0;
    run[start..]
        .iter()
        .position(|(k, _)| k != key)
        .map_or(run.len(), |offset| start + offset)
}

fn sorted_run(tuples: Vec<Tuple>, keys: &[usize]) -> Vec<(Vec<Value>, Tuple)> {
    let mut run: Vec<_> = tuples
        .into_iter()
        .map(|t| (key_values(&t, keys), t))
        .collect();
    run.sort_by(|a, b| a.0.cmp(&b.0));
    run
}

impl Executor for SortMergeJoinExecutor {
    fn init(&mut self) -> Result<()> {
        self.left_child.init()?;
        self.right_child.init()?;

        if let Some(residual) = &self.residual {
            TypeChecker::new(&self.output_schema.data_types()).check_filter_predicate(residual)?;
        }

        self.left_run = sorted_run(materialize(self.left_child.as_mut())?, &self.left_keys);
        self.right_run = sorted_run(materialize(self.right_child.as_mut())?, &self.right_keys);
        self.left_position = 0;
        self.right_position = 0;
        self.block = None;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        loop {
            if let Some(block) = &mut self.block {
                while block.left < block.left_end {
                    let combined = self.left_run[block.left]
                        .1
                        .concat(&self.right_run[block.right].1);
                    block.right += 1;
                    if block.right == block.right_end {
                        block.right = block.right_start;
                        block.left += 1;
                    }
                    let accepted = match &self.residual {
                        Some(condition) => evaluate_predicate(condition, combined.values())?,
                        None => true,
                    };
                    if accepted {
                        return Ok(Some(combined));
                    }
                }
                self.block = None;
            }

            if !self.next_block() {
                return Ok(None);
            }
        }
    }

    fn output_schema(&self) -> &Schema {
        &self.output_schema
    }
}
