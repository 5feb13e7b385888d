//! Union, intersection and difference of two union-compatible inputs.
//!
//! The right input is drained into a hash set during `init`; the left input
//! then streams. Union emits the left tuples followed by the right tuples the
//! left side did not produce.

use crate::access::Tuple;
use crate::catalog::Schema;
use crate::executor::{materialize, Executor};
use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    Intersect,
    Difference,
}

impl SetOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetOperator::Union => "UNION",
            SetOperator::Intersect => "INTERSECT",
            SetOperator::Difference => "MINUS",
        }
    }
}

impl fmt::Display for SetOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub struct SetOperationExecutor {
    operator: SetOperator,
    left: Box<dyn Executor>,
    right: Box<dyn Executor>,
    right_tuples: Vec<Tuple>,
    right_set: HashSet<Tuple>,
    /// Left tuples seen so far, used by union to skip right duplicates
    emitted: HashSet<Tuple>,
    left_done: bool,
    right_position: usize,
    initialized: bool,
}

impl SetOperationExecutor {
    /// Create a set operation; both inputs must be union compatible.
    pub fn new(
        operator: SetOperator,
        left: Box<dyn Executor>,
        right: Box<dyn Executor>,
    ) -> Result<Self> {
        left.output_schema()
            .check_union_compatible(right.output_schema())
            .with_context(|| format!("{} requires union-compatible inputs", operator))?;
        Ok(Self {
            operator,
            left,
            right,
            right_tuples: Vec::new(),
            right_set: HashSet::new(),
            emitted: HashSet::new(),
            left_done: false,
            right_position: 0,
            initialized: false,
        })
    }
}

impl Executor for SetOperationExecutor {
    fn init(&mut self) -> Result<()> {
        self.left.init()?;
        self.right.init()?;
        self.right_tuples = materialize(self.right.as_mut())?;
        self.right_set = self.right_tuples.iter().cloned().collect();
        self.emitted.clear();
        self.left_done = false;
        self.right_position = 0;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        if !self.left_done {
            while let Some(tuple) = self.left.next()? {
                let keep = match self.operator {
                    SetOperator::Union => true,
                    SetOperator::Intersect => self.right_set.contains(&tuple),
                    SetOperator::Difference => !self.right_set.contains(&tuple),
                };
                if keep && self.emitted.insert(tuple.clone()) {
                    return Ok(Some(tuple));
                }
            }
            self.left_done = true;
        }

        if self.operator == SetOperator::Union {
            while let Some(tuple) = self.right_tuples.get(self.right_position) {
                self.right_position += 1;
                if self.emitted.insert(tuple.clone()) {
                    return Ok(Some(tuple.clone()));
                }
            }
        }
        Ok(None)
    }

    /// The left input's schema; set operations keep its attribute names
    fn output_schema(&self) -> &Schema {
        self.left.output_schema()
    }
}
