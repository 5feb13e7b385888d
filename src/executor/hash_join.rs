//! Hash Join executor implementation.
//!
//! This executor performs an equi-join between two inputs using the hash
//! join algorithm.
//!
//! Algorithm:
//! 1. Build phase: create a hash table from the right input keyed by the
//!    values of its join attributes
//! 2. Probe phase: for each left tuple, look up the tuples with equal key
//!    values and emit the concatenations that also satisfy the residual
//!    condition, if any

use crate::access::{Tuple, Value};
use crate::catalog::Schema;
use crate::executor::Executor;
use crate::expression::{evaluate_predicate, Expression, TypeChecker};
use anyhow::{bail, Result};
use std::collections::HashMap;

/// Hash join executor that performs equi-joins
pub struct HashJoinExecutor {
    left_child: Box<dyn Executor>,
    right_child: Box<dyn Executor>,
    /// Key positions in left tuples
    left_keys: Vec<usize>,
    /// Key positions in right tuples, pairwise equal to `left_keys`
    right_keys: Vec<usize>,
    /// Condition evaluated on the concatenated tuple after a key match
    residual: Option<Expression>,
    output_schema: Schema,
    hash_table: HashMap<Vec<Value>, Vec<Tuple>>,
    current_left_tuple: Option<Tuple>,
    current_matches: Vec<Tuple>,
    current_match_index: usize,
    initialized: bool,
}

impl HashJoinExecutor {
    /// Create a new hash join executor
    ///
    /// # Arguments
    /// * `left_child` - The left (streamed) input
    /// * `right_child` - The right (build) input
    /// * `left_keys` - Key positions in the left input
    /// * `right_keys` - Key positions in the right input, same count as `left_keys`
    /// * `residual` - Optional condition bound against the concatenated schema
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
            hash_table: HashMap::new(),
            current_left_tuple: None,
            current_matches: Vec::new(),
            current_match_index: 0,
            initialized: false,
        })
    }

    fn build_hash_table(&mut self) -> Result<()> {
        self.hash_table.clear();
        while let Some(right_tuple) = self.right_child.next()? {
            let key = key_values(&right_tuple, &self.right_keys);
            self.hash_table.entry(key).or_default().push(right_tuple);
        }
        Ok(())
    }

    fn lookup_hash_table(&mut self, left_tuple: &Tuple) {
        let key = key_values(left_tuple, &self.left_keys);
        self.current_matches = self.hash_table.get(&key).cloned().unwrap_or_default();
        self.current_match_index = 0;
    }
}

/// Validate equi-join key positions and domains
pub(crate) fn check_join_keys(
    left: &Schema,
    right: &Schema,
    left_keys: &[usize],
    right_keys: &[usize],
) -> Result<()> {
    if left_keys.len() != right_keys.len() {
        bail!(
            "Join key count mismatch: {} left keys vs {} right keys",
            left_keys.len(),
            right_keys.len()
        );
    }
    if left_keys.is_empty() {
        bail!("Equi-join requires at least one key pair");
    }
    for (&l, &r) in left_keys.iter().zip(right_keys) {
        let (Some(la), Some(ra)) = (left.attribute(l), right.attribute(r)) else {
            bail!("Join key position ({}, {}) out of bounds", l, r);
        };
        if la.data_type != ra.data_type {
            bail!("Cannot join {} with {}", la, ra);
        }
    }
    Ok(())
}

pub(crate) fn key_values(tuple: &Tuple, keys: &[usize]) -> Vec<Value> {
    keys.iter()
        .filter_map(|&i| tuple.get(i).cloned())
        .collect()
}

impl Executor for HashJoinExecutor {
    fn init(&mut self) -> Result<()> {
        self.left_child.init()?;
        self.right_child.init()?;

        if let Some(residual) = &self.residual {
            TypeChecker::new(&self.output_schema.data_types()).check_filter_predicate(residual)?;
        }

        self.build_hash_table()?;
        self.current_left_tuple = None;
        self.current_matches.clear();
        self.current_match_index = 0;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        loop {
            if let Some(left) = &self.current_left_tuple {
                while let Some(right) = self.current_matches.get(self.current_match_index) {
                    self.current_match_index += 1;
                    let combined = left.concat(right);
                    let accepted = match &self.residual {
                        Some(condition) => evaluate_predicate(condition, combined.values())?,
                        None => true,
                    };
                    if accepted {
                        return Ok(Some(combined));
                    }
                }
            }

            match self.left_child.next()? {
                Some(left) => {
                    self.lookup_hash_table(&left);
                    self.current_left_tuple = Some(left);
                }
                None => return Ok(None),
            }
        }
    }

    fn output_schema(&self) -> &Schema {
        &self.output_schema
    }
}
