//! Nested Loop Join executor implementation.
//!
//! The simplest join algorithm: for each tuple of the left input, scan every
//! tuple of the right input and emit the concatenation when the join
//! condition holds. Works for any predicate, including non-equalities, so it
//! is the fallback strategy whenever no equality keys can be extracted.
//!
//! The right input is materialized once during `init` rather than being
//! re-initialized per outer tuple.

use crate::access::Tuple;
use crate::catalog::Schema;
use crate::executor::{materialize, Executor};
use crate::expression::{evaluate_predicate, Expression, TypeChecker};
use anyhow::{bail, Result};

pub struct NestedLoopJoinExecutor {
    left_child: Box<dyn Executor>,
    right_child: Box<dyn Executor>,
    /// Condition bound against the concatenated schema
    join_condition: Expression,
    output_schema: Schema,
    right_tuples: Vec<Tuple>,
    current_left_tuple: Option<Tuple>,
    right_position: usize,
    initialized: bool,
}

impl NestedLoopJoinExecutor {
    pub fn new(
        left_child: Box<dyn Executor>,
        right_child: Box<dyn Executor>,
        join_condition: Expression,
    ) -> Self {
        let output_schema = left_child
            .output_schema()
            .concat(right_child.output_schema());
        Self {
            left_child,
            right_child,
            join_condition,
            output_schema,
            right_tuples: Vec::new(),
            current_left_tuple: None,
            right_position: 0,
            initialized: false,
        }
    }
}

impl Executor for NestedLoopJoinExecutor {
    fn init(&mut self) -> Result<()> {
        self.left_child.init()?;
        self.right_child.init()?;

        TypeChecker::new(&self.output_schema.data_types())
            .check_filter_predicate(&self.join_condition)?;

        self.right_tuples = materialize(self.right_child.as_mut())?;
        self.current_left_tuple = None;
        self.right_position = 0;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        loop {
            if let Some(left) = &self.current_left_tuple {
                while let Some(right) = self.right_tuples.get(self.right_position) {
                    self.right_position += 1;
                    let combined = left.concat(right);
                    if evaluate_predicate(&self.join_condition, combined.values())? {
                        return Ok(Some(combined));
                    }
                }
            }

            match self.left_child.next()? {
                Some(left) => {
                    self.current_left_tuple = Some(left);
                    self.right_position = 0;
                }
                None => return Ok(None),
            }
        }
    }

    fn output_schema(&self) -> &Schema {
        &self.output_schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::collect;
    use crate::executor::test_util::{r, s, scan};
    use crate::relation::Relation;
    use crate::tuple;

    fn join(condition: Expression) -> Result<Relation> {
        let schema = r().schema().concat(s().schema());
        let bound = condition.bind(&schema)?;
        collect(Box::new(NestedLoopJoinExecutor::new(
            scan(r()),
            scan(s()),
            bound,
        )))
    }

    #[test]
    fn test_equality_join() -> Result<()> {
        let result = join(Expression::eq(
            Expression::column("R.b_id"),
            Expression::column("S.b_id"),
        ))?;
        assert_eq!(result.len(), 2);
        assert!(result.contains(&tuple!["A1", 100, 100, "X"]));
        assert!(result.contains(&tuple!["A2", 101, 101, "Y"]));
        Ok(())
    }

    #[test]
    fn test_inequality_join() -> Result<()> {
        let result = join(Expression::gt(
            Expression::column("R.b_id"),
            Expression::column("S.b_id"),
        ))?;
        // 101 > 100, 102 > 100, 102 > 101
        assert_eq!(result.len(), 3);
        Ok(())
    }

    #[test]
    fn test_always_true_is_product() -> Result<()> {
        let result = join(Expression::literal(true))?;
        assert_eq!(result.len(), 6);
        Ok(())
    }
}
