//! Physical query plan representation.
//!
//! Physical plans name the concrete executor for every node, including the
//! join algorithm. Predicates are bound to tuple positions here, against the
//! schema of the input they run on.

use crate::access::Value;
use crate::catalog::{Attribute, Schema};
use crate::config::JoinStrategy;
use crate::executor::{
    CrossProductExecutor, Executor, FilterExecutor, HashJoinExecutor, NestedLoopJoinExecutor,
    ProjectionExecutor, RelationScanExecutor, RenameExecutor, SetOperationExecutor, SetOperator,
    SortMergeJoinExecutor,
};
use crate::expression::rewrite::{conjoin, split_conjunction};
use crate::expression::{BinaryOperator, ColumnRef, Expression, Literal};
use crate::planner::logical::{natural_join_right_columns, JoinCondition, LogicalPlan};
use crate::relation::Relation;
use anyhow::Result;
use log::debug;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalPlan {
    Scan {
        name: String,
        relation: Arc<Relation>,
    },

    Filter {
        input: Box<PhysicalPlan>,
        predicate: Expression,
    },

    Projection {
        input: Box<PhysicalPlan>,
        columns: Vec<usize>,
    },

    Rename {
        input: Box<PhysicalPlan>,
        schema: Schema,
    },

    SetOperation {
        operator: SetOperator,
        left: Box<PhysicalPlan>,
        right: Box<PhysicalPlan>,
    },

    CrossProduct {
        left: Box<PhysicalPlan>,
        right: Box<PhysicalPlan>,
    },

    NestedLoopJoin {
        left: Box<PhysicalPlan>,
        right: Box<PhysicalPlan>,
        condition: Expression,
    },

    HashJoin {
        left: Box<PhysicalPlan>,
        right: Box<PhysicalPlan>,
        left_keys: Vec<usize>,
        right_keys: Vec<usize>,
        residual: Option<Expression>,
    },

    SortMergeJoin {
        left: Box<PhysicalPlan>,
        right: Box<PhysicalPlan>,
        left_keys: Vec<usize>,
        right_keys: Vec<usize>,
        residual: Option<Expression>,
    },
}

/// Equality keys pulled out of a join condition
struct JoinKeys {
    left: Vec<usize>,
    right: Vec<usize>,
    /// Conjuncts that are not key equalities, bound to the joined schema
    residual: Option<Expression>,
}

impl PhysicalPlan {
    /// Choose executors for every node of a logical plan
    pub fn from_logical(plan: &LogicalPlan, strategy: JoinStrategy) -> Result<Self> {
        Ok(match plan {
            LogicalPlan::Scan { name, relation } => PhysicalPlan::Scan {
                name: name.clone(),
                relation: Arc::clone(relation),
            },
            LogicalPlan::Select { input, predicate } => PhysicalPlan::Filter {
                predicate: predicate.bind(&input.schema())?,
                input: Box::new(Self::from_logical(input, strategy)?),
            },
            LogicalPlan::Project { input, columns } => PhysicalPlan::Projection {
                input: Box::new(Self::from_logical(input, strategy)?),
                columns: columns.clone(),
            },
            LogicalPlan::Rename { input, schema } => PhysicalPlan::Rename {
                input: Box::new(Self::from_logical(input, strategy)?),
                schema: schema.clone(),
            },
            LogicalPlan::SetOperation {
                operator,
                left,
                right,
            } => PhysicalPlan::SetOperation {
                operator: *operator,
                left: Box::new(Self::from_logical(left, strategy)?),
                right: Box::new(Self::from_logical(right, strategy)?),
            },
            LogicalPlan::Product { left, right } => PhysicalPlan::CrossProduct {
                left: Box::new(Self::from_logical(left, strategy)?),
                right: Box::new(Self::from_logical(right, strategy)?),
            },
            LogicalPlan::Join {
                left,
                right,
                condition: JoinCondition::Theta(condition),
            } => {
                let left_schema = left.schema();
                let right_schema = right.schema();
                let combined = left_schema.concat(&right_schema);
                let keys = extract_join_keys(condition, &left_schema, &right_schema)?;
                let condition = condition.bind(&combined)?;
                Self::join(
                    Self::from_logical(left, strategy)?,
                    Self::from_logical(right, strategy)?,
                    condition,
                    keys,
                    strategy,
                )
            }
            LogicalPlan::Join {
                left,
                right,
                condition: JoinCondition::Natural,
            } => {
                let left_schema = left.schema();
                let right_schema = right.schema();
                let physical_left = Self::from_logical(left, strategy)?;
                let physical_right = Self::from_logical(right, strategy)?;

                let pairs = left_schema.common_attributes(&right_schema)?;
                if pairs.is_empty() {
                    debug!("natural join without shared attributes is a product");
                    return Ok(PhysicalPlan::CrossProduct {
                        left: Box::new(physical_left),
                        right: Box::new(physical_right),
                    });
                }

                let offset = left_schema.len();
                let condition = conjoin(
                    pairs
                        .iter()
                        .map(|&(l, r)| {
                            Expression::eq(
                                bound_column(&left_schema.attributes()[l], l),
                                bound_column(&right_schema.attributes()[r], offset + r),
                            )
                        })
                        .collect(),
                )
                .unwrap_or_else(|| Expression::Literal(Literal::bool(true)));
                let keys = JoinKeys {
                    left: pairs.iter().map(|&(l, _)| l).collect(),
                    right: pairs.iter().map(|&(_, r)| r).collect(),
                    residual: None,
                };
                let join = Self::join(physical_left, physical_right, condition, keys, strategy);

                // Drop the right copies of the shared attributes
                let mut columns: Vec<usize> = (0..offset).collect();
                columns.extend(
                    natural_join_right_columns(&left_schema, &right_schema)
                        .into_iter()
                        .map(|r| offset + r),
                );
                PhysicalPlan::Projection {
                    input: Box::new(join),
                    columns,
                }
            }
        })
    }

    fn join(
        left: PhysicalPlan,
        right: PhysicalPlan,
        condition: Expression,
        keys: JoinKeys,
        strategy: JoinStrategy,
    ) -> PhysicalPlan {
        let left = Box::new(left);
        let right = Box::new(right);
        if keys.left.is_empty() {
            if matches!(strategy, JoinStrategy::Hash | JoinStrategy::SortMerge) {
                debug!(
                    "no equality keys in {}; using nested loop instead of {}",
                    condition, strategy
                );
            }
            return PhysicalPlan::NestedLoopJoin {
                left,
                right,
                condition,
            };
        }

        match strategy {
            JoinStrategy::Auto | JoinStrategy::Hash => {
                debug!("hash join on {} key(s)", keys.left.len());
                PhysicalPlan::HashJoin {
                    left,
                    right,
                    left_keys: keys.left,
                    right_keys: keys.right,
                    residual: keys.residual,
                }
            }
            JoinStrategy::SortMerge => PhysicalPlan::SortMergeJoin {
                left,
                right,
                left_keys: keys.left,
                right_keys: keys.right,
                residual: keys.residual,
            },
            JoinStrategy::NestedLoop => PhysicalPlan::NestedLoopJoin {
                left,
                right,
                condition,
            },
        }
    }

    /// Output schema of this node
    pub fn schema(&self) -> Schema {
        match self {
            PhysicalPlan::Scan { relation, .. } => relation.schema().clone(),
            PhysicalPlan::Filter { input, .. } => input.schema(),
            PhysicalPlan::Projection { input, columns } => input.schema().project(columns),
            PhysicalPlan::Rename { schema, .. } => schema.clone(),
            PhysicalPlan::SetOperation { left, .. } => left.schema(),
            PhysicalPlan::CrossProduct { left, right }
            | PhysicalPlan::NestedLoopJoin { left, right, .. }
            | PhysicalPlan::HashJoin { left, right, .. }
            | PhysicalPlan::SortMergeJoin { left, right, .. } => {
                left.schema().concat(&right.schema())
            }
        }
    }

    /// Build the executor tree for this plan
    pub fn into_executor(self) -> Result<Box<dyn Executor>> {
        Ok(match self {
            PhysicalPlan::Scan { relation, .. } => Box::new(RelationScanExecutor::new(relation)),
            PhysicalPlan::Filter { input, predicate } => {
                Box::new(FilterExecutor::new(input.into_executor()?, predicate))
            }
            PhysicalPlan::Projection { input, columns } => {
                Box::new(ProjectionExecutor::new(input.into_executor()?, columns)?)
            }
            PhysicalPlan::Rename { input, schema } => {
                Box::new(RenameExecutor::new(input.into_executor()?, schema)?)
            }
            PhysicalPlan::SetOperation {
                operator,
                left,
                right,
            } => Box::new(SetOperationExecutor::new(
                operator,
                left.into_executor()?,
                right.into_executor()?,
            )?),
            PhysicalPlan::CrossProduct { left, right } => Box::new(CrossProductExecutor::new(
                left.into_executor()?,
                right.into_executor()?,
            )),
            PhysicalPlan::NestedLoopJoin {
                left,
                right,
                condition,
            } => Box::new(NestedLoopJoinExecutor::new(
                left.into_executor()?,
                right.into_executor()?,
                condition,
            )),
            PhysicalPlan::HashJoin {
                left,
                right,
                left_keys,
                right_keys,
                residual,
            } => Box::new(HashJoinExecutor::new(
                left.into_executor()?,
                right.into_executor()?,
                left_keys,
                right_keys,
                residual,
            )?),
            PhysicalPlan::SortMergeJoin {
                left,
                right,
                left_keys,
                right_keys,
                residual,
            } => Box::new(SortMergeJoinExecutor::new(
                left.into_executor()?,
                right.into_executor()?,
                left_keys,
                right_keys,
                residual,
            )?),
        })
    }

    /// Get a human-readable explanation of this plan
    pub fn explain(&self) -> String {
        let mut out = String::new();
        self.explain_node(0, &mut out);
        out.trim_end().to_string()
    }

    fn explain_node(&self, indent_level: usize, out: &mut String) {
        let indent = "  ".repeat(indent_level);
        let line = match self {
            PhysicalPlan::Scan { name, relation } => {
                format!("Scan: {} ({} tuples)", name, relation.len())
            }
            PhysicalPlan::Filter { predicate, .. } => format!("Filter: {}", predicate),
            PhysicalPlan::Projection { .. } => {
                format!("Projection: {}", self.schema().display_names().join(", "))
            }
            PhysicalPlan::Rename { schema, .. } => format!("Rename: {}", schema),
            PhysicalPlan::SetOperation { operator, .. } => format!("SetOperation: {}", operator),
            PhysicalPlan::CrossProduct { .. } => "CrossProduct".to_string(),
            PhysicalPlan::NestedLoopJoin { condition, .. } => {
                format!("NestedLoopJoin: {}", condition)
            }
            PhysicalPlan::HashJoin {
                left,
                right,
                left_keys,
                right_keys,
                residual,
            } => format!(
                "HashJoin: {}{}",
                describe_keys(&left.schema(), &right.schema(), left_keys, right_keys),
                describe_residual(residual)
            ),
            PhysicalPlan::SortMergeJoin {
                left,
                right,
                left_keys,
                right_keys,
                residual,
            } => format!(
                "SortMergeJoin: {}{}",
                describe_keys(&left.schema(), &right.schema(), left_keys, right_keys),
                describe_residual(residual)
            ),
        };
        out.push_str(&indent);
        out.push_str(&line);
        out.push('\n');

        match self {
            PhysicalPlan::Scan { .. } => {}
            PhysicalPlan::Filter { input, .. }
            | PhysicalPlan::Projection { input, .. }
            | PhysicalPlan::Rename { input, .. } => input.explain_node(indent_level + 1, out),
            PhysicalPlan::SetOperation { left, right, .. }
            | PhysicalPlan::CrossProduct { left, right }
            | PhysicalPlan::NestedLoopJoin { left, right, .. }
            | PhysicalPlan::HashJoin { left, right, .. }
            | PhysicalPlan::SortMergeJoin { left, right, .. } => {
                left.explain_node(indent_level + 1, out);
                right.explain_node(indent_level + 1, out);
            }
        }
    }
}

impl fmt::Display for PhysicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.explain())
    }
}

/// Separate `left_attr = right_attr` conjuncts from the rest of a join
/// condition.
///
/// Keys are matched before the residual runs, so only equalities written
/// before the first conjunct that can fail become keys. Every join strategy
/// then evaluates the residual on the same pairs as a nested loop would.
fn extract_join_keys(condition: &Expression, left: &Schema, right: &Schema) -> Result<JoinKeys> {
    let mut keys = JoinKeys {
        left: Vec::new(),
        right: Vec::new(),
        residual: None,
    };
    let mut residual = Vec::new();
    let mut fallible_seen = false;

    for conjunct in split_conjunction(condition) {
        fallible_seen |= conjunct.can_fail();
        match equi_pair(&conjunct, left, right) {
            Some((l, r)) if !fallible_seen => {
                keys.left.push(l);
                keys.right.push(r);
            }
            _ => residual.push(conjunct),
        }
    }

    keys.residual = conjoin(residual)
        .map(|e| e.bind(&left.concat(right)))
        .transpose()?;
    Ok(keys)
}

fn equi_pair(conjunct: &Expression, left: &Schema, right: &Schema) -> Option<(usize, usize)> {
    let Expression::BinaryOp {
        op: BinaryOperator::Eq,
        left: a,
        right: b,
    } = conjunct
    else {
        return None;
    };
    let (Expression::ColumnRef(a), Expression::ColumnRef(b)) = (a.as_ref(), b.as_ref()) else {
        return None;
    };
    let position = |schema: &Schema, col: &ColumnRef| {
        schema.resolve(col.qualifier.as_deref(), &col.name).ok()
    };
    match (position(left, a), position(right, b)) {
        (Some(l), Some(r)) => Some((l, r)),
        _ => match (position(left, b), position(right, a)) {
            (Some(l), Some(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn bound_column(attribute: &Attribute, index: usize) -> Expression {
    Expression::ColumnRef(ColumnRef {
        name: attribute.name.clone(),
        qualifier: attribute.qualifier.clone(),
        index: Some(index),
    })
}

fn describe_keys(left: &Schema, right: &Schema, left_keys: &[usize], right_keys: &[usize]) -> String {
    left_keys
        .iter()
        .zip(right_keys)
        .map(|(&l, &r)| {
            let name = |schema: &Schema, i: usize| {
                schema
                    .attribute(i)
                    .map(|a| a.qualified_name())
                    .unwrap_or_else(|| format!("#{}", i))
            };
            format!("{} = {}", name(left, l), name(right, r))
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn describe_residual(residual: &Option<Expression>) -> String {
    match residual {
        Some(expr) if *expr != Expression::Literal(Literal::new(Value::Boolean(true))) => {
            format!(" [residual: {}]", expr)
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::DataType;
    use crate::executor::collect;
    use crate::tuple;

    fn r() -> LogicalPlan {
        let relation = Relation::build(
            "R",
            &[("a_id", DataType::Varchar), ("b_id", DataType::Int32)],
            vec![tuple!["A1", 100], tuple!["A2", 101], tuple!["A3", 102]],
        )
        .unwrap();
        LogicalPlan::scan("R", Arc::new(relation))
    }

    fn s() -> LogicalPlan {
        let relation = Relation::build(
            "S",
            &[("b_id", DataType::Int32), ("value", DataType::Varchar)],
            vec![tuple![100, "X"], tuple![101, "Y"]],
        )
        .unwrap();
        LogicalPlan::scan("S", Arc::new(relation))
    }

    fn run(plan: &LogicalPlan, strategy: JoinStrategy) -> Result<Relation> {
        collect(PhysicalPlan::from_logical(plan, strategy)?.into_executor()?)
    }

    #[test]
    fn test_natural_join_strategies() -> Result<()> {
        let plan = LogicalPlan::natural_join(r(), s())?;
        let expected = run(&plan, JoinStrategy::NestedLoop)?;
        assert_eq!(expected.len(), 2);
        assert_eq!(
            expected.schema().display_names(),
            vec!["a_id", "b_id", "value"]
        );
        assert!(expected.contains(&tuple!["A1", 100, "X"]));

        for strategy in [JoinStrategy::Auto, JoinStrategy::Hash, JoinStrategy::SortMerge] {
            assert_eq!(run(&plan, strategy)?, expected);
        }
        Ok(())
    }

    #[test]
    fn test_strategy_selection() -> Result<()> {
        let equi = LogicalPlan::theta_join(
            r(),
            s(),
            Expression::eq(Expression::column("S.b_id"), Expression::column("R.b_id")),
        )?;
        assert!(matches!(
            PhysicalPlan::from_logical(&equi, JoinStrategy::Auto)?,
            PhysicalPlan::HashJoin { .. }
        ));
        assert!(matches!(
            PhysicalPlan::from_logical(&equi, JoinStrategy::SortMerge)?,
            PhysicalPlan::SortMergeJoin { .. }
        ));
        // Keys are found even when written right = left
        if let PhysicalPlan::HashJoin {
            left_keys,
            right_keys,
            ..
        } = PhysicalPlan::from_logical(&equi, JoinStrategy::Hash)?
        {
            assert_eq!(left_keys, vec![1]);
            assert_eq!(right_keys, vec![0]);
        }

        let theta = LogicalPlan::theta_join(
            r(),
            s(),
            Expression::lt(Expression::column("R.b_id"), Expression::column("S.b_id")),
        )?;
        assert!(matches!(
            PhysicalPlan::from_logical(&theta, JoinStrategy::Hash)?,
            PhysicalPlan::NestedLoopJoin { .. }
        ));
        Ok(())
    }

    #[test]
    fn test_residual_condition() -> Result<()> {
        let plan = LogicalPlan::theta_join(
            r(),
            s(),
            Expression::and(
                Expression::eq(Expression::column("R.b_id"), Expression::column("S.b_id")),
                Expression::ne(Expression::column("value"), Expression::literal("X")),
            ),
        )?;
        for strategy in [
            JoinStrategy::NestedLoop,
            JoinStrategy::Hash,
            JoinStrategy::SortMerge,
        ] {
            let result = run(&plan, strategy)?;
            assert_eq!(result.len(), 1);
            assert!(result.contains(&tuple!["A2", 101, 101, "Y"]));
        }
        Ok(())
    }

    #[test]
    fn test_keys_after_fallible_conjunct_stay_residual() -> Result<()> {
        use crate::algebra::parse_predicate;
        use crate::expression::ExpressionError;

        let strategies = [
            JoinStrategy::NestedLoop,
            JoinStrategy::Hash,
            JoinStrategy::SortMerge,
        ];

        // A3 (102) has no partner, so the division only runs on it without keys
        let keyed_first = LogicalPlan::theta_join(
            r(),
            s(),
            parse_predicate("R.b_id = S.b_id AND 1 / (R.b_id - 102) < 1")?,
        )?;
        assert!(matches!(
            PhysicalPlan::from_logical(&keyed_first, JoinStrategy::Hash)?,
            PhysicalPlan::HashJoin { .. }
        ));
        for strategy in strategies {
            assert_eq!(run(&keyed_first, strategy)?.len(), 2, "{}", strategy);
        }

        let division_first = LogicalPlan::theta_join(
            r(),
            s(),
            parse_predicate("1 / (R.b_id - 102) < 1 AND R.b_id = S.b_id")?,
        )?;
        assert!(matches!(
            PhysicalPlan::from_logical(&division_first, JoinStrategy::Hash)?,
            PhysicalPlan::NestedLoopJoin { .. }
        ));
        for strategy in strategies {
            let err = run(&division_first, strategy).unwrap_err();
            assert_eq!(
                err.downcast_ref::<ExpressionError>(),
                Some(&ExpressionError::DivisionByZero),
                "{}",
                strategy
            );
        }
        Ok(())
    }

    #[test]
    fn test_natural_join_without_common_attributes() -> Result<()> {
        let t = Relation::build("T", &[("z", DataType::Boolean)], vec![tuple![true]])?;
        let plan = LogicalPlan::natural_join(r(), LogicalPlan::scan("T", Arc::new(t)))?;
        let physical = PhysicalPlan::from_logical(&plan, JoinStrategy::Auto)?;
        assert!(matches!(physical, PhysicalPlan::CrossProduct { .. }));
        assert_eq!(collect(physical.into_executor()?)?.len(), 3);
        Ok(())
    }

    #[test]
    fn test_explain() -> Result<()> {
        let plan = LogicalPlan::natural_join(r(), s())?;
        let physical = PhysicalPlan::from_logical(&plan, JoinStrategy::Hash)?;
        assert_eq!(
            physical.explain(),
            "Projection: a_id, b_id, value\n  HashJoin: R.b_id = S.b_id\n    Scan: R (3 tuples)\n    Scan: S (2 tuples)"
        );
        Ok(())
    }
}
