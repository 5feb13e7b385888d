//! Logical query plan representation.
//!
//! Logical plans describe which relational operators to apply, not how. Each
//! node is built through a validating constructor that resolves attribute
//! names and type checks predicates, so a plan that exists is well formed and
//! its output schema can be computed without failing.
//!
//! Predicates are kept by name rather than by position. Rewrites that move a
//! predicate to a different input rebind it against that input's schema.

use crate::catalog::{Schema, SchemaError};
use crate::executor::SetOperator;
use crate::expression::{validate_filter_predicate, ColumnRef, Expression};
use crate::relation::Relation;
use anyhow::Result;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    /// Equality on every attribute name the two inputs share
    Natural,
    /// Arbitrary predicate over the concatenated schema
    Theta(Expression),
}

/// Logical plan node for relational algebra trees
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalPlan {
    /// Read a relation snapshot
    Scan {
        name: String,
        relation: Arc<Relation>,
    },

    /// Keep the tuples satisfying a predicate (σ)
    Select {
        input: Box<LogicalPlan>,
        predicate: Expression,
    },

    /// Keep the attributes at `columns`, in that order (π)
    Project {
        input: Box<LogicalPlan>,
        columns: Vec<usize>,
    },

    /// Same tuples under a renamed schema (ρ)
    Rename {
        input: Box<LogicalPlan>,
        schema: Schema,
    },

    SetOperation {
        operator: SetOperator,
        left: Box<LogicalPlan>,
        right: Box<LogicalPlan>,
    },

    /// Cartesian product (×)
    Product {
        left: Box<LogicalPlan>,
        right: Box<LogicalPlan>,
    },

    Join {
        left: Box<LogicalPlan>,
        right: Box<LogicalPlan>,
        condition: JoinCondition,
    },
}

impl LogicalPlan {
    pub fn scan(name: impl Into<String>, relation: Arc<Relation>) -> Self {
        LogicalPlan::Scan {
            name: name.into(),
            relation,
        }
    }

    pub fn select(input: LogicalPlan, predicate: Expression) -> Result<Self> {
        check_predicate(&predicate, &input.schema())?;
        Ok(LogicalPlan::Select {
            input: Box::new(input),
            predicate,
        })
    }

    pub fn project(input: LogicalPlan, attributes: &[ColumnRef]) -> Result<Self> {
        if attributes.is_empty() {
            return Err(SchemaError::EmptyProjection.into());
        }
        let schema = input.schema();
        let mut columns = Vec::with_capacity(attributes.len());
        for attribute in attributes {
            let index = schema.resolve(attribute.qualifier.as_deref(), &attribute.name)?;
            if columns.contains(&index) {
                return Err(SchemaError::DuplicateAttribute {
                    name: attribute.to_string(),
                }
                .into());
            }
            columns.push(index);
        }
        Ok(LogicalPlan::Project {
            input: Box::new(input),
            columns,
        })
    }

    /// Requalify every attribute with `name`
    pub fn rename_relation(input: LogicalPlan, name: &str) -> Self {
        let schema = input.schema().with_qualifier(name);
        LogicalPlan::Rename {
            input: Box::new(input),
            schema,
        }
    }

    /// Rename individual attributes; the qualifier is kept
    pub fn rename_attributes(input: LogicalPlan, renames: &[(ColumnRef, String)]) -> Result<Self> {
        let mut attributes = input.schema().attributes().to_vec();
        let mut renamed = HashSet::new();
        for (old, new) in renames {
            let index = input
                .schema()
                .resolve(old.qualifier.as_deref(), &old.name)?;
            if !renamed.insert(index) {
                return Err(SchemaError::DuplicateAttribute {
                    name: old.to_string(),
                }
                .into());
            }
            attributes[index].name = new.clone();
        }
        for &index in &renamed {
            let target = &attributes[index];
            let clashes = attributes.iter().enumerate().any(|(i, other)| {
                i != index && other.name == target.name && other.qualifier == target.qualifier
            });
            if clashes {
                return Err(SchemaError::DuplicateAttribute {
                    name: target.qualified_name(),
                }
                .into());
            }
        }
        Ok(LogicalPlan::Rename {
            input: Box::new(input),
            schema: Schema::new(attributes),
        })
    }

    pub fn set_operation(
        operator: SetOperator,
        left: LogicalPlan,
        right: LogicalPlan,
    ) -> Result<Self> {
        left.schema().check_union_compatible(&right.schema())?;
        Ok(LogicalPlan::SetOperation {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn product(left: LogicalPlan, right: LogicalPlan) -> Self {
        LogicalPlan::Product {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn natural_join(left: LogicalPlan, right: LogicalPlan) -> Result<Self> {
        left.schema().common_attributes(&right.schema())?;
        Ok(LogicalPlan::Join {
            left: Box::new(left),
            right: Box::new(right),
            condition: JoinCondition::Natural,
        })
    }

    pub fn theta_join(left: LogicalPlan, right: LogicalPlan, condition: Expression) -> Result<Self> {
        check_predicate(&condition, &left.schema().concat(&right.schema()))?;
        Ok(LogicalPlan::Join {
            left: Box::new(left),
            right: Box::new(right),
            condition: JoinCondition::Theta(condition),
        })
    }

    /// Output schema of this node
    pub fn schema(&self) -> Schema {
        match self {
            LogicalPlan::Scan { relation, .. } => relation.schema().clone(),
            LogicalPlan::Select { input, .. } => input.schema(),
            LogicalPlan::Project { input, columns } => input.schema().project(columns),
            LogicalPlan::Rename { schema, .. } => schema.clone(),
            LogicalPlan::SetOperation { left, .. } => left.schema(),
            LogicalPlan::Product { left, right }
            | LogicalPlan::Join {
                left,
                right,
                condition: JoinCondition::Theta(_),
            } => left.schema().concat(&right.schema()),
            LogicalPlan::Join {
                left,
                right,
                condition: JoinCondition::Natural,
            } => {
                let left = left.schema();
                let right = right.schema();
                let kept = natural_join_right_columns(&left, &right);
                left.concat(&right.project(&kept))
            }
        }
    }

    fn explain_node(&self, indent_level: usize, out: &mut String) {
        let indent = "  ".repeat(indent_level);
        let children: Vec<&LogicalPlan> = match self {
            LogicalPlan::Scan { name, .. } => {
                out.push_str(&format!("{}Scan: {}\n", indent, name));
                vec![]
            }
            LogicalPlan::Select { input, predicate } => {
                out.push_str(&format!("{}Select: {}\n", indent, predicate));
                vec![input.as_ref()]
            }
            LogicalPlan::Project { input, .. } => {
                out.push_str(&format!(
                    "{}Project: {}\n",
                    indent,
                    self.schema().display_names().join(", ")
                ));
                vec![input.as_ref()]
            }
            LogicalPlan::Rename { input, schema } => {
                out.push_str(&format!("{}Rename: {}\n", indent, schema));
                vec![input.as_ref()]
            }
            LogicalPlan::SetOperation {
                operator,
                left,
                right,
            } => {
                out.push_str(&format!("{}{}\n", indent, operator));
                vec![left.as_ref(), right.as_ref()]
            }
            LogicalPlan::Product { left, right } => {
                out.push_str(&format!("{}Product\n", indent));
                vec![left.as_ref(), right.as_ref()]
            }
            LogicalPlan::Join {
                left,
                right,
                condition,
            } => {
                match condition {
                    JoinCondition::Natural => out.push_str(&format!("{}NaturalJoin\n", indent)),
                    JoinCondition::Theta(c) => out.push_str(&format!("{}Join: {}\n", indent, c)),
                }
                vec![left.as_ref(), right.as_ref()]
            }
        };
        for child in children {
            child.explain_node(indent_level + 1, out);
        }
    }
}

impl fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.explain_node(0, &mut out);
        write!(f, "{}", out.trim_end())
    }
}

/// Bind and type check a predicate against `schema`
pub(crate) fn check_predicate(predicate: &Expression, schema: &Schema) -> Result<()> {
    let bound = predicate.bind(schema)?;
    validate_filter_predicate(&bound, &schema.data_types())?;
    Ok(())
}

/// Right-side positions a natural join keeps: those whose name the left
/// side does not have
pub(crate) fn natural_join_right_columns(left: &Schema, right: &Schema) -> Vec<usize> {
    right
        .attributes()
        .iter()
        .enumerate()
        .filter(|(_, r)| !left.attributes().iter().any(|l| l.name == r.name))
        .map(|(i, _)| i)
        .collect()
}
