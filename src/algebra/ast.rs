// Abstract syntax of algebra scripts

use crate::catalog::RelationDefinition;
use crate::executor::SetOperator;
use crate::expression::{ColumnRef, Expression};

/// A relational algebra expression as written
#[derive(Debug, Clone, PartialEq)]
pub enum RelationExpression {
    /// A named relation in the store
    Relation(String),

    Select {
        predicate: Expression,
        input: Box<RelationExpression>,
    },

    Project {
        attributes: Vec<ColumnRef>,
        input: Box<RelationExpression>,
    },

    Rename {
        renaming: Renaming,
        input: Box<RelationExpression>,
    },

    SetOperation {
        operator: SetOperator,
        left: Box<RelationExpression>,
        right: Box<RelationExpression>,
    },

    Product {
        left: Box<RelationExpression>,
        right: Box<RelationExpression>,
    },

    /// Natural join when `condition` is `None`
    Join {
        condition: Option<Expression>,
        left: Box<RelationExpression>,
        right: Box<RelationExpression>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Renaming {
    /// `rename[N](R)`: requalify every attribute
    Relation(String),
    /// `rename[a -> b, ...](R)`
    Attributes(Vec<(ColumnRef, String)>),
}

/// One statement of a script
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateRelation(RelationDefinition),
    DropRelation(String),
    Insert {
        relation: String,
        rows: Vec<Vec<Expression>>,
    },
    Delete {
        relation: String,
        predicate: Option<Expression>,
    },
    Update {
        relation: String,
        assignments: Vec<(String, Expression)>,
        predicate: Option<Expression>,
    },
    /// Materialize an expression under a name
    Let {
        name: String,
        expression: RelationExpression,
    },
    Explain(RelationExpression),
    Query(RelationExpression),
}

impl RelationExpression {
    pub fn relation(name: impl Into<String>) -> Self {
        RelationExpression::Relation(name.into())
    }

    pub fn select(predicate: Expression, input: RelationExpression) -> Self {
        RelationExpression::Select {
            predicate,
            input: Box::new(input),
        }
    }

    pub fn project(attributes: Vec<ColumnRef>, input: RelationExpression) -> Self {
        RelationExpression::Project {
            attributes,
            input: Box::new(input),
        }
    }

    pub fn set_operation(
        operator: SetOperator,
        left: RelationExpression,
        right: RelationExpression,
    ) -> Self {
        RelationExpression::SetOperation {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn product(left: RelationExpression, right: RelationExpression) -> Self {
        RelationExpression::Product {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn join(
        condition: Option<Expression>,
        left: RelationExpression,
        right: RelationExpression,
    ) -> Self {
        RelationExpression::Join {
            condition,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
