//! Expression AST definitions.

use crate::access::Value;
use crate::catalog::{Schema, SchemaError};
use crate::expression::operator::{BinaryOperator, UnaryOperator};
use std::fmt;

/// Attribute reference in an expression.
///
/// References are written by name; `index` is filled in by [`Expression::bind`]
/// once the input schema is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub name: String,
    pub qualifier: Option<String>,
    /// Position in the input tuple, once bound
    pub index: Option<usize>,
}

impl ColumnRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualifier: None,
            index: None,
        }
    }

    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualifier: Some(qualifier.into()),
            index: None,
        }
    }

    /// Parse `name` or `qualifier.name`
    pub fn parse(reference: &str) -> Self {
        match reference.split_once('.') {
            Some((qualifier, name)) => Self::qualified(qualifier, name),
            None => Self::new(reference),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}.{}", q, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Literal value in an expression
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: Value,
}

impl Literal {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn bool(val: bool) -> Self {
        Self {
            value: Value::Boolean(val),
        }
    }

    pub fn int32(val: i32) -> Self {
        Self {
            value: Value::Int32(val),
        }
    }

    pub fn string(val: impl Into<String>) -> Self {
        Self {
            value: Value::String(val.into()),
        }
    }
}

/// Expression tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal constant value
    Literal(Literal),

    /// Attribute reference
    ColumnRef(ColumnRef),

    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
}

impl Expression {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(Literal::new(value.into()))
    }

    /// Attribute reference written as `name` or `qualifier.name`
    pub fn column(reference: &str) -> Self {
        Expression::ColumnRef(ColumnRef::parse(reference))
    }

    pub fn binary_op(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary_op(op: UnaryOperator, operand: Expression) -> Self {
        Expression::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::And, left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Or, left, right)
    }

    pub fn not_expr(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::Not, operand)
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Eq, left, right)
    }

    pub fn ne(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Ne, left, right)
    }

    pub fn lt(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Lt, left, right)
    }

    pub fn le(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Le, left, right)
    }

    pub fn gt(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Gt, left, right)
    }

    pub fn ge(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Ge, left, right)
    }

    pub fn add_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Add, left, right)
    }

    pub fn sub_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Sub, left, right)
    }

    pub fn mul_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Mul, left, right)
    }

    pub fn div_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Div, left, right)
    }

    /// Check if this expression is a constant (contains no attribute references)
    pub fn is_constant(&self) -> bool {
        match self {
            Expression::Literal(_) => true,
            Expression::ColumnRef(_) => false,
            Expression::BinaryOp { left, right, .. } => left.is_constant() && right.is_constant(),
            Expression::UnaryOp { operand, .. } => operand.is_constant(),
        }
    }

    /// Whether evaluating this can raise an error on some tuple.
    ///
    /// Arithmetic is checked, so any `+ - * /` or negation may fail;
    /// comparisons and logical operators over well-typed operands cannot.
    pub fn can_fail(&self) -> bool {
        match self {
            Expression::Literal(_) | Expression::ColumnRef(_) => false,
            Expression::BinaryOp { op, left, right } => {
                op.is_arithmetic() || left.can_fail() || right.can_fail()
            }
            Expression::UnaryOp { op, operand } => {
                *op == UnaryOperator::Minus || operand.can_fail()
            }
        }
    }

    /// Every attribute reference, left to right
    pub fn column_refs(&self) -> Vec<&ColumnRef> {
        let mut refs = Vec::new();
        self.collect_column_refs(&mut refs);
        refs
    }

    fn collect_column_refs<'a>(&'a self, refs: &mut Vec<&'a ColumnRef>) {
        match self {
            Expression::Literal(_) => {}
            Expression::ColumnRef(col) => refs.push(col),
            Expression::BinaryOp { left, right, .. } => {
                left.collect_column_refs(refs);
                right.collect_column_refs(refs);
            }
            Expression::UnaryOp { operand, .. } => operand.collect_column_refs(refs),
        }
    }

    /// Resolve every attribute reference against `schema`, returning a copy
    /// whose references carry tuple positions.
    pub fn bind(&self, schema: &Schema) -> Result<Expression, SchemaError> {
        match self {
            Expression::Literal(lit) => Ok(Expression::Literal(lit.clone())),
            Expression::ColumnRef(col) => {
                let index = schema.resolve(col.qualifier.as_deref(), &col.name)?;
                Ok(Expression::ColumnRef(ColumnRef {
                    index: Some(index),
                    ..col.clone()
                }))
            }
            Expression::BinaryOp { op, left, right } => Ok(Expression::binary_op(
                *op,
                left.bind(schema)?,
                right.bind(schema)?,
            )),
            Expression::UnaryOp { op, operand } => {
                Ok(Expression::unary_op(*op, operand.bind(schema)?))
            }
        }
    }

    /// Whether every reference resolves against `schema`
    pub fn binds_to(&self, schema: &Schema) -> bool {
        self.column_refs()
            .iter()
            .all(|col| schema.resolve(col.qualifier.as_deref(), &col.name).is_ok())
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::BinaryOp { op, .. } => op.precedence(),
            Expression::UnaryOp { op, .. } => op.precedence(),
            _ => u8::MAX,
        }
    }

    fn fmt_with_precedence(&self, f: &mut fmt::Formatter<'_>, parent: u8) -> fmt::Result {
        let own = self.precedence();
        let parenthesize = own < parent;
        if parenthesize {
            write!(f, "(")?;
        }
        match self {
            Expression::Literal(lit) => match &lit.value {
                Value::String(s) => write!(f, "'{}'", s.replace('\'', "''"))?,
                other => write!(f, "{}", other)?,
            },
            Expression::ColumnRef(col) => write!(f, "{}", col)?,
            Expression::BinaryOp { op, left, right } => {
                left.fmt_with_precedence(f, own)?;
                write!(f, " {} ", op.as_str())?;
                // Left-associative: an equal-precedence right operand needs grouping
                right.fmt_with_precedence(f, own + 1)?;
            }
            Expression::UnaryOp { op, operand } => {
                match op {
                    UnaryOperator::Not => write!(f, "NOT ")?,
                    UnaryOperator::Minus => write!(f, "-")?,
                }
                operand.fmt_with_precedence(f, own)?;
            }
        }
        if parenthesize {
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with_precedence(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::DataType;

    #[test]
    fn test_column_ref() {
        let col = ColumnRef::parse("Artist.year");
        assert_eq!(col.qualifier.as_deref(), Some("Artist"));
        assert_eq!(col.name, "year");
        assert!(col.index.is_none());

        let col = ColumnRef::parse("year");
        assert!(col.qualifier.is_none());
        assert_eq!(col.to_string(), "year");
    }

    #[test]
    fn test_literal() {
        assert_eq!(Literal::bool(true).value, Value::Boolean(true));
        assert_eq!(Literal::int32(42).value, Value::Int32(42));
        assert_eq!(Literal::string("hello").value, Value::from("hello"));
    }

    #[test]
    fn test_is_constant() {
        assert!(Expression::literal(42).is_constant());
        assert!(!Expression::column("a").is_constant());
        assert!(Expression::add_expr(Expression::literal(1), Expression::literal(2)).is_constant());
        assert!(
            !Expression::add_expr(Expression::column("a"), Expression::literal(2)).is_constant()
        );
    }

    #[test]
    fn test_can_fail() {
        let a = || Expression::column("a");
        assert!(!Expression::and(
            Expression::lt(a(), Expression::literal(3)),
            Expression::not_expr(Expression::column("d")),
        )
        .can_fail());
        assert!(Expression::gt(Expression::div_expr(a(), Expression::column("b")), a()).can_fail());
        assert!(Expression::or(
            Expression::column("d"),
            Expression::eq(Expression::unary_op(UnaryOperator::Minus, a()), a()),
        )
        .can_fail());
    }

    #[test]
    fn test_bind() {
        let schema = Schema::qualified(
            "Artist",
            &[
                ("name", DataType::Varchar),
                ("year", DataType::Int32),
                ("country", DataType::Varchar),
            ],
        );
        let expr = Expression::and(
            Expression::eq(Expression::column("country"), Expression::literal("USA")),
            Expression::gt(Expression::column("Artist.year"), Expression::literal(1990)),
        );
        let bound = expr.bind(&schema).unwrap();
        let indices: Vec<Option<usize>> = bound.column_refs().iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![Some(2), Some(1)]);
        assert!(expr.binds_to(&schema));

        let bad = Expression::eq(Expression::column("genre"), Expression::literal("rap"));
        assert!(matches!(
            bad.bind(&schema),
            Err(SchemaError::UnknownAttribute { .. })
        ));
        assert!(!bad.binds_to(&schema));
    }

    #[test]
    fn test_display_minimal_parentheses() {
        let expr = Expression::and(
            Expression::or(
                Expression::eq(Expression::column("a"), Expression::literal(1)),
                Expression::eq(Expression::column("b"), Expression::literal("it's")),
            ),
            Expression::not_expr(Expression::lt(
                Expression::column("R.c"),
                Expression::mul_expr(
                    Expression::add_expr(Expression::literal(1), Expression::literal(2)),
                    Expression::literal(3),
                ),
            )),
        );
        assert_eq!(
            expr.to_string(),
            "(a = 1 OR b = 'it''s') AND NOT R.c < (1 + 2) * 3"
        );

        let expr = Expression::sub_expr(
            Expression::column("a"),
            Expression::sub_expr(Expression::column("b"), Expression::column("c")),
        );
        assert_eq!(expr.to_string(), "a - (b - c)");
    }
}
