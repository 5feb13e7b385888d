//! Boolean rewrites on predicates: conjunct splitting and negation normal
//! form via De Morgan's laws.

use crate::access::Value;
use crate::expression::{BinaryOperator, Expression, Literal, UnaryOperator};

/// Split `a AND b AND c` into `[a, b, c]`
pub fn split_conjunction(expr: &Expression) -> Vec<Expression> {
    match expr {
        Expression::BinaryOp {
            op: BinaryOperator::And,
            left,
            right,
        } => {
            let mut parts = split_conjunction(left);
            parts.extend(split_conjunction(right));
            parts
        }
        other => vec![other.clone()],
    }
}

/// Fold predicates back into a left-deep conjunction
pub fn conjoin(parts: Vec<Expression>) -> Option<Expression> {
    parts.into_iter().reduce(Expression::and)
}

/// Push every NOT down to the leaves.
///
/// `NOT (p AND q)` becomes `NOT p OR NOT q`, `NOT (p OR q)` becomes
/// `NOT p AND NOT q`, double negations cancel, and a negated comparison is
/// replaced by its complement. What remains negated is a bare boolean
/// attribute. Operands keep their order, so short-circuit evaluation visits
/// the same subexpressions as before.
pub fn negation_normal_form(expr: &Expression) -> Expression {
    match expr {
        Expression::UnaryOp {
            op: UnaryOperator::Not,
            operand,
        } => negate(operand),
        Expression::BinaryOp {
            op: op @ (BinaryOperator::And | BinaryOperator::Or),
            left,
            right,
        } => Expression::binary_op(
            *op,
            negation_normal_form(left),
            negation_normal_form(right),
        ),
        other => other.clone(),
    }
}

fn negate(expr: &Expression) -> Expression {
    match expr {
        Expression::UnaryOp {
            op: UnaryOperator::Not,
            operand,
        } => negation_normal_form(operand),
        Expression::BinaryOp {
            op: BinaryOperator::And,
            left,
            right,
        } => Expression::or(negate(left), negate(right)),
        Expression::BinaryOp {
            op: BinaryOperator::Or,
            left,
            right,
        } => Expression::and(negate(left), negate(right)),
        Expression::BinaryOp { op, left, right } if op.is_comparison() => {
            match op.negated_comparison() {
                Some(negated) => {
                    Expression::binary_op(negated, (**left).clone(), (**right).clone())
                }
                None => Expression::not_expr(expr.clone()),
            }
        }
        Expression::Literal(Literal {
            value: Value::Boolean(b),
        }) => Expression::literal(!*b),
        other => Expression::not_expr(other.clone()),
    }
}
