//! Expression evaluation implementation.

use crate::access::{DataType, Value};
use crate::expression::{
    BinaryOperator, ColumnRef, Expression, ExpressionError, ExpressionResult, UnaryOperator,
};
use std::cmp::Ordering;

/// Evaluator for bound expressions against one tuple
pub struct ExpressionEvaluator<'a> {
    /// The tuple values to evaluate against
    tuple_values: &'a [Value],
}

impl<'a> ExpressionEvaluator<'a> {
    /// Create a new evaluator with tuple values
    pub fn new(tuple_values: &'a [Value]) -> Self {
        Self { tuple_values }
    }

    /// Evaluate an expression and return the result
    pub fn evaluate(&self, expr: &Expression) -> ExpressionResult<Value> {
        match expr {
            Expression::Literal(lit) => Ok(lit.value.clone()),

            Expression::ColumnRef(col) => self.evaluate_column_ref(col),

            // AND/OR short-circuit
            Expression::BinaryOp {
                op: op @ (BinaryOperator::And | BinaryOperator::Or),
                left,
                right,
            } => {
                let left_val = self.evaluate_bool(*op, left)?;
                match (op, left_val) {
                    (BinaryOperator::And, false) => Ok(Value::Boolean(false)),
                    (BinaryOperator::Or, true) => Ok(Value::Boolean(true)),
                    _ => Ok(Value::Boolean(self.evaluate_bool(*op, right)?)),
                }
            }

            Expression::BinaryOp { op, left, right } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                self.evaluate_binary_op(*op, left_val, right_val)
            }

            Expression::UnaryOp { op, operand } => {
                let operand_val = self.evaluate(operand)?;
                self.evaluate_unary_op(*op, operand_val)
            }
        }
    }

    /// Evaluate an operand of a logical operator
    fn evaluate_bool(&self, op: BinaryOperator, expr: &Expression) -> ExpressionResult<bool> {
        match self.evaluate(expr)? {
            Value::Boolean(b) => Ok(b),
            other => Err(ExpressionError::InvalidOperandTypes {
                operator: op.as_str().to_string(),
                left_type: other.data_type(),
                right_type: Some(DataType::Boolean),
            }),
        }
    }

    /// Evaluate a column reference
    fn evaluate_column_ref(&self, col: &ColumnRef) -> ExpressionResult<Value> {
        let index = col.index.ok_or_else(|| ExpressionError::UnboundColumn {
            name: col.to_string(),
        })?;
        self.tuple_values
            .get(index)
            .cloned()
            .ok_or(ExpressionError::ColumnIndexOutOfBounds {
                index,
                tuple_size: self.tuple_values.len(),
            })
    }

    /// Evaluate a binary operation
    fn evaluate_binary_op(
        &self,
        op: BinaryOperator,
        left: Value,
        right: Value,
    ) -> ExpressionResult<Value> {
        match op {
            BinaryOperator::Add => self.arithmetic(op, left, right, i32::checked_add),
            BinaryOperator::Sub => self.arithmetic(op, left, right, i32::checked_sub),
            BinaryOperator::Mul => self.arithmetic(op, left, right, i32::checked_mul),
            BinaryOperator::Div => {
                if right == Value::Int32(0) {
                    return Err(ExpressionError::DivisionByZero);
                }
                self.arithmetic(op, left, right, i32::checked_div)
            }

            BinaryOperator::Eq => self.compare_values(op, left, right, |o| o == Ordering::Equal),
            BinaryOperator::Ne => self.compare_values(op, left, right, |o| o != Ordering::Equal),
            BinaryOperator::Lt => self.compare_values(op, left, right, |o| o == Ordering::Less),
            BinaryOperator::Le => {
                self.compare_values(op, left, right, |o| o != Ordering::Greater)
            }
            BinaryOperator::Gt => {
                self.compare_values(op, left, right, |o| o == Ordering::Greater)
            }
            BinaryOperator::Ge => self.compare_values(op, left, right, |o| o != Ordering::Less),

            BinaryOperator::And | BinaryOperator::Or => match (&left, &right) {
                (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(
                    if op == BinaryOperator::And { *a && *b } else { *a || *b },
                )),
                _ => Err(ExpressionError::InvalidOperandTypes {
                    operator: op.as_str().to_string(),
                    left_type: left.data_type(),
                    right_type: Some(right.data_type()),
                }),
            },
        }
    }

    fn arithmetic(
        &self,
        op: BinaryOperator,
        left: Value,
        right: Value,
        apply: fn(i32, i32) -> Option<i32>,
    ) -> ExpressionResult<Value> {
        match (&left, &right) {
            (Value::Int32(a), Value::Int32(b)) => apply(*a, *b)
                .map(Value::Int32)
                .ok_or_else(|| ExpressionError::ArithmeticOverflow {
                    operator: op.as_str().to_string(),
                }),
            _ => Err(ExpressionError::InvalidOperandTypes {
                operator: op.as_str().to_string(),
                left_type: left.data_type(),
                right_type: Some(right.data_type()),
            }),
        }
    }

    /// Evaluate a unary operation
    fn evaluate_unary_op(&self, op: UnaryOperator, operand: Value) -> ExpressionResult<Value> {
        match (op, &operand) {
            (UnaryOperator::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
            (UnaryOperator::Minus, Value::Int32(n)) => {
                n.checked_neg()
                    .map(Value::Int32)
                    .ok_or_else(|| ExpressionError::ArithmeticOverflow {
                        operator: op.as_str().to_string(),
                    })
            }
            _ => Err(ExpressionError::InvalidOperandTypes {
                operator: op.as_str().to_string(),
                left_type: operand.data_type(),
                right_type: None,
            }),
        }
    }

    /// Compare two values of the same domain and apply a comparison function
    fn compare_values<F>(
        &self,
        op: BinaryOperator,
        left: Value,
        right: Value,
        cmp_fn: F,
    ) -> ExpressionResult<Value>
    where
        F: FnOnce(Ordering) -> bool,
    {
        let ordering = match (&left, &right) {
            (Value::Int32(a), Value::Int32(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            _ => {
                return Err(ExpressionError::InvalidOperandTypes {
                    operator: op.as_str().to_string(),
                    left_type: left.data_type(),
                    right_type: Some(right.data_type()),
                })
            }
        };
        Ok(Value::Boolean(cmp_fn(ordering)))
    }
}

/// Helper function to evaluate an expression against tuple values
pub fn evaluate_expression(expr: &Expression, tuple_values: &[Value]) -> ExpressionResult<Value> {
    ExpressionEvaluator::new(tuple_values).evaluate(expr)
}

/// Evaluate a predicate; anything but a boolean result is an error
pub fn evaluate_predicate(expr: &Expression, tuple_values: &[Value]) -> ExpressionResult<bool> {
    match evaluate_expression(expr, tuple_values)? {
        Value::Boolean(b) => Ok(b),
        other => Err(ExpressionError::TypeMismatch {
            expected: DataType::Boolean,
            actual: other.data_type(),
            context: "predicate".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::DataType;
    use crate::catalog::Schema;

    fn schema() -> Schema {
        Schema::qualified(
            "T",
            &[
                ("id", DataType::Int32),
                ("name", DataType::Varchar),
                ("active", DataType::Boolean),
            ],
        )
    }

    fn bound(expr: Expression) -> Expression {
        expr.bind(&schema()).unwrap()
    }

    fn row() -> Vec<Value> {
        vec![Value::Int32(10), Value::from("alice"), Value::Boolean(true)]
    }

    #[test]
    fn test_literal_evaluation() {
        let values = vec![];
        let evaluator = ExpressionEvaluator::new(&values);

        assert_eq!(
            evaluator.evaluate(&Expression::literal(42)).unwrap(),
            Value::Int32(42)
        );
        assert_eq!(
            evaluator.evaluate(&Expression::literal(true)).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            evaluator.evaluate(&Expression::literal("hello")).unwrap(),
            Value::from("hello")
        );
    }

    #[test]
    fn test_column_evaluation() {
        let values = row();
        assert_eq!(
            evaluate_expression(&bound(Expression::column("name")), &values).unwrap(),
            Value::from("alice")
        );

        // Unbound references cannot be evaluated
        assert!(matches!(
            evaluate_expression(&Expression::column("name"), &values),
            Err(ExpressionError::UnboundColumn { .. })
        ));
    }

    #[test]
    fn test_arithmetic() {
        let values = row();
        let expr = bound(Expression::mul_expr(
            Expression::add_expr(Expression::column("id"), Expression::literal(5)),
            Expression::literal(2),
        ));
        assert_eq!(evaluate_expression(&expr, &values).unwrap(), Value::Int32(30));

        let expr = Expression::unary_op(UnaryOperator::Minus, Expression::literal(7));
        assert_eq!(evaluate_expression(&expr, &values).unwrap(), Value::Int32(-7));
    }

    #[test]
    fn test_arithmetic_errors() {
        let values = vec![];
        let div = Expression::div_expr(Expression::literal(1), Expression::literal(0));
        assert_eq!(
            evaluate_expression(&div, &values),
            Err(ExpressionError::DivisionByZero)
        );

        let overflow = Expression::add_expr(Expression::literal(i32::MAX), Expression::literal(1));
        assert!(matches!(
            evaluate_expression(&overflow, &values),
            Err(ExpressionError::ArithmeticOverflow { .. })
        ));

        let neg = Expression::unary_op(UnaryOperator::Minus, Expression::literal(i32::MIN));
        assert!(matches!(
            evaluate_expression(&neg, &values),
            Err(ExpressionError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn test_comparisons() {
        let values = row();
        let cases = vec![
            (Expression::eq(Expression::column("id"), Expression::literal(10)), true),
            (Expression::ne(Expression::column("id"), Expression::literal(10)), false),
            (Expression::lt(Expression::column("id"), Expression::literal(11)), true),
            (Expression::le(Expression::column("id"), Expression::literal(10)), true),
            (Expression::gt(Expression::column("id"), Expression::literal(10)), false),
            (Expression::ge(Expression::column("id"), Expression::literal(10)), true),
            (
                Expression::lt(Expression::column("name"), Expression::literal("bob")),
                true,
            ),
        ];
        for (expr, expected) in cases {
            assert_eq!(
                evaluate_predicate(&bound(expr.clone()), &values).unwrap(),
                expected,
                "{}",
                expr
            );
        }
    }

    #[test]
    fn test_mixed_domain_comparison_is_an_error() {
        let values = row();
        let expr = bound(Expression::eq(
            Expression::column("name"),
            Expression::literal(10),
        ));
        assert!(matches!(
            evaluate_expression(&expr, &values),
            Err(ExpressionError::InvalidOperandTypes { .. })
        ));
    }

    #[test]
    fn test_logical_operators() {
        let values = row();
        let expr = bound(Expression::and(
            Expression::column("active"),
            Expression::not_expr(Expression::eq(
                Expression::column("name"),
                Expression::literal("bob"),
            )),
        ));
        assert!(evaluate_predicate(&expr, &values).unwrap());

        // The right side is not evaluated once the result is known
        let expr = Expression::or(
            Expression::literal(true),
            Expression::eq(
                Expression::div_expr(Expression::literal(1), Expression::literal(0)),
                Expression::literal(1),
            ),
        );
        assert!(evaluate_predicate(&expr, &values).unwrap());
    }

    #[test]
    fn test_non_boolean_predicate() {
        let values = row();
        assert!(matches!(
            evaluate_predicate(&bound(Expression::column("id")), &values),
            Err(ExpressionError::TypeMismatch { .. })
        ));
    }
}
