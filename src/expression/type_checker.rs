//! Type checking for bound expressions.

use crate::access::DataType;
use crate::expression::{Expression, ExpressionError, ExpressionResult};

/// Type checker for expressions
pub struct TypeChecker<'a> {
    /// Domains of the input attributes
    schema: &'a [DataType],
}

impl<'a> TypeChecker<'a> {
    /// Create a new type checker with the given schema
    pub fn new(schema: &'a [DataType]) -> Self {
        Self { schema }
    }

    /// Type check an expression and return its output type
    pub fn check(&self, expr: &Expression) -> ExpressionResult<DataType> {
        match expr {
            Expression::Literal(lit) => Ok(lit.value.data_type()),

            Expression::ColumnRef(col) => {
                let index = col.index.ok_or_else(|| ExpressionError::UnboundColumn {
                    name: col.to_string(),
                })?;
                self.schema
                    .get(index)
                    .copied()
                    .ok_or(ExpressionError::ColumnIndexOutOfBounds {
                        index,
                        tuple_size: self.schema.len(),
                    })
            }

            Expression::BinaryOp { op, left, right } => {
                let lt = self.check(left)?;
                let rt = self.check(right)?;
                op.output_type(lt, rt)
                    .ok_or_else(|| ExpressionError::InvalidOperandTypes {
                        operator: op.as_str().to_string(),
                        left_type: lt,
                        right_type: Some(rt),
                    })
            }

            Expression::UnaryOp { op, operand } => {
                let ot = self.check(operand)?;
                op.output_type(ot)
                    .ok_or_else(|| ExpressionError::InvalidOperandTypes {
                        operator: op.as_str().to_string(),
                        left_type: ot,
                        right_type: None,
                    })
            }
        }
    }

    /// Check if an expression is valid for use as a selection or join predicate
    pub fn check_filter_predicate(&self, expr: &Expression) -> ExpressionResult<()> {
        self.check_assignment(expr, DataType::Boolean, "predicate")
    }

    /// Check that an expression produces values of the `target` domain
    pub fn check_assignment(
        &self,
        expr: &Expression,
        target: DataType,
        context: &str,
    ) -> ExpressionResult<()> {
        let actual = self.check(expr)?;
        if actual == target {
            Ok(())
        } else {
            Err(ExpressionError::TypeMismatch {
                expected: target,
                actual,
                context: context.to_string(),
            })
        }
    }
}

/// Check that a bound predicate yields a boolean over `schema`
pub fn validate_filter_predicate(expr: &Expression, schema: &[DataType]) -> ExpressionResult<()> {
    TypeChecker::new(schema).check_filter_predicate(expr)
}
