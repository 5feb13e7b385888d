//! Error types for expression evaluation.

use crate::access::DataType;
use std::fmt;

/// Errors that can occur during expression type checking and evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Type mismatch in a context expecting a specific domain
    TypeMismatch {
        expected: DataType,
        actual: DataType,
        context: String,
    },

    /// Invalid operand types for operator
    InvalidOperandTypes {
        operator: String,
        left_type: DataType,
        right_type: Option<DataType>,
    },

    /// Column index out of bounds
    ColumnIndexOutOfBounds { index: usize, tuple_size: usize },

    /// Attribute reference evaluated before being bound to a schema
    UnboundColumn { name: String },

    /// Division by zero
    DivisionByZero,

    /// Integer result outside the INT domain
    ArithmeticOverflow { operator: String },
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionError::TypeMismatch {
                expected,
                actual,
                context,
            } => {
                write!(
                    f,
                    "Type mismatch in {}: expected {}, got {}",
                    context, expected, actual
                )
            }

            ExpressionError::InvalidOperandTypes {
                operator,
                left_type,
                right_type: Some(right_type),
            } => {
                write!(
                    f,
                    "Invalid operand types for operator {}: {} and {}",
                    operator, left_type, right_type
                )
            }

            ExpressionError::InvalidOperandTypes {
                operator,
                left_type,
                right_type: None,
            } => {
                write!(
                    f,
                    "Invalid operand type for operator {}: {}",
                    operator, left_type
                )
            }

            ExpressionError::ColumnIndexOutOfBounds { index, tuple_size } => {
                write!(
                    f,
                    "Column index {} out of bounds for tuple with {} columns",
                    index, tuple_size
                )
            }

            ExpressionError::UnboundColumn { name } => {
                write!(f, "Attribute {} is not bound to an input schema", name)
            }

            ExpressionError::DivisionByZero => write!(f, "Division by zero"),

            ExpressionError::ArithmeticOverflow { operator } => {
                write!(f, "Integer overflow in operator {}", operator)
            }
        }
    }
}

impl std::error::Error for ExpressionError {}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExpressionError::TypeMismatch {
            expected: DataType::Boolean,
            actual: DataType::Int32,
            context: "selection predicate".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch in selection predicate: expected BOOLEAN, got INT"
        );

        let err = ExpressionError::InvalidOperandTypes {
            operator: "=".to_string(),
            left_type: DataType::Varchar,
            right_type: Some(DataType::Int32),
        };
        assert_eq!(
            err.to_string(),
            "Invalid operand types for operator =: VARCHAR and INT"
        );

        let err = ExpressionError::InvalidOperandTypes {
            operator: "NOT".to_string(),
            left_type: DataType::Int32,
            right_type: None,
        };
        assert_eq!(err.to_string(), "Invalid operand type for operator NOT: INT");

        let err = ExpressionError::ColumnIndexOutOfBounds {
            index: 5,
            tuple_size: 3,
        };
        assert_eq!(
            err.to_string(),
            "Column index 5 out of bounds for tuple with 3 columns"
        );

        assert_eq!(ExpressionError::DivisionByZero.to_string(), "Division by zero");
        assert_eq!(
            ExpressionError::ArithmeticOverflow {
                operator: "*".to_string()
            }
            .to_string(),
            "Integer overflow in operator *"
        );
    }
}
