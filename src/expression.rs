//! Expression evaluation framework for predicates and computed values.
//!
//! This module provides:
//! - Expression AST representation with name-based attribute references
//! - Binding of references to tuple positions
//! - Type checking and validation
//! - Expression evaluation against tuples
//! - Boolean rewrites (conjunct splitting, De Morgan)

pub mod error;
pub mod eval;
pub mod expr;
pub mod operator;
pub mod rewrite;
pub mod type_checker;

pub use error::{ExpressionError, ExpressionResult};
pub use eval::{evaluate_expression, evaluate_predicate, ExpressionEvaluator};
pub use expr::{ColumnRef, Expression, Literal};
pub use operator::{BinaryOperator, UnaryOperator};
pub use type_checker::{validate_filter_predicate, TypeChecker};
