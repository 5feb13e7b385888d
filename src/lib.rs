pub mod access;
pub mod algebra;
pub mod catalog;
pub mod config;
pub mod database;
pub mod executor;
pub mod expression;
pub mod ops;
pub mod planner;
pub mod relation;
pub mod snapshot;

pub use access::{DataType, Tuple, Value};
pub use catalog::{Catalog, CatalogError, Schema, SchemaError};
pub use config::{EngineConfig, JoinStrategy};
pub use database::{Database, StatementOutcome};
pub use expression::{Expression, ExpressionError};
pub use relation::Relation;
