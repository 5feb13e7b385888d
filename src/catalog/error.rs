//! Catalog layer error types.

use crate::access::DataType;
use thiserror::Error;

/// Errors raised when an operator or statement does not fit the schema it is
/// applied to.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Unknown attribute: {name}")]
    UnknownAttribute { name: String },

    #[error("Ambiguous attribute reference: {name} (qualify it or rename an input)")]
    AmbiguousAttribute { name: String },

    #[error("Duplicate attribute: {name}")]
    DuplicateAttribute { name: String },

    #[error("Relations are not union-compatible: {left} attributes vs {right} attributes")]
    ArityMismatch { left: usize, right: usize },

    #[error("Relations are not union-compatible: attribute {position} is {left} on the left but {right} on the right")]
    DomainMismatch {
        position: usize,
        left: DataType,
        right: DataType,
    },

    #[error("Projection requires at least one attribute")]
    EmptyProjection,

    #[error("Tuple has {actual} values but the relation has {expected} attributes")]
    TupleArity { expected: usize, actual: usize },

    #[error("Value for attribute {attribute} must be {expected}, got {actual}")]
    TupleDomain {
        attribute: String,
        expected: DataType,
        actual: DataType,
    },

    #[error("Invalid key declaration: {reason}")]
    InvalidKey { reason: String },
}

/// Errors raised by the relation store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Relation '{0}' does not exist")]
    UnknownRelation(String),

    #[error("Relation '{0}' already exists")]
    RelationExists(String),

    #[error("Relation '{0}' is derived and cannot be modified")]
    ReadOnlyRelation(String),

    #[error("Primary key violation on '{relation}': key {key} already exists")]
    PrimaryKeyViolation { relation: String, key: String },

    #[error("Foreign key violation on '{relation}': key {key} has no match in '{referenced}'")]
    ForeignKeyViolation {
        relation: String,
        referenced: String,
        key: String,
    },

    #[error("Key {key} of '{relation}' is still referenced by '{referencing}'")]
    RestrictViolation {
        relation: String,
        referencing: String,
        key: String,
    },

    #[error("Relation '{relation}' is referenced by '{referencing}' and cannot be dropped")]
    DropReferenced {
        relation: String,
        referencing: String,
    },
}
