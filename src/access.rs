//! Access layer for tuple-oriented values.
//!
//! - **Value**: type-safe representation of attribute values
//! - **DataType**: the attribute domains
//! - **Tuple**: fixed-arity value sequences compared by value

pub mod tuple;
pub mod value;

pub use tuple::Tuple;
pub use value::{DataType, Value};
