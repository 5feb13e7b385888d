use crate::access::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One element of a relation: a fixed-arity sequence of values.
///
/// Tuples compare by value, so two tuples holding the same values are the
/// same element of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tuple {
    values: Vec<Value>,
}

impl Tuple {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn arity(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Concatenate two tuples (left values first)
    pub fn concat(&self, other: &Tuple) -> Tuple {
        let mut values = Vec::with_capacity(self.arity() + other.arity());
        values.extend_from_slice(&self.values);
        values.extend_from_slice(&other.values);
        Tuple::new(values)
    }

    /// Restrict the tuple to the given positions, in the given order
    pub fn project(&self, indices: &[usize]) -> Tuple {
        Tuple::new(indices.iter().map(|&i| self.values[i].clone()).collect())
    }
}

impl From<Vec<Value>> for Tuple {
    fn from(values: Vec<Value>) -> Self {
        Tuple::new(values)
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}

/// Build a tuple from heterogeneous literals: `tuple!["GZA", 1991, "USA"]`
#[macro_export]
macro_rules! tuple {
    ($($value:expr),* $(,)?) => {
        $crate::access::Tuple::new(vec![$($crate::access::Value::from($value)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_equality() {
        let t1 = Tuple::new(vec![Value::Int32(1), Value::from("x")]);
        let t2 = crate::tuple![1, "x"];
        let t3 = crate::tuple![1, "y"];

        assert_eq!(t1, t2);
        assert_ne!(t1, t3);
        assert_eq!(t1.arity(), 2);
    }

    #[test]
    fn test_tuple_concat_and_project() {
        let left = crate::tuple!["A1", 100];
        let right = crate::tuple![100, "X"];

        let combined = left.concat(&right);
        assert_eq!(combined, crate::tuple!["A1", 100, 100, "X"]);

        let projected = combined.project(&[3, 0]);
        assert_eq!(projected, crate::tuple!["X", "A1"]);
    }

    #[test]
    fn test_tuple_display() {
        let t = crate::tuple!["Oasis", 1991, "UK"];
        assert_eq!(t.to_string(), "(Oasis, 1991, UK)");
        assert_eq!(Tuple::new(vec![]).to_string(), "()");
    }
}
