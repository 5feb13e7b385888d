//! Attribute and schema definitions.

use crate::access::{DataType, Tuple};
use crate::catalog::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A named, typed column. The qualifier records which relation (or rename)
/// the attribute came from so `R.a` can be told apart from `S.a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub qualifier: Option<String>,
    pub data_type: DataType,
}

impl Attribute {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            qualifier: None,
            data_type,
        }
    }

    pub fn qualified(
        qualifier: impl Into<String>,
        name: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            name: name.into(),
            qualifier: Some(qualifier.into()),
            data_type,
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Whether a (possibly qualified) reference names this attribute
    pub fn matches(&self, qualifier: Option<&str>, name: &str) -> bool {
        if self.name != name {
            return false;
        }
        match qualifier {
            Some(q) => self.qualifier.as_deref() == Some(q),
            None => true,
        }
    }

    pub fn qualified_name(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{}.{}", q, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.qualified_name(), self.data_type)
    }
}

/// Ordered attribute list of a relation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    /// Build a schema whose attributes are all qualified with `qualifier`
    pub fn qualified(qualifier: &str, attributes: &[(&str, DataType)]) -> Self {
        Self::new(
            attributes
                .iter()
                .map(|(name, data_type)| Attribute::qualified(qualifier, *name, *data_type))
                .collect(),
        )
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn data_types(&self) -> Vec<DataType> {
        self.attributes.iter().map(|a| a.data_type).collect()
    }

    /// Resolve a possibly qualified attribute reference to its position
    pub fn resolve(&self, qualifier: Option<&str>, name: &str) -> Result<usize, SchemaError> {
        let mut found = None;
        for (i, attr) in self.attributes.iter().enumerate() {
            if attr.matches(qualifier, name) {
                if found.is_some() {
                    return Err(SchemaError::AmbiguousAttribute {
                        name: display_reference(qualifier, name),
                    });
                }
                found = Some(i);
            }
        }
        found.ok_or_else(|| SchemaError::UnknownAttribute {
            name: display_reference(qualifier, name),
        })
    }

    /// Resolve a reference written as `name` or `qualifier.name`
    pub fn resolve_str(&self, reference: &str) -> Result<usize, SchemaError> {
        match reference.split_once('.') {
            Some((qualifier, name)) => self.resolve(Some(qualifier), name),
            None => self.resolve(None, reference),
        }
    }

    /// Attributes of `self` followed by those of `other`
    pub fn concat(&self, other: &Schema) -> Schema {
        let mut attributes = self.attributes.clone();
        attributes.extend(other.attributes.iter().cloned());
        Schema::new(attributes)
    }

    pub fn project(&self, indices: &[usize]) -> Schema {
        Schema::new(
            indices
                .iter()
                .map(|&i| self.attributes[i].clone())
                .collect(),
        )
    }

    pub fn with_qualifier(&self, qualifier: &str) -> Schema {
        Schema::new(
            self.attributes
                .iter()
                .cloned()
                .map(|a| a.with_qualifier(qualifier))
                .collect(),
        )
    }

    /// Check that union, intersection and difference may combine the two schemas
    pub fn check_union_compatible(&self, other: &Schema) -> Result<(), SchemaError> {
        if self.len() != other.len() {
            return Err(SchemaError::ArityMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        for (position, (l, r)) in self.attributes.iter().zip(&other.attributes).enumerate() {
            if l.data_type != r.data_type {
                return Err(SchemaError::DomainMismatch {
                    position,
                    left: l.data_type,
                    right: r.data_type,
                });
            }
        }
        Ok(())
    }

    /// Attribute position pairs `(left, right)` sharing an unqualified name
    pub fn common_attributes(&self, other: &Schema) -> Result<Vec<(usize, usize)>, SchemaError> {
        let mut pairs = Vec::new();
        let mut seen = HashSet::new();
        for attr in &self.attributes {
            if !seen.insert(attr.name.as_str()) {
                continue;
            }
            if other.attributes.iter().any(|a| a.name == attr.name) {
                let left = self.resolve(None, &attr.name)?;
                let right = other.resolve(None, &attr.name)?;
                if self.attributes[left].data_type != other.attributes[right].data_type {
                    return Err(SchemaError::DomainMismatch {
                        position: left,
                        left: self.attributes[left].data_type,
                        right: other.attributes[right].data_type,
                    });
                }
                pairs.push((left, right));
            }
        }
        Ok(pairs)
    }

    /// Validate that a tuple belongs to this schema
    pub fn check_tuple(&self, tuple: &Tuple) -> Result<(), SchemaError> {
        if tuple.arity() != self.len() {
            return Err(SchemaError::TupleArity {
                expected: self.len(),
                actual: tuple.arity(),
            });
        }
        for (value, attr) in tuple.values().iter().zip(&self.attributes) {
            if !value.is_compatible_with(attr.data_type) {
                return Err(SchemaError::TupleDomain {
                    attribute: attr.qualified_name(),
                    expected: attr.data_type,
                    actual: value.data_type(),
                });
            }
        }
        Ok(())
    }

    /// Column headers: bare names unless two attributes share one
    pub fn display_names(&self) -> Vec<String> {
        self.attributes
            .iter()
            .map(|a| {
                let clashes = self.attributes.iter().filter(|b| b.name == a.name).count() > 1;
                if clashes {
                    a.qualified_name()
                } else {
                    a.name.clone()
                }
            })
            .collect()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, attr) in self.attributes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", attr)?;
        }
        write!(f, ")")
    }
}

fn display_reference(qualifier: Option<&str>, name: &str) -> String {
    match qualifier {
        Some(q) => format!("{}.{}", q, name),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple;

    fn artist_schema() -> Schema {
        Schema::qualified(
            "Artist",
            &[
                ("name", DataType::Varchar),
                ("year", DataType::Int32),
                ("country", DataType::Varchar),
            ],
        )
    }

    #[test]
    fn test_resolve() {
        let schema = artist_schema();
        assert_eq!(schema.resolve(None, "year"), Ok(1));
        assert_eq!(schema.resolve(Some("Artist"), "country"), Ok(2));
        assert_eq!(schema.resolve_str("Artist.name"), Ok(0));
        assert!(matches!(
            schema.resolve(None, "genre"),
            Err(SchemaError::UnknownAttribute { .. })
        ));
        assert!(matches!(
            schema.resolve(Some("Album"), "name"),
            Err(SchemaError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_resolve_ambiguous() {
        let schema = artist_schema().concat(&Schema::qualified(
            "Album",
            &[("name", DataType::Varchar)],
        ));
        assert!(matches!(
            schema.resolve(None, "name"),
            Err(SchemaError::AmbiguousAttribute { .. })
        ));
        assert_eq!(schema.resolve(Some("Album"), "name"), Ok(3));
        assert_eq!(
            schema.display_names(),
            vec!["Artist.name", "year", "country", "Album.name"]
        );
    }

    #[test]
    fn test_union_compatibility() {
        let a = artist_schema();
        let b = Schema::qualified(
            "Other",
            &[
                ("n", DataType::Varchar),
                ("y", DataType::Int32),
                ("c", DataType::Varchar),
            ],
        );
        assert!(a.check_union_compatible(&b).is_ok());

        let short = a.project(&[0, 1]);
        assert_eq!(
            a.check_union_compatible(&short),
            Err(SchemaError::ArityMismatch { left: 3, right: 2 })
        );

        let swapped = a.project(&[1, 0, 2]);
        assert!(matches!(
            a.check_union_compatible(&swapped),
            Err(SchemaError::DomainMismatch { position: 0, .. })
        ));
    }

    #[test]
    fn test_common_attributes() {
        let r = Schema::qualified("R", &[("a_id", DataType::Varchar), ("b_id", DataType::Int32)]);
        let s = Schema::qualified("S", &[("b_id", DataType::Int32), ("value", DataType::Varchar)]);
        assert_eq!(r.common_attributes(&s), Ok(vec![(1, 0)]));

        let t = Schema::qualified("T", &[("x", DataType::Int32)]);
        assert_eq!(r.common_attributes(&t), Ok(vec![]));
    }

    #[test]
    fn test_check_tuple() {
        let schema = artist_schema();
        assert!(schema.check_tuple(&tuple!["GZA", 1991, "USA"]).is_ok());
        assert_eq!(
            schema.check_tuple(&tuple!["GZA", 1991]),
            Err(SchemaError::TupleArity {
                expected: 3,
                actual: 2
            })
        );
        assert!(matches!(
            schema.check_tuple(&tuple!["GZA", "1991", "USA"]),
            Err(SchemaError::TupleDomain { .. })
        ));
    }
}
