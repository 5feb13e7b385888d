//! Key constraints of stored relations.

use crate::access::Tuple;
use crate::catalog::{Schema, SchemaError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Attribute subset unique across a relation's tuples
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub attributes: Vec<String>,
    pub(crate) columns: Vec<usize>,
}

impl PrimaryKey {
    /// Resolve key attribute names against the relation's schema
    pub fn new(schema: &Schema, attributes: Vec<String>) -> Result<Self, SchemaError> {
        if attributes.is_empty() {
            return Err(SchemaError::InvalidKey {
                reason: "primary key must name at least one attribute".to_string(),
            });
        }
        let columns = resolve_distinct(schema, &attributes)?;
        Ok(Self {
            attributes,
            columns,
        })
    }

    /// Key made of every attribute, the implicit key of a set
    pub fn all_attributes(schema: &Schema) -> Self {
        Self {
            attributes: schema.attributes().iter().map(|a| a.name.clone()).collect(),
            columns: (0..schema.len()).collect(),
        }
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn key_of(&self, tuple: &Tuple) -> Tuple {
        tuple.project(&self.columns)
    }
}

/// Attribute list whose values must match the primary key of another relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub attributes: Vec<String>,
    pub referenced_relation: String,
    pub referenced_attributes: Vec<String>,
    pub(crate) columns: Vec<usize>,
    pub(crate) referenced_columns: Vec<usize>,
}

impl ForeignKey {
    /// Validate a foreign key against the referencing and referenced schemas.
    ///
    /// The referenced attributes must be exactly the referenced relation's
    /// primary key, with matching domains position by position.
    pub fn new(
        schema: &Schema,
        attributes: Vec<String>,
        referenced_relation: String,
        referenced_schema: &Schema,
        referenced_key: &PrimaryKey,
        referenced_attributes: Vec<String>,
    ) -> Result<Self, SchemaError> {
        if attributes.len() != referenced_attributes.len() {
            return Err(SchemaError::InvalidKey {
                reason: format!(
                    "foreign key has {} attributes but references {}",
                    attributes.len(),
                    referenced_attributes.len()
                ),
            });
        }

        let columns = resolve_distinct(schema, &attributes)?;
        let referenced_columns = resolve_distinct(referenced_schema, &referenced_attributes)?;

        let key_set: HashSet<usize> = referenced_key.columns.iter().copied().collect();
        let ref_set: HashSet<usize> = referenced_columns.iter().copied().collect();
        if key_set != ref_set {
            return Err(SchemaError::InvalidKey {
                reason: format!(
                    "foreign key must reference the primary key ({}) of '{}'",
                    referenced_key.attributes.join(", "),
                    referenced_relation
                ),
            });
        }

        for (&c, &r) in columns.iter().zip(&referenced_columns) {
            let local = &schema.attributes()[c];
            let remote = &referenced_schema.attributes()[r];
            if local.data_type != remote.data_type {
                return Err(SchemaError::InvalidKey {
                    reason: format!(
                        "{} is {} but {}.{} is {}",
                        local.name,
                        local.data_type,
                        referenced_relation,
                        remote.name,
                        remote.data_type
                    ),
                });
            }
        }

        Ok(Self {
            attributes,
            referenced_relation,
            referenced_attributes,
            columns,
            referenced_columns,
        })
    }

    pub fn key_of(&self, tuple: &Tuple) -> Tuple {
        tuple.project(&self.columns)
    }

    pub fn referenced_key_of(&self, tuple: &Tuple) -> Tuple {
        tuple.project(&self.referenced_columns)
    }
}

fn resolve_distinct(schema: &Schema, names: &[String]) -> Result<Vec<usize>, SchemaError> {
    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let index = schema.resolve(None, name)?;
        if columns.contains(&index) {
            return Err(SchemaError::DuplicateAttribute { name: name.clone() });
        }
        columns.push(index);
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::DataType;
    use crate::tuple;

    fn album_schema() -> Schema {
        Schema::qualified(
            "Album",
            &[
                ("title", DataType::Varchar),
                ("artist", DataType::Varchar),
                ("year", DataType::Int32),
            ],
        )
    }

    fn artist_schema() -> Schema {
        Schema::qualified(
            "Artist",
            &[("name", DataType::Varchar), ("year", DataType::Int32)],
        )
    }

    #[test]
    fn test_primary_key() -> Result<(), SchemaError> {
        let pk = PrimaryKey::new(&album_schema(), vec!["artist".into(), "title".into()])?;
        assert_eq!(pk.columns(), &[1, 0]);
        assert_eq!(
            pk.key_of(&tuple!["Enter the Wu-Tang", "Wu-Tang Clan", 1993]),
            tuple!["Wu-Tang Clan", "Enter the Wu-Tang"]
        );

        assert!(matches!(
            PrimaryKey::new(&album_schema(), vec!["title".into(), "title".into()]),
            Err(SchemaError::DuplicateAttribute { .. })
        ));
        assert!(matches!(
            PrimaryKey::new(&album_schema(), vec![]),
            Err(SchemaError::InvalidKey { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_foreign_key_must_reference_primary_key() -> Result<(), SchemaError> {
        let artist = artist_schema();
        let artist_pk = PrimaryKey::new(&artist, vec!["name".into()])?;

        let fk = ForeignKey::new(
            &album_schema(),
            vec!["artist".into()],
            "Artist".into(),
            &artist,
            &artist_pk,
            vec!["name".into()],
        )?;
        assert_eq!(fk.key_of(&tuple!["t", "GZA", 1995]), tuple!["GZA"]);

        let not_key = ForeignKey::new(
            &album_schema(),
            vec!["year".into()],
            "Artist".into(),
            &artist,
            &artist_pk,
            vec!["year".into()],
        );
        assert!(matches!(not_key, Err(SchemaError::InvalidKey { .. })));
        Ok(())
    }

    #[test]
    fn test_foreign_key_domain_mismatch() -> Result<(), SchemaError> {
        let artist = artist_schema();
        let year_pk = PrimaryKey::new(&artist, vec!["year".into()])?;
        let fk = ForeignKey::new(
            &album_schema(),
            vec!["title".into()],
            "Artist".into(),
            &artist,
            &year_pk,
            vec!["year".into()],
        );
        assert!(matches!(fk, Err(SchemaError::InvalidKey { .. })));
        Ok(())
    }
}
