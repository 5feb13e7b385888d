//! Relation store.
//!
//! The catalog owns every named relation together with its key constraints.
//! Relations are held behind `Arc` so queries can snapshot them cheaply;
//! every mutation builds a new relation, validates it, and swaps it in, so a
//! rejected statement leaves the store untouched.

pub mod constraint;
pub mod error;
pub mod schema;

pub use constraint::{ForeignKey, PrimaryKey};
pub use error::{CatalogError, SchemaError};
pub use schema::{Attribute, Schema};

use crate::access::{DataType, Tuple};
use crate::relation::Relation;
use anyhow::Result;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Definition of a base relation, as written in `CREATE RELATION`
#[derive(Debug, Clone, PartialEq)]
pub struct RelationDefinition {
    pub name: String,
    pub attributes: Vec<(String, DataType)>,
    pub primary_key: Option<Vec<String>>,
    pub foreign_keys: Vec<ForeignKeyDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyDefinition {
    pub attributes: Vec<String>,
    pub referenced_relation: String,
    pub referenced_attributes: Vec<String>,
}

/// A named relation with its constraints
#[derive(Debug, Clone)]
pub struct StoredRelation {
    pub name: String,
    pub relation: Arc<Relation>,
    pub primary_key: PrimaryKey,
    pub foreign_keys: Vec<ForeignKey>,
    /// Materialized from an expression; read-only
    pub derived: bool,
}

#[derive(Debug, Default)]
pub struct Catalog {
    relations: BTreeMap<String, StoredRelation>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a base relation
    pub fn create_relation(&mut self, definition: RelationDefinition) -> Result<()> {
        let name = definition.name;
        if self.relations.contains_key(&name) {
            return Err(CatalogError::RelationExists(name).into());
        }
        if definition.attributes.is_empty() {
            return Err(SchemaError::InvalidKey {
                reason: format!("relation '{}' needs at least one attribute", name),
            }
            .into());
        }

        let mut seen = HashSet::new();
        for (attr, _) in &definition.attributes {
            if !seen.insert(attr.as_str()) {
                return Err(SchemaError::DuplicateAttribute { name: attr.clone() }.into());
            }
        }

        let schema = Schema::new(
            definition
                .attributes
                .iter()
                .map(|(attr, data_type)| Attribute::qualified(&name, attr, *data_type))
                .collect(),
        );

        let primary_key = match definition.primary_key {
            Some(attributes) => PrimaryKey::new(&schema, attributes)?,
            None => PrimaryKey::all_attributes(&schema),
        };

        let mut foreign_keys = Vec::with_capacity(definition.foreign_keys.len());
        for fk in definition.foreign_keys {
            let foreign_key = if fk.referenced_relation == name {
                ForeignKey::new(
                    &schema,
                    fk.attributes,
                    fk.referenced_relation,
                    &schema,
                    &primary_key,
                    fk.referenced_attributes,
                )?
            } else {
                let referenced = self.get(&fk.referenced_relation)?;
                ForeignKey::new(
                    &schema,
                    fk.attributes,
                    fk.referenced_relation.clone(),
                    referenced.relation.schema(),
                    &referenced.primary_key,
                    fk.referenced_attributes,
                )?
            };
            foreign_keys.push(foreign_key);
        }

        log::debug!("Created relation {} {}", name, schema);
        self.relations.insert(
            name.clone(),
            StoredRelation {
                name,
                relation: Arc::new(Relation::empty(schema)),
                primary_key,
                foreign_keys,
                derived: false,
            },
        );
        Ok(())
    }

    /// Store the result of an expression under `name`, requalified with it
    pub fn define_derived(&mut self, name: &str, relation: Relation) -> Result<()> {
        if self.relations.contains_key(name) {
            return Err(CatalogError::RelationExists(name.to_string()).into());
        }
        // Requalifying merges R.a and S.a into one name
        let mut seen = HashSet::new();
        for attribute in relation.schema().attributes() {
            if !seen.insert(attribute.name.as_str()) {
                return Err(SchemaError::DuplicateAttribute {
                    name: attribute.name.clone(),
                }
                .into());
            }
        }
        let relation = relation.with_qualifier(name);
        let primary_key = PrimaryKey::all_attributes(relation.schema());
        self.relations.insert(
            name.to_string(),
            StoredRelation {
                name: name.to_string(),
                relation: Arc::new(relation),
                primary_key,
                foreign_keys: Vec::new(),
                derived: true,
            },
        );
        Ok(())
    }

    /// Restore a stored relation as-is (used when loading snapshots)
    pub(crate) fn restore(&mut self, stored: StoredRelation) -> Result<()> {
        if self.relations.contains_key(&stored.name) {
            return Err(CatalogError::RelationExists(stored.name).into());
        }
        self.relations.insert(stored.name.clone(), stored);
        Ok(())
    }

    pub fn drop_relation(&mut self, name: &str) -> Result<()> {
        self.get(name)?;
        for other in self.relations.values() {
            if other.name == name {
                continue;
            }
            if other
                .foreign_keys
                .iter()
                .any(|fk| fk.referenced_relation == name)
            {
                return Err(CatalogError::DropReferenced {
                    relation: name.to_string(),
                    referencing: other.name.clone(),
                }
                .into());
            }
        }
        self.relations.remove(name);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&StoredRelation, CatalogError> {
        self.relations
            .get(name)
            .ok_or_else(|| CatalogError::UnknownRelation(name.to_string()))
    }

    /// Snapshot of a relation's current contents
    pub fn relation(&self, name: &str) -> Result<Arc<Relation>, CatalogError> {
        Ok(self.get(name)?.relation.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    pub fn relation_names(&self) -> Vec<String> {
        self.relations.keys().cloned().collect()
    }

    pub fn stored_relations(&self) -> impl Iterator<Item = &StoredRelation> {
        self.relations.values()
    }

    /// Insert tuples atomically; returns how many were new
    pub fn insert(&mut self, name: &str, tuples: Vec<Tuple>) -> Result<usize> {
        let stored = self.writable(name)?;
        let mut next = (*stored.relation).clone();
        let mut keys: HashSet<Tuple> = next.iter().map(|t| stored.primary_key.key_of(t)).collect();

        let mut inserted = Vec::new();
        for tuple in tuples {
            next.schema().check_tuple(&tuple)?;
            if next.contains(&tuple) {
                continue;
            }
            let key = stored.primary_key.key_of(&tuple);
            if !keys.insert(key.clone()) {
                return Err(CatalogError::PrimaryKeyViolation {
                    relation: name.to_string(),
                    key: key.to_string(),
                }
                .into());
            }
            next.insert(tuple.clone())?;
            inserted.push(tuple);
        }

        self.verify_outgoing(stored, &next, inserted.iter())?;

        let count = inserted.len();
        self.replace(name, next);
        Ok(count)
    }

    /// Delete every tuple for which `predicate` holds; returns how many went
    pub fn delete_where<F>(&mut self, name: &str, mut predicate: F) -> Result<usize>
    where
        F: FnMut(&Tuple) -> Result<bool>,
    {
        let stored = self.writable(name)?;
        let mut next = Relation::empty(stored.relation.schema().clone());
        let mut removed = 0;
        for tuple in stored.relation.iter() {
            if predicate(tuple)? {
                removed += 1;
            } else {
                next.insert(tuple.clone())?;
            }
        }

        self.verify_incoming(name, &next)?;

        self.replace(name, next);
        Ok(removed)
    }

    /// Rewrite tuples: `update` returns the replacement for tuples it touches.
    /// Returns how many tuples actually changed.
    pub fn update_where<F>(&mut self, name: &str, mut update: F) -> Result<usize>
    where
        F: FnMut(&Tuple) -> Result<Option<Tuple>>,
    {
        let stored = self.writable(name)?;
        let mut next = Relation::empty(stored.relation.schema().clone());
        let mut changed = Vec::new();
        for tuple in stored.relation.iter() {
            match update(tuple)? {
                // Rewriting a tuple to itself is not a change
                Some(replacement) if replacement != *tuple => {
                    next.insert(replacement.clone())?;
                    changed.push(replacement);
                }
                _ => {
                    next.insert(tuple.clone())?;
                }
            }
        }

        let mut keys = HashSet::new();
        for tuple in next.iter() {
            let key = stored.primary_key.key_of(tuple);
            if !keys.insert(key.clone()) {
                return Err(CatalogError::PrimaryKeyViolation {
                    relation: name.to_string(),
                    key: key.to_string(),
                }
                .into());
            }
        }

        self.verify_outgoing(stored, &next, changed.iter())?;
        self.verify_incoming(name, &next)?;

        let count = changed.len();
        self.replace(name, next);
        Ok(count)
    }

    fn writable(&self, name: &str) -> Result<&StoredRelation, CatalogError> {
        let stored = self.get(name)?;
        if stored.derived {
            return Err(CatalogError::ReadOnlyRelation(name.to_string()));
        }
        Ok(stored)
    }

    fn replace(&mut self, name: &str, relation: Relation) {
        if let Some(stored) = self.relations.get_mut(name) {
            stored.relation = Arc::new(relation);
        }
    }

    /// Every foreign key of `stored` must find its target for the given tuples.
    /// `next` stands in for the relation itself when it references itself.
    fn verify_outgoing<'a>(
        &self,
        stored: &StoredRelation,
        next: &Relation,
        tuples: impl Iterator<Item = &'a Tuple> + Clone,
    ) -> Result<(), CatalogError> {
        for fk in &stored.foreign_keys {
            let parent: &Relation = if fk.referenced_relation == stored.name {
                next
            } else {
                &self.get(&fk.referenced_relation)?.relation
            };
            let parent_keys: HashSet<Tuple> =
                parent.iter().map(|t| fk.referenced_key_of(t)).collect();
            for tuple in tuples.clone() {
                let key = fk.key_of(tuple);
                if !parent_keys.contains(&key) {
                    return Err(CatalogError::ForeignKeyViolation {
                        relation: stored.name.clone(),
                        referenced: fk.referenced_relation.clone(),
                        key: key.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Every foreign key pointing at `name` must still find its target in `next`
    fn verify_incoming(&self, name: &str, next: &Relation) -> Result<(), CatalogError> {
        for child in self.relations.values() {
            for fk in child
                .foreign_keys
                .iter()
                .filter(|fk| fk.referenced_relation == name)
            {
                let parent_keys: HashSet<Tuple> =
                    next.iter().map(|t| fk.referenced_key_of(t)).collect();
                let child_relation: &Relation = if child.name == name {
                    next
                } else {
                    &child.relation
                };
                for tuple in child_relation.iter() {
                    let key = fk.key_of(tuple);
                    if !parent_keys.contains(&key) {
                        return Err(CatalogError::RestrictViolation {
                            relation: name.to_string(),
                            referencing: child.name.clone(),
                            key: key.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
