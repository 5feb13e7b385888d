//! Saving and loading the relation store.
//!
//! A snapshot is the whole catalog (schemas, keys, tuples and derived flags)
//! encoded with bincode. Loading validates every tuple against its schema
//! before the store is rebuilt.

use crate::access::Tuple;
use crate::catalog::{Catalog, ForeignKey, PrimaryKey, Schema, StoredRelation};
use crate::relation::Relation;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

/// Bumped whenever the encoded layout changes
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub version: u32,
    pub relations: Vec<RelationSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationSnapshot {
    pub name: String,
    pub schema: Schema,
    pub tuples: Vec<Tuple>,
    pub primary_key: PrimaryKey,
    pub foreign_keys: Vec<ForeignKey>,
    pub derived: bool,
}

impl CatalogSnapshot {
    pub fn capture(catalog: &Catalog) -> Self {
        let relations = catalog
            .stored_relations()
            .map(|stored| RelationSnapshot {
                name: stored.name.clone(),
                schema: stored.relation.schema().clone(),
                tuples: stored.relation.iter().cloned().collect(),
                primary_key: stored.primary_key.clone(),
                foreign_keys: stored.foreign_keys.clone(),
                derived: stored.derived,
            })
            .collect();
        Self {
            version: SNAPSHOT_VERSION,
            relations,
        }
    }

    /// Rebuild a catalog, rejecting tuples that do not fit their schema
    pub fn restore(self) -> Result<Catalog> {
        if self.version != SNAPSHOT_VERSION {
            bail!(
                "Unsupported snapshot version {} (expected {})",
                self.version,
                SNAPSHOT_VERSION
            );
        }

        let mut catalog = Catalog::new();
        for snapshot in self.relations {
            let arity = snapshot.schema.len();
            if snapshot.primary_key.columns().iter().any(|&c| c >= arity) {
                bail!("Corrupt primary key in snapshot of '{}'", snapshot.name);
            }
            let relation = Relation::new(snapshot.schema, snapshot.tuples)
                .with_context(|| format!("Invalid tuples in snapshot of '{}'", snapshot.name))?;
            catalog.restore(StoredRelation {
                name: snapshot.name,
                relation: Arc::new(relation),
                primary_key: snapshot.primary_key,
                foreign_keys: snapshot.foreign_keys,
                derived: snapshot.derived,
            })?;
        }
        Ok(catalog)
    }

    pub fn serialize(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

pub fn save(catalog: &Catalog, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create snapshot {}", path.display()))?;
    let snapshot = CatalogSnapshot::capture(catalog);
    bincode::serialize_into(BufWriter::new(file), &snapshot)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
    log::debug!(
        "Saved {} relations to {}",
        snapshot.relations.len(),
        path.display()
    );
    Ok(())
}

pub fn load(path: &Path) -> Result<Catalog> {
    let file =
        File::open(path).with_context(|| format!("Failed to open snapshot {}", path.display()))?;
    let snapshot: CatalogSnapshot = bincode::deserialize_from(BufReader::new(file))
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    snapshot.restore()
}
