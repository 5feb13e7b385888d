//! In-memory relations: a schema plus a duplicate-free set of tuples.

use crate::access::{DataType, Tuple};
use crate::catalog::{Schema, SchemaError};
use std::collections::BTreeSet;
use std::fmt;

/// A set of tuples over a fixed schema.
///
/// Tuples are kept in an ordered set so printing and comparison are
/// deterministic; the order has no relational meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    schema: Schema,
    tuples: BTreeSet<Tuple>,
}

impl Relation {
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            tuples: BTreeSet::new(),
        }
    }

    /// Create a relation, validating every tuple against the schema.
    /// Duplicate tuples collapse.
    pub fn new(
        schema: Schema,
        tuples: impl IntoIterator<Item = Tuple>,
    ) -> Result<Self, SchemaError> {
        let mut relation = Self::empty(schema);
        for tuple in tuples {
            relation.insert(tuple)?;
        }
        Ok(relation)
    }

    /// Convenience constructor qualifying every attribute with `name`
    pub fn build(
        name: &str,
        attributes: &[(&str, DataType)],
        tuples: impl IntoIterator<Item = Tuple>,
    ) -> Result<Self, SchemaError> {
        Self::new(Schema::qualified(name, attributes), tuples)
    }

    /// Wrap tuples an executor already produced under `schema`
    pub(crate) fn from_trusted(schema: Schema, tuples: BTreeSet<Tuple>) -> Self {
        Self { schema, tuples }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn contains(&self, tuple: &Tuple) -> bool {
        self.tuples.contains(tuple)
    }

    /// Insert a tuple; returns false when it was already present
    pub fn insert(&mut self, tuple: Tuple) -> Result<bool, SchemaError> {
        self.schema.check_tuple(&tuple)?;
        Ok(self.tuples.insert(tuple))
    }

    pub fn remove(&mut self, tuple: &Tuple) -> bool {
        self.tuples.remove(tuple)
    }

    /// Same tuples, every attribute requalified with `qualifier`
    pub fn with_qualifier(&self, qualifier: &str) -> Relation {
        Relation {
            schema: self.schema.with_qualifier(qualifier),
            tuples: self.tuples.clone(),
        }
    }

    /// Compare tuple sets only, ignoring attribute names
    pub fn same_tuples(&self, other: &Relation) -> bool {
        self.tuples == other.tuples
    }
}

impl<'a> IntoIterator for &'a Relation {
    type Item = &'a Tuple;
    type IntoIter = std::collections::btree_set::Iter<'a, Tuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.iter()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers = self.schema.display_names();
        let rows: Vec<Vec<String>> = self
            .tuples
            .iter()
            .map(|t| t.values().iter().map(|v| v.to_string()).collect())
            .collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let separator = {
            let mut line = String::from("+");
            for w in &widths {
                line.push_str(&"-".repeat(w + 2));
                line.push('+');
            }
            line
        };

        let write_row = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            write!(f, "|")?;
            for (cell, w) in cells.iter().zip(&widths) {
                write!(f, " {:<width$} |", cell, width = *w)?;
            }
            writeln!(f)
        };

        writeln!(f, "{}", separator)?;
        write_row(f, &headers)?;
        writeln!(f, "{}", separator)?;
        for row in &rows {
            write_row(f, row)?;
        }
        writeln!(f, "{}", separator)?;
        let noun = if rows.len() == 1 { "tuple" } else { "tuples" };
        write!(f, "({} {})", rows.len(), noun)
    }
}
