use crate::access::Tuple;
use crate::catalog::Schema;
use crate::executor::Executor;
use anyhow::{bail, Result};

/// Passes tuples through unchanged under a renamed schema
pub struct RenameExecutor {
    child: Box<dyn Executor>,
    output_schema: Schema,
    initialized: bool,
}

impl RenameExecutor {
    pub fn new(child: Box<dyn Executor>, output_schema: Schema) -> Result<Self> {
        let input = child.output_schema();
        if input.data_types() != output_schema.data_types() {
            bail!(
                "Rename cannot change the shape of a relation: {} vs {}",
                input,
                output_schema
            );
        }
        Ok(Self {
            child,
            output_schema,
            initialized: false,
        })
    }
}

impl Executor for RenameExecutor {
    fn init(&mut self) -> Result<()> {
        self.child.init()?;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }
        self.child.next()
    }

    fn output_schema(&self) -> &Schema {
        &self.output_schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::collect;
    use crate::executor::test_util::{artists, scan};

    #[test]
    fn test_rename_keeps_tuples() -> Result<()> {
        let renamed = artists().schema().with_qualifier("A");
        let result = collect(Box::new(RenameExecutor::new(scan(artists()), renamed)?))?;
        assert!(result.same_tuples(&artists()));
        assert_eq!(result.schema().resolve(Some("A"), "year"), Ok(1));
        assert!(result.schema().resolve(Some("Artist"), "year").is_err());
        Ok(())
    }

    #[test]
    fn test_rename_rejects_shape_change() {
        let schema = Schema::qualified("A", &[("name", crate::access::DataType::Varchar)]);
        assert!(RenameExecutor::new(scan(artists()), schema).is_err());
    }
}
