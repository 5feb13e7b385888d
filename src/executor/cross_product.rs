use crate::access::Tuple;
use crate::catalog::Schema;
use crate::executor::{materialize, Executor};
use anyhow::{bail, Result};

/// Cartesian product: every left tuple paired with every right tuple.
///
/// The right input is materialized once; the left input streams.
pub struct CrossProductExecutor {
    left: Box<dyn Executor>,
    right: Box<dyn Executor>,
    output_schema: Schema,
    right_tuples: Vec<Tuple>,
    current_left: Option<Tuple>,
    right_position: usize,
    initialized: bool,
}

impl CrossProductExecutor {
    pub fn new(left: Box<dyn Executor>, right: Box<dyn Executor>) -> Self {
        let output_schema = left.output_schema().concat(right.output_schema());
        Self {
            left,
            right,
            output_schema,
            right_tuples: Vec::new(),
            current_left: None,
            right_position: 0,
            initialized: false,
        }
    }
}

impl Executor for CrossProductExecutor {
    fn init(&mut self) -> Result<()> {
        self.left.init()?;
        self.right.init()?;
        self.right_tuples = materialize(self.right.as_mut())?;
        self.current_left = None;
        self.right_position = 0;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }
        if self.right_tuples.is_empty() {
            return Ok(None);
        }

        loop {
            if let Some(left) = &self.current_left {
                if let Some(right) = self.right_tuples.get(self.right_position) {
                    self.right_position += 1;
                    return Ok(Some(left.concat(right)));
                }
            }
            match self.left.next()? {
                Some(left) => {
                    self.current_left = Some(left);
                    self.right_position = 0;
                }
                None => return Ok(None),
            }
        }
    }

    fn output_schema(&self) -> &Schema {
        &self.output_schema
    }
}
