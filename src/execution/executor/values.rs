use crate::execution::executor::ExecutorBase;
use crate::execution::ExecutionError;
use crate::table::{SchemaRef, TableError, Tuple};

/// emits a fixed in-memory batch of tuples, the leaf for constant rows
pub struct ValuesExecutor {
    pub(super) base: ExecutorBase,
    schema: SchemaRef,
    tuples: Vec<Tuple>,
    cursor: usize,
}

impl ValuesExecutor {
    pub fn new(schema: SchemaRef, tuples: Vec<Tuple>) -> Result<Self, ExecutionError> {
        if tuples
            .iter()
            .any(|tuple| tuple.schema().as_ref() != schema.as_ref())
        {
            return Err(TableError::DatumSchemaNotMatch.into());
        }
        Ok(Self {
            base: ExecutorBase::default(),
            schema,
            tuples,
            cursor: 0,
        })
    }
    pub(super) fn open_inner(&mut self) -> Result<(), ExecutionError> {
        self.cursor = 0;
        Ok(())
    }
    pub(super) fn close_inner(&mut self) -> Result<(), ExecutionError> {
        Ok(())
    }
    pub(super) fn rewind_inner(&mut self) -> Result<(), ExecutionError> {
        self.cursor = 0;
        Ok(())
    }
    pub(super) fn fetch_next(&mut self) -> Result<Option<Tuple>, ExecutionError> {
        if self.cursor < self.tuples.len() {
            let tuple = self.tuples[self.cursor].clone();
            self.cursor += 1;
            Ok(Some(tuple))
        } else {
            Ok(None)
        }
    }
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }
}
