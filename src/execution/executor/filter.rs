use crate::execution::executor::{Executor, ExecutorBase, ExecutorImpl};
use crate::execution::{ExecutionError, Predicate};
use crate::table::{SchemaRef, Tuple};

/// relational select, a pure pass-through that keeps the child's order
/// and multiplicity and never alters row shape
pub struct FilterExecutor {
    pub(super) base: ExecutorBase,
    predicate: Predicate,
    child: Box<ExecutorImpl>,
}

impl FilterExecutor {
    pub fn new(child: ExecutorImpl, predicate: Predicate) -> Self {
        Self {
            base: ExecutorBase::default(),
            predicate,
            child: Box::new(child),
        }
    }
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
    pub(super) fn open_inner(&mut self) -> Result<(), ExecutionError> {
        self.child.open()
    }
    pub(super) fn close_inner(&mut self) -> Result<(), ExecutionError> {
        self.child.close()
    }
    pub(super) fn rewind_inner(&mut self) -> Result<(), ExecutionError> {
        self.child.rewind()
    }
    pub(super) fn fetch_next(&mut self) -> Result<Option<Tuple>, ExecutionError> {
        while self.child.has_next()? {
            let tuple = self.child.next()?;
            if self.predicate.eval(&tuple)? {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }
    pub fn schema(&self) -> SchemaRef {
        self.child.schema()
    }
}
