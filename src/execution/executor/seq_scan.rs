use crate::execution::executor::ExecutorBase;
use crate::execution::ExecutionError;
use crate::storage::{BufferPoolRef, HeapFileRef, TableScan, TransactionId};
use crate::table::{SchemaRef, Tuple};

/// leaf operator, adapts a heap file's tuple sequence to the shared
/// operator lifecycle
pub struct SeqScanExecutor {
    pub(super) base: ExecutorBase,
    scan: TableScan,
    schema: SchemaRef,
}

impl SeqScanExecutor {
    pub fn new(file: &HeapFileRef, bpm: BufferPoolRef, tid: TransactionId) -> Self {
        Self {
            base: ExecutorBase::default(),
            schema: file.schema(),
            scan: file.scan(bpm, tid),
        }
    }
    pub(super) fn open_inner(&mut self) -> Result<(), ExecutionError> {
        self.scan.open();
        Ok(())
    }
    pub(super) fn close_inner(&mut self) -> Result<(), ExecutionError> {
        self.scan.close();
        Ok(())
    }
    pub(super) fn rewind_inner(&mut self) -> Result<(), ExecutionError> {
        self.scan.rewind();
        Ok(())
    }
    pub(super) fn fetch_next(&mut self) -> Result<Option<Tuple>, ExecutionError> {
        Ok(self.scan.next_tuple()?)
    }
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }
}
