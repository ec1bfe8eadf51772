mod datum;
mod execution;
mod storage;
mod table;

pub use datum::{DataType, Datum, DatumError, VarCharType};
pub use execution::{
    AggExecutor, AggregateOp, AggregatorImpl, CmpOp, ExecutionError, Executor, ExecutorImpl,
    FilterExecutor, IntAggregator, Predicate, SeqScanExecutor, StringAggregator, ValuesExecutor,
};
pub use storage::{
    BufferPool, BufferPoolRef, HeapFile, HeapFileRef, HeapPage, LockTable, PageId, PageRef,
    Permission, StorageError, TableScan, TransactionId, PAGE_SIZE,
};
pub use table::{Column, RecordId, Schema, SchemaRef, TableError, Tuple};
