use crate::storage::StorageError;
use crate::table::TableError;
use thiserror::Error;

mod executor;
mod predicate;

pub use executor::{
    AggExecutor, AggregateOp, AggregatorImpl, Executor, ExecutorImpl, FilterExecutor,
    IntAggregator, SeqScanExecutor, StringAggregator, ValuesExecutor,
};
pub use predicate::{CmpOp, Predicate};

#[derive(Error, Debug)]
pub enum ExecutionError {
    /// out-of-order lifecycle calls are caller bugs, never retried
    #[error("operator already open")]
    AlreadyOpen,
    #[error("operator not open")]
    NotOpen,
    /// recoverable by checking has_next first
    #[error("end of stream")]
    EndOfStream,
    #[error("{op} aggregate over a varchar field")]
    UnsupportedAggregate { op: AggregateOp },
    #[error("predicate operand type not match with field")]
    OperandTypeMismatch,
    #[error("TableError: {0}")]
    Table(#[from] TableError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
}
