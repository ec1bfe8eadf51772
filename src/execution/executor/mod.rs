use crate::execution::ExecutionError;
use crate::table::{SchemaRef, Tuple};

pub use agg::{AggExecutor, AggregateOp, AggregatorImpl, IntAggregator, StringAggregator};
pub use filter::FilterExecutor;
pub use seq_scan::SeqScanExecutor;
pub use values::ValuesExecutor;

mod agg;
mod filter;
mod seq_scan;
mod values;

/// the lifecycle every operator honors: Closed -> Open -> Closed, with
/// rewind valid only while open and has_next/next pumping in between,
/// schema is available in either state and never consumes input
pub trait Executor {
    fn open(&mut self) -> Result<(), ExecutionError>;
    fn close(&mut self) -> Result<(), ExecutionError>;
    fn rewind(&mut self) -> Result<(), ExecutionError>;
    fn has_next(&mut self) -> Result<bool, ExecutionError>;
    fn next(&mut self) -> Result<Tuple, ExecutionError>;
    fn schema(&self) -> SchemaRef;
}

/// open flag plus one buffered tuple, has_next/next are served from the
/// buffer on top of each executor's fetch_next primitive
#[derive(Default)]
pub struct ExecutorBase {
    open: bool,
    lookahead: Option<Tuple>,
}

pub enum ExecutorImpl {
    SeqScan(SeqScanExecutor),
    Filter(FilterExecutor),
    Agg(AggExecutor),
    Values(ValuesExecutor),
}

impl ExecutorImpl {
    fn base(&self) -> &ExecutorBase {
        match self {
            Self::SeqScan(executor) => &executor.base,
            Self::Filter(executor) => &executor.base,
            Self::Agg(executor) => &executor.base,
            Self::Values(executor) => &executor.base,
        }
    }
    fn base_mut(&mut self) -> &mut ExecutorBase {
        match self {
            Self::SeqScan(executor) => &mut executor.base,
            Self::Filter(executor) => &mut executor.base,
            Self::Agg(executor) => &mut executor.base,
            Self::Values(executor) => &mut executor.base,
        }
    }
    fn open_inner(&mut self) -> Result<(), ExecutionError> {
        match self {
            Self::SeqScan(executor) => executor.open_inner(),
            Self::Filter(executor) => executor.open_inner(),
            Self::Agg(executor) => executor.open_inner(),
            Self::Values(executor) => executor.open_inner(),
        }
    }
    fn close_inner(&mut self) -> Result<(), ExecutionError> {
        match self {
            Self::SeqScan(executor) => executor.close_inner(),
            Self::Filter(executor) => executor.close_inner(),
            Self::Agg(executor) => executor.close_inner(),
            Self::Values(executor) => executor.close_inner(),
        }
    }
    fn rewind_inner(&mut self) -> Result<(), ExecutionError> {
        match self {
            Self::SeqScan(executor) => executor.rewind_inner(),
            Self::Filter(executor) => executor.rewind_inner(),
            Self::Agg(executor) => executor.rewind_inner(),
            Self::Values(executor) => executor.rewind_inner(),
        }
    }
    fn fetch_next(&mut self) -> Result<Option<Tuple>, ExecutionError> {
        match self {
            Self::SeqScan(executor) => executor.fetch_next(),
            Self::Filter(executor) => executor.fetch_next(),
            Self::Agg(executor) => executor.fetch_next(),
            Self::Values(executor) => executor.fetch_next(),
        }
    }
}

impl Executor for ExecutorImpl {
    fn open(&mut self) -> Result<(), ExecutionError> {
        if self.base().open {
            return Err(ExecutionError::AlreadyOpen);
        }
        self.open_inner()?;
        let base = self.base_mut();
        base.open = true;
        base.lookahead = None;
        Ok(())
    }
    fn close(&mut self) -> Result<(), ExecutionError> {
        if !self.base().open {
            return Err(ExecutionError::NotOpen);
        }
        self.close_inner()?;
        let base = self.base_mut();
        base.open = false;
        base.lookahead = None;
        Ok(())
    }
    /// discard the current position and recompute from the start,
    /// construction parameters are preserved
    fn rewind(&mut self) -> Result<(), ExecutionError> {
        if !self.base().open {
            return Err(ExecutionError::NotOpen);
        }
        self.rewind_inner()?;
        self.base_mut().lookahead = None;
        Ok(())
    }
    fn has_next(&mut self) -> Result<bool, ExecutionError> {
        if !self.base().open {
            return Err(ExecutionError::NotOpen);
        }
        if self.base().lookahead.is_none() {
            let tuple = self.fetch_next()?;
            self.base_mut().lookahead = tuple;
        }
        Ok(self.base().lookahead.is_some())
    }
    fn next(&mut self) -> Result<Tuple, ExecutionError> {
        if !self.base().open {
            return Err(ExecutionError::NotOpen);
        }
        if self.base().lookahead.is_none() {
            let tuple = self.fetch_next()?;
            self.base_mut().lookahead = tuple;
        }
        self.base_mut()
            .lookahead
            .take()
            .ok_or(ExecutionError::EndOfStream)
    }
    fn schema(&self) -> SchemaRef {
        match self {
            Self::SeqScan(executor) => executor.schema(),
            Self::Filter(executor) => executor.schema(),
            Self::Agg(executor) => executor.schema(),
            Self::Values(executor) => executor.schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::{DataType, Datum};
    use crate::execution::{CmpOp, Predicate};
    use crate::storage::test_util::{build_heap_file, random_db_name};
    use crate::storage::{BufferPool, PageId, Permission, StorageError, TransactionId};
    use crate::table::Schema;
    use std::fs::remove_file;
    use std::rc::Rc;

    fn sample_schema() -> SchemaRef {
        Rc::new(Schema::from_slice(&[
            (DataType::new_int(), "id".to_string()),
            (DataType::new_varchar(8), "tag".to_string()),
        ]))
    }

    fn values_executor(rows: &[(i32, &str)]) -> ExecutorImpl {
        let schema = sample_schema();
        let tuples = rows
            .iter()
            .map(|(id, tag)| {
                Tuple::new(schema.clone(), vec![(*id).into(), (*tag).into()]).unwrap()
            })
            .collect();
        ExecutorImpl::Values(ValuesExecutor::new(schema, tuples).unwrap())
    }

    #[test]
    fn test_lifecycle_errors_fail_loudly() {
        let mut executor = values_executor(&[(1, "a")]);
        assert!(matches!(executor.has_next(), Err(ExecutionError::NotOpen)));
        assert!(matches!(executor.next(), Err(ExecutionError::NotOpen)));
        assert!(matches!(executor.rewind(), Err(ExecutionError::NotOpen)));
        assert!(matches!(executor.close(), Err(ExecutionError::NotOpen)));
        executor.open().unwrap();
        assert!(matches!(executor.open(), Err(ExecutionError::AlreadyOpen)));
        executor.close().unwrap();
        assert!(matches!(executor.next(), Err(ExecutionError::NotOpen)));
    }

    #[test]
    fn test_next_past_exhaustion() {
        let mut executor = values_executor(&[(1, "a")]);
        executor.open().unwrap();
        executor.next().unwrap();
        assert!(!executor.has_next().unwrap());
        assert!(matches!(executor.next(), Err(ExecutionError::EndOfStream)));
    }

    #[test]
    fn test_has_next_is_idempotent() {
        let mut executor = values_executor(&[(1, "a"), (2, "b")]);
        executor.open().unwrap();
        assert!(executor.has_next().unwrap());
        assert!(executor.has_next().unwrap());
        assert_eq!(executor.next().unwrap().datum_at(0).unwrap(), &Datum::Int(1));
    }

    #[test]
    fn test_schema_available_before_open() {
        let executor = values_executor(&[(1, "a")]);
        assert_eq!(executor.schema().len(), 2);
    }

    #[test]
    fn test_lock_conflict_surfaces_unmasked() {
        let name = random_db_name();
        {
            let schema = sample_schema();
            let file = build_heap_file(
                name.as_str(),
                &schema,
                &[vec![vec![1.into(), "a".into()]]],
            );
            let bpm = BufferPool::new_shared(8);
            bpm.borrow_mut().register(file.clone());
            // another transaction write-locks the only page
            let writer = TransactionId::new();
            let pid = PageId::new(file.table_id(), 0);
            bpm.borrow_mut()
                .get_page(writer, pid, Permission::ReadWrite)
                .unwrap();
            let scan = SeqScanExecutor::new(&file, bpm.clone(), TransactionId::new());
            let mut executor = ExecutorImpl::SeqScan(scan);
            executor.open().unwrap();
            assert!(matches!(
                executor.next(),
                Err(ExecutionError::Storage(StorageError::TransactionAborted(..)))
            ));
        }
        remove_file(name).unwrap();
    }

    #[test]
    fn test_scan_filter_agg_pipeline() {
        let name = random_db_name();
        {
            let schema = sample_schema();
            let file = build_heap_file(
                name.as_str(),
                &schema,
                &[
                    vec![
                        vec![1.into(), "a".into()],
                        vec![2.into(), "b".into()],
                        vec![3.into(), "c".into()],
                    ],
                    vec![],
                    vec![vec![4.into(), "d".into()], vec![5.into(), "e".into()]],
                ],
            );
            let bpm = BufferPool::new_shared(8);
            bpm.borrow_mut().register(file.clone());
            let scan = SeqScanExecutor::new(&file, bpm, TransactionId::new());
            let filter = FilterExecutor::new(
                ExecutorImpl::SeqScan(scan),
                Predicate::new(0, CmpOp::GreaterThan, 1.into()),
            );
            let agg = AggExecutor::new(
                ExecutorImpl::Filter(filter),
                0,
                None,
                AggregateOp::Sum,
            )
            .unwrap();
            let mut executor = ExecutorImpl::Agg(agg);
            executor.open().unwrap();
            // 2 + 3 + 4 + 5
            let tuple = executor.next().unwrap();
            assert_eq!(tuple.datum_at(0).unwrap(), &Datum::Int(14));
            assert!(!executor.has_next().unwrap());
            executor.close().unwrap();
        }
        remove_file(name).unwrap();
    }
}
