use crate::datum::DatumError;
use crate::table::TableError;
use std::fmt;
use thiserror::Error;

mod buffer;
mod heap;
mod lock;
mod page;

pub use buffer::{BufferPool, BufferPoolRef};
pub use heap::{HeapFile, HeapFileRef, TableScan};
pub use lock::{LockTable, Permission, TransactionId};
pub use page::{HeapPage, PageRef, SlotIter};

/// the one fixed page size every piece of pagination arithmetic uses
pub const PAGE_SIZE: usize = 4096;

/// identity of one on-disk page, `table_id` is a stable hash of the
/// canonical backing-file path
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PageId {
    pub table_id: u32,
    pub page_no: usize,
}

impl PageId {
    pub fn new(table_id: u32, page_no: usize) -> Self {
        Self { table_id, page_no }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(table {}, page {})", self.table_id, self.page_no)
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IOError: {0}")]
    IO(#[from] std::io::Error),
    #[error("DatumError: {0}")]
    Datum(#[from] DatumError),
    #[error("TableError: {0}")]
    Table(#[from] TableError),
    #[error("corrupt page image: {0}")]
    CorruptPage(String),
    #[error("page {0} beyond end of file")]
    PageOutOfBound(PageId),
    #[error("no heap file registered for table id {0}")]
    UnknownTable(u32),
    #[error("all buffered pages are pinned or locked")]
    PoolExhausted,
    #[error("transaction {0} aborted by lock conflict on {1}")]
    TransactionAborted(TransactionId, PageId),
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::datum::Datum;
    use crate::table::Schema;
    use rand::Rng;

    pub(crate) fn random_db_name() -> String {
        let mut rng = rand::thread_rng();
        format!("heapdb-test-{:08x}.db", rng.gen::<u32>())
    }

    /// encode one page image with `rows` occupying the first slots
    pub(crate) fn page_image(schema: &Schema, rows: &[Vec<Datum>]) -> Vec<u8> {
        let num_slots = HeapPage::num_slots_of(schema);
        let header_size = HeapPage::header_size_of(schema);
        let width = schema.byte_width();
        assert!(rows.len() <= num_slots);
        let mut image = vec![0u8; PAGE_SIZE];
        for (slot, row) in rows.iter().enumerate() {
            image[slot / 8] |= 1 << (slot % 8);
            let base = header_size + slot * width;
            for (column, datum) in schema.iter().zip(row.iter()) {
                let bytes = datum.to_bytes(&column.data_type);
                image[base + column.offset..base + column.offset + bytes.len()]
                    .copy_from_slice(bytes.as_slice());
            }
        }
        image
    }

    /// write a heap file of the given pages and open it
    pub(crate) fn build_heap_file(
        name: &str,
        schema: &crate::table::SchemaRef,
        pages: &[Vec<Vec<Datum>>],
    ) -> HeapFileRef {
        let mut bytes = vec![];
        for rows in pages {
            bytes.extend_from_slice(page_image(schema.as_ref(), rows.as_slice()).as_slice());
        }
        std::fs::write(name, bytes.as_slice()).unwrap();
        HeapFile::open(name, schema.clone()).unwrap()
    }
}
