use crate::storage::{
    BufferPoolRef, HeapPage, PageId, PageRef, Permission, StorageError, TransactionId, PAGE_SIZE,
};
use crate::table::{SchemaRef, Tuple};
use log::info;
use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::fs::{File, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// a heap file stores one table as a flat sequence of fixed-size pages,
/// tuples sit in no particular order
pub struct HeapFile {
    file: RefCell<File>,
    path: PathBuf,
    table_id: u32,
    schema: SchemaRef,
}

pub type HeapFileRef = Rc<HeapFile>;

impl HeapFile {
    pub fn open(path: impl AsRef<Path>, schema: SchemaRef) -> Result<HeapFileRef, StorageError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path.as_ref())?;
        let path = path.as_ref().canonicalize()?;
        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        let table_id = hasher.finish() as u32;
        info!("open heap file {} as table {}", path.display(), table_id);
        Ok(Rc::new(Self {
            file: RefCell::new(file),
            path,
            table_id,
            schema,
        }))
    }
    pub fn table_id(&self) -> u32 {
        self.table_id
    }
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }
    pub fn num_pages(&self) -> Result<usize, StorageError> {
        let len = self.file.borrow().metadata()?.len();
        assert_eq!(len % (PAGE_SIZE as u64), 0);
        Ok((len / (PAGE_SIZE as u64)) as usize)
    }
    /// positioned exact read of one page, a short read is an error here,
    /// never retried
    pub fn read_page(&self, pid: PageId) -> Result<HeapPage, StorageError> {
        if pid.page_no >= self.num_pages()? {
            return Err(StorageError::PageOutOfBound(pid));
        }
        let offset = pid.page_no * PAGE_SIZE;
        let mut buffer = HeapPage::empty_page_data();
        let mut file = self.file.borrow_mut();
        file.seek(SeekFrom::Start(offset as u64))?;
        file.read_exact(&mut buffer)?;
        HeapPage::from_bytes(pid, self.schema.clone(), &buffer)
    }
    /// the write path belongs to an external collaborator
    pub fn write_page(&self, _page: &HeapPage) -> Result<(), StorageError> {
        todo!()
    }
    pub fn insert_tuple(
        &self,
        _tid: TransactionId,
        _tuple: Tuple,
    ) -> Result<Vec<PageRef>, StorageError> {
        todo!()
    }
    pub fn delete_tuple(
        &self,
        _tid: TransactionId,
        _tuple: Tuple,
    ) -> Result<Vec<PageRef>, StorageError> {
        todo!()
    }
    pub fn scan(self: &Rc<Self>, bpm: BufferPoolRef, tid: TransactionId) -> TableScan {
        TableScan {
            file: self.clone(),
            bpm,
            tid,
            cursor: None,
        }
    }
}

struct Cursor {
    page_no: usize,
    page: Option<PageRef>,
    slot: usize,
}

/// pull-based tuple sequence over every page of a heap file, pages are
/// fetched through the buffer pool with read-only permission and stay
/// pinned only while the scan reads them
pub struct TableScan {
    file: HeapFileRef,
    bpm: BufferPoolRef,
    tid: TransactionId,
    cursor: Option<Cursor>,
}

impl TableScan {
    /// position lazily at page zero, no page is fetched until the
    /// first pull
    pub fn open(&mut self) {
        self.release_page();
        self.cursor = Some(Cursor {
            page_no: 0,
            page: None,
            slot: 0,
        });
    }
    pub fn close(&mut self) {
        self.release_page();
        self.cursor = None;
    }
    pub fn rewind(&mut self) {
        self.open();
    }
    /// next tuple in slot-then-page order, `None` once every page is
    /// exhausted, a closed scan yields nothing
    pub fn next_tuple(&mut self) -> Result<Option<Tuple>, StorageError> {
        let num_pages = self.file.num_pages()?;
        let table_id = self.file.table_id();
        let tid = self.tid;
        loop {
            let cursor = match self.cursor.as_mut() {
                Some(cursor) => cursor,
                None => return Ok(None),
            };
            if cursor.page_no >= num_pages {
                return Ok(None);
            }
            if cursor.page.is_none() {
                let pid = PageId::new(table_id, cursor.page_no);
                let page = self
                    .bpm
                    .borrow_mut()
                    .get_page(tid, pid, Permission::ReadOnly)?;
                cursor.page = Some(page);
                cursor.slot = 0;
            }
            let page = cursor.page.as_ref().unwrap().clone();
            let page = page.borrow();
            while cursor.slot < page.num_slots() {
                let slot = cursor.slot;
                cursor.slot += 1;
                if let Some(tuple) = page.tuple_at(slot) {
                    // handed upward as a copy, independent of the page
                    return Ok(Some(tuple.clone()));
                }
            }
            drop(page);
            let page = cursor.page.take().unwrap();
            let pid = page.borrow().page_id();
            self.bpm.borrow_mut().unpin(pid);
            cursor.page_no += 1;
        }
    }
    fn release_page(&mut self) {
        if let Some(cursor) = self.cursor.as_mut() {
            if let Some(page) = cursor.page.take() {
                let pid = page.borrow().page_id();
                self.bpm.borrow_mut().unpin(pid);
            }
        }
    }
}

impl Drop for TableScan {
    fn drop(&mut self) {
        self.release_page();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::{DataType, Datum};
    use crate::storage::test_util::{build_heap_file, random_db_name};
    use crate::storage::BufferPool;
    use crate::table::Schema;
    use std::fs::remove_file;

    fn sample_schema() -> SchemaRef {
        Rc::new(Schema::from_slice(&[
            (DataType::new_int(), "id".to_string()),
            (DataType::new_varchar(8), "tag".to_string()),
        ]))
    }

    fn row(id: i32, tag: &str) -> Vec<Datum> {
        vec![id.into(), tag.into()]
    }

    #[test]
    fn test_read_page_and_num_pages() {
        let name = random_db_name();
        {
            let schema = sample_schema();
            let file = build_heap_file(
                name.as_str(),
                &schema,
                &[vec![row(1, "a"), row(2, "b")], vec![]],
            );
            assert_eq!(file.num_pages().unwrap(), 2);
            let page = file.read_page(PageId::new(file.table_id(), 0)).unwrap();
            assert_eq!(page.num_occupied(), 2);
            let page = file.read_page(PageId::new(file.table_id(), 1)).unwrap();
            assert_eq!(page.num_occupied(), 0);
            assert!(matches!(
                file.read_page(PageId::new(file.table_id(), 2)),
                Err(StorageError::PageOutOfBound(_))
            ));
        }
        remove_file(name).unwrap();
    }

    #[test]
    fn test_scan_crosses_empty_pages() {
        let name = random_db_name();
        {
            let schema = sample_schema();
            // leading, interior and trailing empty pages
            let file = build_heap_file(
                name.as_str(),
                &schema,
                &[
                    vec![],
                    vec![row(1, "a"), row(2, "b")],
                    vec![],
                    vec![],
                    vec![row(3, "c")],
                    vec![],
                ],
            );
            let bpm = BufferPool::new_shared(8);
            bpm.borrow_mut().register(file.clone());
            let mut scan = file.scan(bpm, TransactionId::new());
            scan.open();
            let mut ids = vec![];
            while let Some(tuple) = scan.next_tuple().unwrap() {
                ids.push(tuple.datum_at(0).unwrap().clone());
            }
            assert_eq!(ids, vec![Datum::Int(1), Datum::Int(2), Datum::Int(3)]);
            // exhausted stays exhausted
            assert!(scan.next_tuple().unwrap().is_none());
            scan.close();
        }
        remove_file(name).unwrap();
    }

    #[test]
    fn test_scan_zero_page_file() {
        let name = random_db_name();
        {
            let schema = sample_schema();
            let file = build_heap_file(name.as_str(), &schema, &[]);
            let bpm = BufferPool::new_shared(8);
            bpm.borrow_mut().register(file.clone());
            let mut scan = file.scan(bpm, TransactionId::new());
            scan.open();
            assert!(scan.next_tuple().unwrap().is_none());
        }
        remove_file(name).unwrap();
    }

    #[test]
    fn test_scan_rewind_restarts() {
        let name = random_db_name();
        {
            let schema = sample_schema();
            let file = build_heap_file(
                name.as_str(),
                &schema,
                &[vec![row(1, "a"), row(2, "b"), row(3, "c")]],
            );
            let bpm = BufferPool::new_shared(8);
            bpm.borrow_mut().register(file.clone());
            let mut scan = file.scan(bpm, TransactionId::new());
            scan.open();
            scan.next_tuple().unwrap().unwrap();
            scan.next_tuple().unwrap().unwrap();
            scan.rewind();
            let first = scan.next_tuple().unwrap().unwrap();
            assert_eq!(first.datum_at(0).unwrap(), &Datum::Int(1));
        }
        remove_file(name).unwrap();
    }

    #[test]
    fn test_closed_scan_yields_nothing() {
        let name = random_db_name();
        {
            let schema = sample_schema();
            let file = build_heap_file(name.as_str(), &schema, &[vec![row(1, "a")]]);
            let bpm = BufferPool::new_shared(8);
            bpm.borrow_mut().register(file.clone());
            let mut scan = file.scan(bpm, TransactionId::new());
            assert!(scan.next_tuple().unwrap().is_none());
        }
        remove_file(name).unwrap();
    }

    #[test]
    fn test_scan_yields_copies() {
        let name = random_db_name();
        {
            let schema = sample_schema();
            let file = build_heap_file(name.as_str(), &schema, &[vec![row(1, "a")]]);
            let bpm = BufferPool::new_shared(8);
            bpm.borrow_mut().register(file.clone());
            let mut scan = file.scan(bpm.clone(), TransactionId::new());
            scan.open();
            let mut tuple = scan.next_tuple().unwrap().unwrap();
            scan.close();
            tuple.set_datum(0, 99.into()).unwrap();
            // the cached page is untouched by mutation of the copy
            let pid = PageId::new(file.table_id(), 0);
            let page = bpm
                .borrow_mut()
                .get_page(TransactionId::new(), pid, Permission::ReadOnly)
                .unwrap();
            assert_eq!(
                page.borrow().tuple_at(0).unwrap().datum_at(0).unwrap(),
                &Datum::Int(1)
            );
        }
        remove_file(name).unwrap();
    }
}
