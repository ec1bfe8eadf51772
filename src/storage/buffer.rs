use crate::storage::{
    HeapFileRef, LockTable, PageId, PageRef, Permission, StorageError, TransactionId, PAGE_SIZE,
};
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

struct Frame {
    page: PageRef,
    pin_count: usize,
    last_used: u64,
}

/// process-wide cache of decoded pages keyed by page identity, every
/// access is tagged with a transaction and a permission and goes through
/// the lock table first
pub struct BufferPool {
    capacity: usize,
    frames: HashMap<PageId, Frame>,
    files: HashMap<u32, HeapFileRef>,
    lock_table: LockTable,
    tick: u64,
}

pub type BufferPoolRef = Rc<RefCell<BufferPool>>;

impl BufferPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            frames: HashMap::new(),
            files: HashMap::new(),
            lock_table: LockTable::new(),
            tick: 0,
        }
    }
    pub fn new_shared(capacity: usize) -> BufferPoolRef {
        Rc::new(RefCell::new(Self::new(capacity)))
    }
    pub fn page_size(&self) -> usize {
        PAGE_SIZE
    }
    /// table-id to heap-file map consulted on cache misses
    pub fn register(&mut self, file: HeapFileRef) {
        self.files.insert(file.table_id(), file);
    }
    pub fn num_cached(&self) -> usize {
        self.frames.len()
    }
    pub fn contains(&self, pid: PageId) -> bool {
        self.frames.contains_key(&pid)
    }

    /// fetch a page under `tid` with `perm`, pinning it for the caller,
    /// a lock conflict surfaces as the transaction-abort error
    pub fn get_page(
        &mut self,
        tid: TransactionId,
        pid: PageId,
        perm: Permission,
    ) -> Result<PageRef, StorageError> {
        self.lock_table.acquire(tid, pid, perm)?;
        self.tick += 1;
        let tick = self.tick;
        if let Some(frame) = self.frames.get_mut(&pid) {
            frame.pin_count += 1;
            frame.last_used = tick;
            return Ok(frame.page.clone());
        }
        let file = self
            .files
            .get(&pid.table_id)
            .ok_or(StorageError::UnknownTable(pid.table_id))?
            .clone();
        if self.frames.len() >= self.capacity {
            self.evict()?;
        }
        let page = Rc::new(RefCell::new(file.read_page(pid)?));
        self.frames.insert(
            pid,
            Frame {
                page: page.clone(),
                pin_count: 1,
                last_used: tick,
            },
        );
        Ok(page)
    }

    pub fn unpin(&mut self, pid: PageId) {
        let frame = self.frames.get_mut(&pid).expect("unpin of uncached page");
        assert!(frame.pin_count > 0);
        frame.pin_count -= 1;
    }

    /// drop the least-recently-used eligible frame, a frame stays
    /// ineligible while pinned, write-locked or dirty
    fn evict(&mut self) -> Result<(), StorageError> {
        let lock_table = &self.lock_table;
        let victim = self
            .frames
            .iter()
            .filter(|(pid, frame)| {
                frame.pin_count == 0
                    && !lock_table.holds_write_lock(**pid)
                    && frame.page.borrow().dirtied_by().is_none()
            })
            .min_by_key(|(_, frame)| frame.last_used)
            .map(|(pid, _)| *pid);
        match victim {
            Some(pid) => {
                debug!("evict page {}", pid);
                self.frames.remove(&pid);
                Ok(())
            }
            None => Err(StorageError::PoolExhausted),
        }
    }

    /// commit or abort bookkeeping: the transaction's grants are released,
    /// flushing dirty pages belongs to the write path
    pub fn transaction_complete(&mut self, tid: TransactionId) {
        debug!("complete {}", tid);
        self.lock_table.release_all(tid);
    }
}
