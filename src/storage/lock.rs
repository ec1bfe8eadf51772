use crate::storage::{PageId, StorageError};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransactionId(u64);

impl TransactionId {
    pub fn new() -> Self {
        Self(NEXT_TRANSACTION_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "txn-{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Permission {
    ReadOnly,
    ReadWrite,
}

enum PageLock {
    Shared(HashSet<TransactionId>),
    Exclusive(TransactionId),
}

/// per-page shared/exclusive grant bookkeeping, the call contract of the
/// external transaction manager: a request is either granted or the
/// transaction is told to abort, blocking and deadlock policy live outside
pub struct LockTable {
    locks: HashMap<PageId, PageLock>,
}

impl LockTable {
    pub fn new() -> Self {
        Self {
            locks: HashMap::new(),
        }
    }
    pub fn acquire(
        &mut self,
        tid: TransactionId,
        pid: PageId,
        perm: Permission,
    ) -> Result<(), StorageError> {
        match self.locks.get_mut(&pid) {
            None => {
                let lock = match perm {
                    Permission::ReadOnly => {
                        let mut holders = HashSet::new();
                        holders.insert(tid);
                        PageLock::Shared(holders)
                    }
                    Permission::ReadWrite => PageLock::Exclusive(tid),
                };
                self.locks.insert(pid, lock);
                Ok(())
            }
            Some(PageLock::Exclusive(holder)) => {
                if *holder == tid {
                    Ok(())
                } else {
                    Err(StorageError::TransactionAborted(tid, pid))
                }
            }
            Some(PageLock::Shared(holders)) => match perm {
                Permission::ReadOnly => {
                    holders.insert(tid);
                    Ok(())
                }
                Permission::ReadWrite => {
                    // upgrade is allowed only for the sole holder
                    if holders.len() == 1 && holders.contains(&tid) {
                        self.locks.insert(pid, PageLock::Exclusive(tid));
                        Ok(())
                    } else {
                        Err(StorageError::TransactionAborted(tid, pid))
                    }
                }
            },
        }
    }
    pub fn release_all(&mut self, tid: TransactionId) {
        self.locks.retain(|_, lock| match lock {
            PageLock::Exclusive(holder) => *holder != tid,
            PageLock::Shared(holders) => {
                holders.remove(&tid);
                !holders.is_empty()
            }
        });
    }
    pub fn holds_write_lock(&self, pid: PageId) -> bool {
        matches!(self.locks.get(&pid), Some(PageLock::Exclusive(_)))
    }
    pub fn holds_lock(&self, tid: TransactionId, pid: PageId) -> bool {
        match self.locks.get(&pid) {
            None => false,
            Some(PageLock::Exclusive(holder)) => *holder == tid,
            Some(PageLock::Shared(holders)) => holders.contains(&tid),
        }
    }
}
