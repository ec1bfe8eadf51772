use crate::storage::PageId;

/// identity of one record slot, a non-owning link back to where
/// a tuple was read from
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordId {
    page_id: PageId,
    slot: usize,
}

impl RecordId {
    pub fn new(page_id: PageId, slot: usize) -> Self {
        Self { page_id, slot }
    }
    pub fn page_id(&self) -> PageId {
        self.page_id
    }
    pub fn slot(&self) -> usize {
        self.slot
    }
}
