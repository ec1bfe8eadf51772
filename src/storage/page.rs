use crate::datum::Datum;
use crate::storage::{PageId, StorageError, TransactionId, PAGE_SIZE};
use crate::table::{RecordId, Schema, SchemaRef, Tuple};
use std::cell::RefCell;
use std::rc::Rc;

///
/// HeapPage Format:
///
/// ```text
/// | Header | Record[0] | Record[1] | ...... | Record[n-1] | padding |
/// ```
///
/// the header is an occupancy bitmap of ceil(num_slots / 8) bytes, bit i
/// is set iff slot i holds a record, records are fixed width:
///
/// ```text
/// num_slots = floor(PAGE_SIZE * 8 / (record_width * 8 + 1))
/// ```
///
/// record bytes are only meaningful under a set bit, everything past the
/// last record is zero padding
///
pub struct HeapPage {
    page_id: PageId,
    schema: SchemaRef,
    header: Vec<u8>,
    slots: Vec<Option<Tuple>>,
    dirty: Option<TransactionId>,
}

pub type PageRef = Rc<RefCell<HeapPage>>;

/// walks the occupancy bitmap, yielding the occupied slot indices
pub struct SlotIter<'page> {
    idx: usize,
    header: &'page [u8],
    capacity: usize,
}

impl<'page> SlotIter<'page> {
    pub fn new(header: &'page [u8], capacity: usize) -> Self {
        Self {
            idx: 0,
            header,
            capacity,
        }
    }
}

impl<'page> Iterator for SlotIter<'page> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        while self.idx < self.capacity {
            let byte_pos = self.idx / 8;
            let bit_pos = self.idx % 8;
            if self.header[byte_pos] >> bit_pos == 0 {
                // rest of this byte is empty
                self.idx = (byte_pos + 1) * 8;
                continue;
            }
            let idx = self.idx;
            self.idx += 1;
            if (self.header[byte_pos] >> bit_pos) & 1 == 1 {
                return Some(idx);
            }
        }
        None
    }
}

impl HeapPage {
    pub fn num_slots_of(schema: &Schema) -> usize {
        PAGE_SIZE * 8 / (schema.byte_width() * 8 + 1)
    }
    pub fn header_size_of(schema: &Schema) -> usize {
        (Self::num_slots_of(schema) + 7) / 8
    }
    pub fn empty_page_data() -> [u8; PAGE_SIZE] {
        [0u8; PAGE_SIZE]
    }

    pub fn from_bytes(
        page_id: PageId,
        schema: SchemaRef,
        bytes: &[u8],
    ) -> Result<Self, StorageError> {
        if bytes.len() != PAGE_SIZE {
            return Err(StorageError::CorruptPage(format!(
                "page image is {} bytes, want {}",
                bytes.len(),
                PAGE_SIZE
            )));
        }
        let num_slots = Self::num_slots_of(schema.as_ref());
        let header_size = Self::header_size_of(schema.as_ref());
        let width = schema.byte_width();
        let header = bytes[0..header_size].to_vec();
        // bits past the slot capacity can never be set
        for idx in num_slots..header_size * 8 {
            if (header[idx / 8] >> (idx % 8)) & 1 == 1 {
                return Err(StorageError::CorruptPage(format!(
                    "bitmap marks slot {} beyond capacity {}",
                    idx, num_slots
                )));
            }
        }
        let mut slots = Vec::with_capacity(num_slots);
        for slot in 0..num_slots {
            if (header[slot / 8] >> (slot % 8)) & 1 == 0 {
                slots.push(None);
                continue;
            }
            let base = header_size + slot * width;
            let mut datums = vec![];
            for column in schema.iter() {
                let start = base + column.offset;
                let end = start + column.data_type.width_of_value();
                datums.push(Datum::from_bytes(&column.data_type, &bytes[start..end])?);
            }
            let mut tuple = Tuple::new(schema.clone(), datums)?;
            tuple.set_rid(Some(RecordId::new(page_id, slot)));
            slots.push(Some(tuple));
        }
        Ok(Self {
            page_id,
            schema,
            header,
            slots,
            dirty: None,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let header_size = self.header.len();
        let width = self.schema.byte_width();
        let mut bytes = vec![0u8; PAGE_SIZE];
        bytes[0..header_size].copy_from_slice(self.header.as_slice());
        for slot in self.slot_iter() {
            let tuple = self.slots[slot].as_ref().unwrap();
            let base = header_size + slot * width;
            for (column, datum) in self.schema.iter().zip(tuple.datums()) {
                let datum_bytes = datum.to_bytes(&column.data_type);
                bytes[base + column.offset..base + column.offset + datum_bytes.len()]
                    .copy_from_slice(datum_bytes.as_slice());
            }
        }
        bytes
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }
    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }
    pub fn is_slot_occupied(&self, slot: usize) -> bool {
        slot < self.slots.len() && self.slots[slot].is_some()
    }
    pub fn num_occupied(&self) -> usize {
        self.slot_iter().count()
    }
    pub fn tuple_at(&self, slot: usize) -> Option<&Tuple> {
        self.slots.get(slot).and_then(|slot| slot.as_ref())
    }
    pub fn slot_iter(&self) -> SlotIter {
        SlotIter::new(self.header.as_slice(), self.slots.len())
    }
    pub fn tuple_iter(&self) -> impl Iterator<Item = &Tuple> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn mark_dirty(&mut self, tid: Option<TransactionId>) {
        self.dirty = tid;
    }
    pub fn dirtied_by(&self) -> Option<TransactionId> {
        self.dirty
    }
}
