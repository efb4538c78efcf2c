use page::page_id::PageId;

/// A row identifier: the stable, trivially-copyable address of one record in
/// a heap file. Valid for the lifetime of the record (deletes tombstone
/// their slot rather than reassigning it), but carries no ordering
/// guarantees across tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rid {
    pub page_id: PageId,
    pub slot_id: u32,
}

impl Rid {
    pub fn new(page_id: PageId, slot_id: u32) -> Self {
        Self { page_id, slot_id }
    }
}

impl std::fmt::Display for Rid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.page_id, self.slot_id)
    }
}
