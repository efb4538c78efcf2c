//! The storage manager: heap-file record storage on top of [`BufferCache`].
//!
//! A table is a single heap file (identified by its [`FileId`]) made up of
//! fixed-size pages. Records are appended to the last page of the file until
//! it runs out of room, at which point a new page is allocated. Writes
//! bypass the cache: a mutated page is flushed to the file manager directly
//! and then invalidated in the cache, per the no-writeback contract `buffer`
//! documents.

use crate::rid::Rid;
use crate::storage_error::StorageError;
use buffer::BufferCache;
use file::api::FileManager;
use page::Page;
use page::page_id::{FileId, PageId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Heap-file storage manager, generic over the backing [`FileManager`].
#[derive(Debug)]
pub struct StorageManager<F: FileManager> {
    file_manager: Arc<F>,
    buffer: Mutex<BufferCache<F>>,
    /// Highest allocated page number of each known table's heap file.
    last_page: Mutex<HashMap<FileId, u32>>,
}

impl<F: FileManager> StorageManager<F> {
    /// Creates a storage manager over `file_manager`, caching up to
    /// `buffer_capacity` pages at once.
    pub fn new(file_manager: Arc<F>, buffer_capacity: usize) -> Self {
        let buffer = BufferCache::new(Arc::clone(&file_manager), buffer_capacity);
        Self {
            file_manager,
            buffer: Mutex::new(buffer),
            last_page: Mutex::new(HashMap::new()),
        }
    }

    /// Registers `file_id` as a fresh, empty heap file and allocates its
    /// first page. Idempotent: re-registering an already-known file is a
    /// no-op.
    pub fn create_table(&self, file_id: FileId) -> Result<(), StorageError> {
        let mut last_page = self.last_page.lock().unwrap();
        if last_page.contains_key(&file_id) {
            return Ok(());
        }
        let page_id = PageId::new(file_id, 0);
        self.flush_new_page(page_id)?;
        last_page.insert(file_id, 0);
        Ok(())
    }

    /// Appends `record` to `file_id`'s heap file, returning the RID it was
    /// assigned.
    pub fn insert(&self, file_id: FileId, record: &[u8]) -> Result<Rid, StorageError> {
        let mut last_page = self.last_page.lock().unwrap();
        let page_number = *last_page.entry(file_id).or_insert(0);
        let page_id = PageId::new(file_id, page_number);

        let mut page = self.load_page(page_id)?;
        if page.can_fit(record.len())? {
            let slot_id = page.insert(record)?;
            self.flush(&page)?;
            return Ok(Rid::new(page_id, slot_id));
        }

        let next_page_number = page_number + 1;
        let next_page_id = PageId::new(file_id, next_page_number);
        let mut page = Page::new_zeroed(next_page_id);
        let slot_id = page.insert(record)?;
        self.flush(&page)?;
        last_page.insert(file_id, next_page_number);
        Ok(Rid::new(next_page_id, slot_id))
    }

    /// Reads the live record at `rid`.
    pub fn read(&self, rid: Rid) -> Result<Vec<u8>, StorageError> {
        let page = self.load_page(rid.page_id)?;
        page.read(rid.slot_id).map_err(|_| StorageError::NotFound(rid))
    }

    /// Tombstones the record at `rid`. Returns `true` if a live record was
    /// removed, `false` if it was already gone (or never existed).
    pub fn delete(&self, rid: Rid) -> Result<bool, StorageError> {
        let mut page = self.load_page(rid.page_id)?;
        let was_live = page.read(rid.slot_id).is_ok();
        if !was_live {
            return Ok(false);
        }
        page.delete(rid.slot_id)?;
        self.flush(&page)?;
        Ok(true)
    }

    /// Invokes `visit` with the RID and bytes of every live record in
    /// `file_id`, in page-then-slot order.
    pub fn scan(
        &self,
        file_id: FileId,
        mut visit: impl FnMut(Rid, &[u8]),
    ) -> Result<(), StorageError> {
        let highest = match self.last_page.lock().unwrap().get(&file_id).copied() {
            Some(highest) => highest,
            None => return Ok(()),
        };

        for page_number in 0..=highest {
            let page_id = PageId::new(file_id, page_number);
            let page = self.load_page(page_id)?;
            for slot_id in page.live_slot_ids()? {
                let record = page.read(slot_id)?;
                visit(Rid::new(page_id, slot_id), &record);
            }
        }
        Ok(())
    }

    fn load_page(&self, page_id: PageId) -> Result<Page, StorageError> {
        let bytes = self.buffer.lock().unwrap().get_page(page_id);
        Ok(Page::wrap(bytes, page_id)?)
    }

    fn flush(&self, page: &Page) -> Result<(), StorageError> {
        self.file_manager.write_page(page.page_id(), page.bytes());
        self.buffer.lock().unwrap().invalidate(page.page_id());
        Ok(())
    }

    fn flush_new_page(&self, page_id: PageId) -> Result<(), StorageError> {
        let page = Page::new_zeroed(page_id);
        self.flush(&page)
    }
}
