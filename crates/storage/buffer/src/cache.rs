use file::api::FileManager;
use page::PAGE_SIZE;
use page::page_id::{FileId, PageId};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

#[derive(Debug)]
struct CacheEntry {
    data: Vec<u8>,
    last_used: u64,
}

/// A fixed-capacity, LRU-evicting cache of page-sized byte buffers.
///
/// `get_page` loads a page through `F` on a cache miss; a miss past
/// end-of-file yields a freshly zeroed buffer rather than an error, per the
/// heap file convention that an unwritten page reads as all zero bytes.
#[derive(Debug)]
pub struct BufferCache<F: FileManager> {
    file_manager: Arc<F>,
    capacity: usize,
    entries: HashMap<PageId, CacheEntry>,
    clock: u64,
}

impl<F: FileManager> BufferCache<F> {
    /// Creates an empty cache backed by `file_manager`, holding at most
    /// `capacity` pages at once.
    pub fn new(file_manager: Arc<F>, capacity: usize) -> Self {
        Self {
            file_manager,
            capacity: capacity.max(1),
            entries: HashMap::new(),
            clock: 0,
        }
    }

    /// Returns the bytes of `page_id`, loading them from disk on a miss.
    pub fn get_page(&mut self, page_id: PageId) -> Vec<u8> {
        self.clock += 1;
        let tick = self.clock;

        if let Some(entry) = self.entries.get_mut(&page_id) {
            entry.last_used = tick;
            return entry.data.clone();
        }

        let mut buf = vec![0u8; PAGE_SIZE];
        let found = self.file_manager.read_page(page_id, &mut buf);
        tracing::debug!(?page_id, found, "buffer cache miss, loaded from disk");

        self.store(page_id, buf.clone(), tick);
        buf
    }

    /// Removes `page_id` from the cache, if present.
    pub fn invalidate(&mut self, page_id: PageId) {
        self.entries.remove(&page_id);
    }

    /// Removes every cached page of `file_id` whose page number falls in
    /// `range`, e.g. after a bulk rewrite of a file's contents.
    pub fn invalidate_range(&mut self, file_id: FileId, range: Range<u32>) {
        self.entries
            .retain(|id, _| !(id.file_id == file_id && range.contains(&id.page_number)));
    }

    fn store(&mut self, page_id: PageId, data: Vec<u8>, tick: u64) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&page_id) {
            if let Some(lru_id) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| *id)
            {
                tracing::debug!(evicted = ?lru_id, "buffer cache full, evicting LRU page");
                self.entries.remove(&lru_id);
            }
        }
        self.entries.insert(page_id, CacheEntry { data, last_used: tick });
    }
}
