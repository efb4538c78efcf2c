//! An in-memory [`FileManager`], used by buffer/storage unit tests so they
//! don't need a scratch directory on disk.

use crate::api::FileManager;
use crate::file_catalog::FileCatalog;
use page::page_id::PageId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A `FileManager` backed by an in-process map instead of real files.
#[derive(Debug)]
pub struct InMemoryFileManager {
    // Unused for now: filenames only matter once pages are addressed by path
    // rather than by `PageId::file_id`, which this implementation doesn't need.
    file_catalog: Arc<FileCatalog>,
    pages: RwLock<HashMap<PageId, Box<[u8]>>>,
}

impl FileManager for InMemoryFileManager {
    fn new(file_catalog: Arc<FileCatalog>) -> Self {
        Self {
            file_catalog,
            pages: RwLock::new(HashMap::new()),
        }
    }

    fn read_page(&self, page_id: PageId, destination: &mut [u8]) -> bool {
        if let Some(page) = self.pages.read().unwrap().get(&page_id) {
            destination.copy_from_slice(page);
            true
        } else {
            false
        }
    }

    fn write_page(&self, page_id: PageId, page_data: &[u8]) {
        let boxed = page_data.to_vec().into_boxed_slice();
        self.pages.write().unwrap().insert(page_id, boxed);
    }
}
