use page::page_error::PageError;
use thiserror::Error;

/// Errors raised by [`crate::storage_manager::StorageManager`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// No live record exists at the requested RID (never inserted, already
    /// deleted, or pointing past the end of the file).
    #[error("no live record at {0:?}")]
    NotFound(crate::rid::Rid),

    /// A page-level operation failed while fulfilling the request.
    #[error(transparent)]
    Page(#[from] PageError),
}
