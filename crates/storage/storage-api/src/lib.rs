//! Heap-file record storage: the layer above `page`/`buffer`/`file` that
//! turns raw byte records into addressable, insertable, scannable tables.

pub mod rid;
pub mod storage_error;
pub mod storage_manager;

pub use rid::Rid;
pub use storage_error::StorageError;
pub use storage_manager::StorageManager;
