use thiserror::Error;

/// Errors raised while creating, maintaining, or querying an index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Catalog(#[from] catalog::CatalogError),

    #[error(transparent)]
    Storage(#[from] storage_api::StorageError),

    /// A row's indexed column did not hold an integer at runtime — a
    /// schema/data invariant violation, fatal per the index maintenance
    /// contract.
    #[error("indexed column {column:?} of table {table:?} did not hold an integer")]
    NonIntegerKey { table: String, column: String },
}
