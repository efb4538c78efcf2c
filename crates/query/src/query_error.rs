use thiserror::Error;

/// Errors raised while compiling or executing a logical query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Catalog(#[from] catalog::CatalogError),

    #[error(transparent)]
    Storage(#[from] storage_api::StorageError),

    #[error(transparent)]
    Index(#[from] index::IndexError),

    #[error("unknown column {0:?}")]
    UnknownColumn(String),

    #[error("comparison predicates require an INT column, {0:?} is not one")]
    PredicateRequiresInt(String),

    #[error("column {column:?} expects {expected:?}, literal is {actual:?}")]
    LiteralTypeMismatch {
        column: String,
        expected: catalog::DataType,
        actual: catalog::DataType,
    },

    #[error("insert into {table:?} supplies {supplied} columns but the table has {total}; every column must be given a value")]
    MissingColumns {
        table: String,
        supplied: usize,
        total: usize,
    },

    #[error("insert column/value list length mismatch: {columns} columns vs {values} values")]
    InsertArityMismatch { columns: usize, values: usize },
}
