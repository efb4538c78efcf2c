use thiserror::Error;

/// Errors raised by schema registration/lookup and record validation/codec.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("table {0:?} is already registered")]
    DuplicateTable(String),

    #[error("index {0:?} is already registered")]
    DuplicateIndex(String),

    #[error("unknown table {0:?}")]
    UnknownTable(String),

    #[error("unknown index {0:?}")]
    UnknownIndex(String),

    #[error("table {table:?} has no column {column:?}")]
    UnknownColumn { table: String, column: String },

    #[error("expected {expected} values, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("column {column:?} expects {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: crate::value::DataType,
        actual: crate::value::DataType,
    },

    #[error("varchar value for column {column:?} is {actual} bytes, exceeds limit {limit}")]
    VarcharTooLong {
        column: String,
        actual: usize,
        limit: usize,
    },

    #[error("an index may only be created on an INT column, {column:?} is not one")]
    IndexNotOnInt { column: String },

    #[error("buffer underflow decoding a record")]
    Underflow,

    #[error("a varchar declared a negative length")]
    NegativeLength,

    #[error("a varchar's bytes are not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Binary(#[from] binary_helpers::bin_error::BinaryError),
}
