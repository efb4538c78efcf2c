use std::array::TryFromSliceError;
use thiserror::Error;

/// Errors raised while reading or writing fixed-width integers at a byte offset.
#[derive(Error, Debug)]
pub enum BinaryError {
    #[error(
        "attempt to read {expected} bytes from offset {from_offset}, but the provided slice does not contain that range"
    )]
    BytesSliceSizeMismatch { expected: usize, from_offset: usize },
    #[error("error converting a slice")]
    SliceConversionError(#[from] TryFromSliceError),
    #[error(
        "error when attempting to write data due to size mismatch: source {src} vs target {target}"
    )]
    WriteErrorSliceSizeMismatch { src: usize, target: usize },
}
