//! Little-endian byte-offset accessors shared by the page storage format.

pub mod be;
pub mod bin_error;
pub mod conversions;
pub mod le;
