//! Layout and accessors for a heap page's header.
//!
//! The header occupies the first [`HEADER_SIZE`] bytes of every page, in
//! little-endian binary format:
//!
//! | Field        | Type | Offset | Description |
//! |--------------|------|--------|--------------|
//! | `free_start` | u32  | 0      | Byte offset where the next record is written; grows forward. |
//! | `slot_count` | u16  | 4      | Number of slot-directory entries (including tombstoned ones). |
//! | *(reserved)* | —    | 6      | Two unused bytes, reserved for future header fields. |

use crate::page_error::PageError;
use binary_helpers::le::{read_le, write_le};
use paste::paste;

/// Size of the header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Zero-copy immutable view into a page's header.
#[derive(Debug)]
pub struct HeaderRef<'a> {
    bytes: &'a [u8; HEADER_SIZE],
}

impl<'a> HeaderRef<'a> {
    /// Builds a `HeaderRef` over `bytes`, which must be exactly [`HEADER_SIZE`] long.
    pub fn new(bytes: &'a [u8]) -> Option<Self> {
        (bytes.len() == HEADER_SIZE).then(|| HeaderRef {
            bytes: bytes.try_into().unwrap(),
        })
    }
}

/// Zero-copy mutable view into a page's header.
#[derive(Debug)]
pub struct HeaderMut<'a> {
    bytes: &'a mut [u8; HEADER_SIZE],
}

impl<'a> HeaderMut<'a> {
    /// Builds a `HeaderMut` over `bytes`, which must be exactly [`HEADER_SIZE`] long.
    pub fn new(bytes: &'a mut [u8]) -> Option<Self> {
        (bytes.len() == HEADER_SIZE).then(|| HeaderMut {
            bytes: bytes.try_into().unwrap(),
        })
    }
}

/// Defines header field constants and getter/setter methods.
///
/// Pattern: `field_name : field_type = field_offset ;`
macro_rules! impl_header_accessors {
    ( $( $field_name:ident : $field_type:ty = $field_offset:expr ; )* ) => {
        paste! {
            $(
                #[doc = concat!("Byte offset of `", stringify!($field_name), "`.")]
                pub const [<$field_name:upper>]: usize = $field_offset;

                impl<'a> HeaderRef<'a> {
                    #[doc = concat!("Reads `", stringify!($field_name), "`.")]
                    pub fn [<get_ $field_name>](&self) -> Result<$field_type, PageError> {
                        Ok(read_le::<$field_type>(self.bytes, $field_offset)?)
                    }
                }

                impl<'a> HeaderMut<'a> {
                    #[doc = concat!("Writes `", stringify!($field_name), "`.")]
                    pub fn [<set_ $field_name>](&mut self, val: $field_type) -> Result<(), PageError> {
                        write_le::<$field_type>(self.bytes, $field_offset, val)?;
                        Ok(())
                    }
                }
            )*
        }
    };
}

impl_header_accessors! {
    free_start: u32 = 0;
    slot_count: u16 = 4;
}
