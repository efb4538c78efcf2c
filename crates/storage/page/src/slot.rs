//! Zero-copy views into a single 4-byte slot-directory entry.
//!
//! Each entry is `(offset: i16, length: u16)`, little-endian. The sentinel
//! `offset == -1` marks a tombstoned slot; its `length` is also reset to 0.

use crate::page_error::PageError;
use binary_helpers::le::{read_le, write_le};

/// Fixed size, in bytes, of a slot-directory entry.
pub(crate) const SLOT_SIZE: usize = 4;

/// Sentinel offset marking a tombstoned slot.
pub(crate) const TOMBSTONE_OFFSET: i16 = -1;

#[derive(Debug)]
pub(crate) struct SlotRef<'a> {
    bytes: &'a [u8; SLOT_SIZE],
}

impl<'a> SlotRef<'a> {
    #[inline]
    pub(crate) fn from_raw(bytes: &'a [u8]) -> Result<Self, PageError> {
        let bytes: &[u8; SLOT_SIZE] =
            bytes
                .try_into()
                .map_err(|_| PageError::SlotRegionSizeMismatch {
                    expected: SLOT_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Self { bytes })
    }

    #[inline]
    pub(crate) fn offset(&self) -> Result<i16, PageError> {
        Ok(read_le::<i16>(self.bytes, 0)?)
    }

    #[inline]
    pub(crate) fn length(&self) -> Result<u16, PageError> {
        Ok(read_le::<u16>(self.bytes, 2)?)
    }

    #[inline]
    pub(crate) fn is_tombstoned(&self) -> Result<bool, PageError> {
        Ok(self.offset()? == TOMBSTONE_OFFSET)
    }
}

#[derive(Debug)]
pub(crate) struct SlotMut<'a> {
    bytes: &'a mut [u8; SLOT_SIZE],
}

impl<'a> SlotMut<'a> {
    #[inline]
    pub(crate) fn from_raw(bytes: &'a mut [u8]) -> Result<Self, PageError> {
        let actual = bytes.len();
        let bytes: &mut [u8; SLOT_SIZE] = bytes
            .try_into()
            .map_err(|_| PageError::SlotRegionSizeMismatch {
                expected: SLOT_SIZE,
                actual,
            })?;
        Ok(Self { bytes })
    }

    #[inline]
    pub(crate) fn set_offset(&mut self, offset: i16) -> Result<(), PageError> {
        Ok(write_le::<i16>(self.bytes, 0, offset)?)
    }

    #[inline]
    pub(crate) fn set_length(&mut self, length: u16) -> Result<(), PageError> {
        Ok(write_le::<u16>(self.bytes, 2, length)?)
    }

    #[inline]
    pub(crate) fn tombstone(&mut self) -> Result<(), PageError> {
        self.set_offset(TOMBSTONE_OFFSET)?;
        self.set_length(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_ref_reads_offset_and_length() {
        let bytes = [0x01, 0x00, 0x02, 0x00];
        let slot = SlotRef::from_raw(&bytes).unwrap();
        assert_eq!(slot.offset().unwrap(), 1);
        assert_eq!(slot.length().unwrap(), 2);
        assert!(!slot.is_tombstoned().unwrap());
    }

    #[test]
    fn slot_mut_tombstone_sets_sentinel() {
        let mut bytes = [0x05, 0x00, 0x0a, 0x00];
        {
            let mut slot = SlotMut::from_raw(&mut bytes).unwrap();
            slot.tombstone().unwrap();
        }
        let slot = SlotRef::from_raw(&bytes).unwrap();
        assert!(slot.is_tombstoned().unwrap());
        assert_eq!(slot.length().unwrap(), 0);
    }
}
