use thiserror::Error;

/// Errors raised while manipulating a single slotted page.
#[derive(Debug, Error)]
pub enum PageError {
    /// A header or slot field could not be read or written.
    #[error("header/slot field error")]
    FieldAccess(#[from] binary_helpers::bin_error::BinaryError),

    /// A slot-directory region was the wrong size for the requested slot.
    #[error("slot region size mismatch: expected {expected} bytes, got {actual}")]
    SlotRegionSizeMismatch { expected: usize, actual: usize },

    /// `slot_id` does not refer to a slot that exists in this page.
    #[error("slot {slot_id} is out of range (page has {slot_count} slots)")]
    SlotOutOfRange { slot_id: u32, slot_count: u16 },

    /// `slot_id` refers to a slot that has been tombstoned.
    #[error("slot {slot_id} has been tombstoned")]
    Tombstoned { slot_id: u32 },

    /// The record does not fit in this page, nor would it fit in a fresh one.
    #[error("record of {len} bytes does not fit in a page (free space: {free})")]
    PageFull { len: usize, free: usize },

    /// The record is larger than the maximum a slot length field can represent.
    #[error("record length {len} exceeds the maximum representable slot length (65535)")]
    RecordTooLarge { len: usize },
}
