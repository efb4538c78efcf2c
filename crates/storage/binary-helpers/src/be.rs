//! Big-endian counterpart of [`crate::le`], used by the record codec for the
//! on-the-wire integer layout mandated for persisted records (see the engine's
//! `SPEC_FULL.md` §6: "Integers on disk are big-endian").

use crate::bin_error::BinaryError;

/// A type that can be read from / written to a big-endian byte slice.
pub trait BigEndianInteger: Sized + Copy {
    /// The size of the type in bytes.
    const SIZE: usize;

    /// Converts a big-endian byte slice to the target integer type.
    fn from_be(source_bytes: &[u8]) -> Result<Self, BinaryError>;

    /// Serializes the integer into a big-endian byte slice.
    fn to_be(self, target_buffer: &mut [u8]) -> Result<(), BinaryError>;
}

macro_rules! impl_big_endian_integer {
    ($t:ty) => {
        impl BigEndianInteger for $t {
            const SIZE: usize = std::mem::size_of::<$t>();

            fn from_be(source_bytes: &[u8]) -> Result<Self, BinaryError> {
                if source_bytes.len() != Self::SIZE {
                    return Err(BinaryError::BytesSliceSizeMismatch {
                        from_offset: 0usize,
                        expected: Self::SIZE,
                    });
                }

                Ok(<$t>::from_be_bytes(source_bytes.try_into()?))
            }

            fn to_be(self, target_buffer: &mut [u8]) -> Result<(), BinaryError> {
                let self_bytes = &self.to_be_bytes();

                if self_bytes.len() != target_buffer.len() {
                    return Err(BinaryError::WriteErrorSliceSizeMismatch {
                        src: self_bytes.len(),
                        target: target_buffer.len(),
                    });
                }

                target_buffer.copy_from_slice(self_bytes);
                Ok(())
            }
        }
    };
}

impl_big_endian_integer!(i32);
impl_big_endian_integer!(u32);

/// Reads a value of type `T` from a byte slice in big-endian format at `start_offset`.
pub fn read_be<T: BigEndianInteger>(bytes: &[u8], start_offset: usize) -> Result<T, BinaryError> {
    let Some(slice) = bytes.get(start_offset..start_offset + T::SIZE) else {
        return Err(BinaryError::BytesSliceSizeMismatch {
            expected: T::SIZE,
            from_offset: start_offset,
        });
    };

    T::from_be(slice)
}

/// Writes a value of type `T` into a byte slice in big-endian format at `start_offset`.
pub fn write_be<T: BigEndianInteger>(
    bytes: &mut [u8],
    start_offset: usize,
    value: T,
) -> Result<(), BinaryError> {
    let Some(slice) = bytes.get_mut(start_offset..start_offset + T::SIZE) else {
        return Err(BinaryError::BytesSliceSizeMismatch {
            expected: T::SIZE,
            from_offset: start_offset,
        });
    };

    value.to_be(slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_i32_round_trip() {
        let mut buf = [0u8; 4];
        write_be::<i32>(&mut buf, 0, -7).unwrap();
        assert_eq!(buf, [0xff, 0xff, 0xff, 0xf9]);
        assert_eq!(read_be::<i32>(&buf, 0).unwrap(), -7);
    }

    #[test]
    fn read_write_u32_round_trip() {
        let mut buf = [0u8; 8];
        write_be::<u32>(&mut buf, 4, 0x0102_0304).unwrap();
        assert_eq!(&buf[4..], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(read_be::<u32>(&buf, 4).unwrap(), 0x0102_0304);
    }
}
