//! Type-directed record (de)serialization, per the schema's column order.
//!
//! Layout per value: INT is 4 bytes big-endian two's-complement; BOOLEAN is
//! one byte (0 or 1); VARCHAR is a 4-byte big-endian unsigned length
//! followed by that many UTF-8 bytes. The byte stream carries no
//! self-describing tags — the schema drives both directions.

use crate::catalog_error::CatalogError;
use crate::schema::ColumnSchema;
use crate::value::{DataType, Value};
use binary_helpers::be::{read_be, write_be};

/// A record: an ordered tuple of values matching a table's column schemas.
pub type Record = Vec<Value>;

/// Checks arity, per-column types, and VARCHAR length bounds.
pub fn validate(record: &[Value], columns: &[ColumnSchema]) -> Result<(), CatalogError> {
    if record.len() != columns.len() {
        return Err(CatalogError::ArityMismatch {
            expected: columns.len(),
            actual: record.len(),
        });
    }
    for (value, column) in record.iter().zip(columns) {
        if value.data_type() != column.data_type {
            return Err(CatalogError::TypeMismatch {
                column: column.name.clone(),
                expected: column.data_type,
                actual: value.data_type(),
            });
        }
        if let Value::Varchar(s) = value {
            if column.length > 0 && s.len() > column.length {
                return Err(CatalogError::VarcharTooLong {
                    column: column.name.clone(),
                    actual: s.len(),
                    limit: column.length,
                });
            }
        }
    }
    Ok(())
}

/// The exact byte length `serialize` would produce for `record`.
pub fn computed_size(record: &[Value]) -> usize {
    record
        .iter()
        .map(|v| match v {
            Value::Int(_) => 4,
            Value::Bool(_) => 1,
            Value::Varchar(s) => 4 + s.len(),
        })
        .sum()
}

/// Serializes `record` into its on-disk byte layout.
pub fn serialize(record: &[Value]) -> Result<Vec<u8>, CatalogError> {
    let mut buf = vec![0u8; computed_size(record)];
    let mut offset = 0;
    for value in record {
        match value {
            Value::Int(v) => {
                write_be::<i32>(&mut buf, offset, *v)?;
                offset += 4;
            }
            Value::Bool(v) => {
                buf[offset] = if *v { 1 } else { 0 };
                offset += 1;
            }
            Value::Varchar(s) => {
                write_be::<u32>(&mut buf, offset, s.len() as u32)?;
                offset += 4;
                buf[offset..offset + s.len()].copy_from_slice(s.as_bytes());
                offset += s.len();
            }
        }
    }
    Ok(buf)
}

/// Deserializes `bytes` according to `columns`, the inverse of `serialize`.
pub fn deserialize(bytes: &[u8], columns: &[ColumnSchema]) -> Result<Record, CatalogError> {
    let mut values = Vec::with_capacity(columns.len());
    let mut offset = 0;
    for column in columns {
        match column.data_type {
            DataType::Int => {
                let v = read_be::<i32>(bytes, offset).map_err(|_| CatalogError::Underflow)?;
                values.push(Value::Int(v));
                offset += 4;
            }
            DataType::Bool => {
                let byte = *bytes.get(offset).ok_or(CatalogError::Underflow)?;
                values.push(Value::Bool(byte != 0));
                offset += 1;
            }
            DataType::Varchar => {
                let len = read_be::<u32>(bytes, offset).map_err(|_| CatalogError::Underflow)?;
                offset += 4;
                let len = len as usize;
                let slice = bytes
                    .get(offset..offset + len)
                    .ok_or(CatalogError::Underflow)?;
                let s = String::from_utf8(slice.to_vec())?;
                values.push(Value::Varchar(s));
                offset += len;
            }
        }
    }
    Ok(values)
}
