//! Legacy value-codec tag selection.
//!
//! The original binary serialization assigned every scalar a tag byte.
//! Strings switch from inline UTF (`STRING_TYPE`) to a length-prefixed
//! byte run (`STRING_BYTES_TYPE`) once they can no longer be written as a
//! single inline chunk. Only the tag selection lives here; the codecs
//! themselves are external.

use crate::value::DataValue;

/// Strings at or above this many bytes serialize as byte runs.
pub const STRING_BYTES_LENGTH_THRESHOLD: usize = 65_536;

/// Tag bytes of the legacy value codec.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ValueTag {
    BoolType = 1,
    Int8Type = 2,
    Int16Type = 3,
    Int32Type = 4,
    Int64Type = 5,
    Uint8Type = 6,
    Uint16Type = 7,
    Uint32Type = 8,
    Uint64Type = 9,
    StringType = 10,
    BinaryType = 11,
    EmptyType = 12,
    Decimal64Type = 13,
    StringBytesType = 14,
}

/// Selects the serialization tag for a value.
#[must_use]
pub fn serializable_tag(value: &DataValue) -> ValueTag {
    match value {
        DataValue::Str(s) => {
            if s.len() >= STRING_BYTES_LENGTH_THRESHOLD {
                ValueTag::StringBytesType
            } else {
                ValueTag::StringType
            }
        }
        DataValue::Bool(_) => ValueTag::BoolType,
        DataValue::Int8(_) => ValueTag::Int8Type,
        DataValue::Int16(_) => ValueTag::Int16Type,
        DataValue::Int32(_) => ValueTag::Int32Type,
        DataValue::Int64(_) => ValueTag::Int64Type,
        DataValue::Uint8(_) => ValueTag::Uint8Type,
        DataValue::Uint16(_) => ValueTag::Uint16Type,
        DataValue::Uint32(_) => ValueTag::Uint32Type,
        DataValue::Uint64(_) => ValueTag::Uint64Type,
        DataValue::Decimal64 { .. } => ValueTag::Decimal64Type,
        DataValue::Binary(_) => ValueTag::BinaryType,
        DataValue::Empty => ValueTag::EmptyType,
    }
}
