//! Little-endian entry writer/reader for tagged-record buffers.
//!
//! One entry on the wire is `tag: i32`, `wire type: u8`, then the payload:
//!
//! | wire type | payload |
//! |-----------|---------|
//! | 1 string  | `u32` byte length + UTF-8 bytes |
//! | 2 int     | `i64` |
//! | 3 float   | `f64` bit pattern |
//! | 4 handle  | `u64` |

use super::variant::{Variant, WireType};
use super::Tag;
use crate::error::DecodeError;
use crate::model::Handle;

#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_entry(&mut self, tag: Tag, value: &Variant) {
        self.buf.extend_from_slice(&tag.to_le_bytes());
        self.buf.push(value.wire_type() as u8);
        match value {
            Variant::String(s) => {
                // Strings longer than u32::MAX cannot come out of a drawing.
                let len = u32::try_from(s.len()).unwrap_or(u32::MAX);
                self.buf.extend_from_slice(&len.to_le_bytes());
                self.buf.extend_from_slice(&s.as_bytes()[..len as usize]);
            }
            Variant::Int(v) => self.buf.extend_from_slice(&v.to_le_bytes()),
            Variant::Float(v) => self.buf.extend_from_slice(&v.to_bits().to_le_bytes()),
            Variant::Handle(h) => self.buf.extend_from_slice(&h.raw().to_le_bytes()),
        }
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

#[derive(Debug)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let truncated = DecodeError::TruncatedBuffer {
            offset: self.offset,
        };
        let end = self.offset.checked_add(len).ok_or(truncated.clone())?;
        let out = self.bytes.get(self.offset..end).ok_or(truncated)?;
        self.offset = end;
        Ok(out)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let offset = self.offset;
        self.take(N)?
            .try_into()
            .map_err(|_| DecodeError::TruncatedBuffer { offset })
    }

    /// Read the next `(tag, value)` entry.
    pub fn read_entry(&mut self) -> Result<(Tag, Variant), DecodeError> {
        let tag = Tag::from_le_bytes(self.take_array::<4>()?);
        let [raw_type] = self.take_array::<1>()?;
        let wire_type = WireType::from_u8(raw_type).ok_or(DecodeError::UnknownWireType(raw_type))?;
        let value = match wire_type {
            WireType::String => {
                let len = u32::from_le_bytes(self.take_array::<4>()?) as usize;
                let bytes = self.take(len)?;
                let s = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { tag })?;
                Variant::String(s.to_string())
            }
            WireType::Int => Variant::Int(i64::from_le_bytes(self.take_array::<8>()?)),
            WireType::Float => Variant::Float(f64::from_bits(u64::from_le_bytes(
                self.take_array::<8>()?,
            ))),
            WireType::Handle => {
                Variant::Handle(Handle::new(u64::from_le_bytes(self.take_array::<8>()?)))
            }
        };
        Ok((tag, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_entry_layout() {
        let mut w = Writer::default();
        w.write_entry(1001, &Variant::String("ab".into()));
        let bytes = w.into_vec();
        assert_eq!(&bytes[..4], &1001i32.to_le_bytes());
        assert_eq!(bytes[4], 1);
        assert_eq!(&bytes[5..9], &2u32.to_le_bytes());
        assert_eq!(&bytes[9..], b"ab");
    }

    #[test]
    fn reads_back_every_wire_type() {
        let mut w = Writer::default();
        w.write_entry(1001, &Variant::String("name".into()));
        w.write_entry(1040, &Variant::Int(-3));
        w.write_entry(1041, &Variant::Float(2.5));
        w.write_entry(1070, &Variant::Handle(Handle::new(42)));
        let bytes = w.into_vec();

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_entry().unwrap(), (1001, Variant::String("name".into())));
        assert_eq!(r.read_entry().unwrap(), (1040, Variant::Int(-3)));
        assert_eq!(r.read_entry().unwrap(), (1041, Variant::Float(2.5)));
        assert_eq!(r.read_entry().unwrap(), (1070, Variant::Handle(Handle::new(42))));
        assert!(r.is_empty());
    }

    #[test]
    fn short_payload_is_truncated() {
        let mut w = Writer::default();
        w.write_entry(1040, &Variant::Int(7));
        let mut bytes = w.into_vec();
        bytes.truncate(bytes.len() - 3);

        let mut r = Reader::new(&bytes);
        assert!(matches!(
            r.read_entry(),
            Err(DecodeError::TruncatedBuffer { offset: 5 })
        ));
    }

    #[test]
    fn string_length_past_end_is_truncated() {
        let mut bytes = 1001i32.to_le_bytes().to_vec();
        bytes.push(1);
        bytes.extend_from_slice(&100u32.to_le_bytes());
        bytes.extend_from_slice(b"short");

        let mut r = Reader::new(&bytes);
        assert!(matches!(
            r.read_entry(),
            Err(DecodeError::TruncatedBuffer { .. })
        ));
    }

    #[test]
    fn unknown_wire_type_is_rejected() {
        let mut bytes = 1001i32.to_le_bytes().to_vec();
        bytes.push(9);
        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_entry(), Err(DecodeError::UnknownWireType(9)));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut bytes = 1002i32.to_le_bytes().to_vec();
        bytes.push(1);
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&[0xff, 0xfe]);
        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_entry(), Err(DecodeError::InvalidUtf8 { tag: 1002 }));
    }
}
