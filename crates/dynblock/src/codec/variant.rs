//! Runtime values carried by tagged-record entries.

use crate::model::Handle;
use std::fmt;

/// A single typed value in a tagged record.
///
/// Floats compare by bit pattern, so every value equals its own decode.
#[derive(Debug, Clone)]
pub enum Variant {
    String(String),
    Int(i64),
    Float(f64),
    /// Host object handle, stored verbatim.
    Handle(Handle),
}

/// Wire-level discriminant of a [`Variant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    String = 1,
    Int = 2,
    Float = 3,
    Handle = 4,
}

impl WireType {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(WireType::String),
            2 => Some(WireType::Int),
            3 => Some(WireType::Float),
            4 => Some(WireType::Handle),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WireType::String => "string",
            WireType::Int => "int",
            WireType::Float => "float",
            WireType::Handle => "handle",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Variant {
    pub fn wire_type(&self) -> WireType {
        match self {
            Variant::String(_) => WireType::String,
            Variant::Int(_) => WireType::Int,
            Variant::Float(_) => WireType::Float,
            Variant::Handle(_) => WireType::Handle,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Variant::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view: floats as-is, ints widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Variant::Float(v) => Some(*v),
            Variant::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            Variant::Handle(h) => Some(*h),
            _ => None,
        }
    }

    /// Flags are stored as ints; any non-zero value is set.
    pub fn flag(value: bool) -> Self {
        Variant::Int(i64::from(value))
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Variant::String(a), Variant::String(b)) => a == b,
            (Variant::Int(a), Variant::Int(b)) => a == b,
            (Variant::Float(a), Variant::Float(b)) => a.to_bits() == b.to_bits(),
            (Variant::Handle(a), Variant::Handle(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Variant {}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::String(value.to_string())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::String(value)
    }
}

impl From<i64> for Variant {
    fn from(value: i64) -> Self {
        Variant::Int(value)
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Variant::Float(value)
    }
}

impl From<Handle> for Variant {
    fn from(value: Handle) -> Self {
        Variant::Handle(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_type_round_trips_through_u8() {
        for wt in [WireType::String, WireType::Int, WireType::Float, WireType::Handle] {
            assert_eq!(WireType::from_u8(wt as u8), Some(wt));
        }
        assert_eq!(WireType::from_u8(0), None);
    }

    #[test]
    fn as_float_widens_ints() {
        assert_eq!(Variant::Int(3).as_float(), Some(3.0));
        assert_eq!(Variant::Float(1.5).as_float(), Some(1.5));
        assert_eq!(Variant::String("1".into()).as_float(), None);
    }

    #[test]
    fn floats_compare_by_bits() {
        assert_eq!(Variant::Float(f64::NAN), Variant::Float(f64::NAN));
        assert_ne!(Variant::Float(0.0), Variant::Float(-0.0));
        assert_ne!(Variant::Float(1.0), Variant::Int(1));
    }

    #[test]
    fn flag_encodes_as_int() {
        assert_eq!(Variant::flag(true), Variant::Int(1));
        assert_eq!(Variant::flag(false), Variant::Int(0));
    }
}
