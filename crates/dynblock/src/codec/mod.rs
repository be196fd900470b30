//! # Tagged Record Codec
//!
//! Every piece of dynamic-block metadata is persisted as a *tagged record*: an
//! ordered list of `(tag, value)` pairs packed into an opaque [`Buffer`]. The
//! host attaches those buffers to its objects and knows nothing about their
//! contents, so the codec is the only place where a schema exists.
//!
//! ## Buffer Shape
//!
//! ```text
//! [1000 "PARAMETER"] [1001 "Distance1"] [1002 "Width"] ... [1040 1] [1041 0]
//!  ^ kind marker      ^ kind-specific fields, in insertion order
//! ```
//!
//! The first entry is always the kind marker (tag 1000, a string). Decoding is
//! parametrized by the kind the caller expects; a buffer carrying any other
//! marker is rejected with [`DecodeError::UnknownKindMarker`].
//!
//! ## Tag Vocabulary
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | 1000 | kind marker |
//! | 1001–1005 | names, labels, descriptions (strings) |
//! | 1010–1012 | point coordinates (floats) |
//! | 1040–1043 | kind-specific numeric flags |
//! | 1070+ | repeated payload, one tag per entry, ascending |
//!
//! Tags are positional *within a kind*: 1041 is the driving parameter handle of
//! an `ACTION` but the size of a `GRIP`. The schema table in [`expected_types`]
//! says which wire types each kind accepts per tag. Tags a kind does not
//! declare pass through untouched so that newer writers stay readable.
//!
//! See [`wire`] for the byte layout of a single entry.

pub mod variant;
pub mod wire;

use crate::error::DecodeError;
use crate::model::Handle;
use std::fmt;
use std::str::FromStr;

pub use variant::{Variant, WireType};

/// Integer identifier of a field within a record.
pub type Tag = i32;

pub mod tags {
    use super::Tag;

    pub const KIND: Tag = 1000;
    pub const NAME: Tag = 1001;
    pub const LABEL: Tag = 1002;
    pub const DESCRIPTION: Tag = 1003;
    pub const DISPLAY_4: Tag = 1004;
    pub const DISPLAY_5: Tag = 1005;
    pub const POINT_X: Tag = 1010;
    pub const POINT_Y: Tag = 1011;
    pub const POINT_Z: Tag = 1012;
    pub const FLAG_0: Tag = 1040;
    pub const FLAG_1: Tag = 1041;
    pub const FLAG_2: Tag = 1042;
    pub const FLAG_3: Tag = 1043;
    pub const PAYLOAD: Tag = 1070;

    /// Name of an action's behaviour (`Lookup`).
    pub const ACTION_KIND: Tag = DISPLAY_4;

    /// Tag of the `index`-th payload entry.
    pub fn payload(index: usize) -> Tag {
        PAYLOAD.saturating_add(Tag::try_from(index).unwrap_or(Tag::MAX))
    }
}

/// Kind marker stored under tag 1000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Parameter,
    Action,
    ActionIcon,
    ActionLabel,
    Grip,
    SelectionSet,
    LookupTable,
    LookupValues,
}

impl RecordKind {
    pub const ALL: [RecordKind; 8] = [
        RecordKind::Parameter,
        RecordKind::Action,
        RecordKind::ActionIcon,
        RecordKind::ActionLabel,
        RecordKind::Grip,
        RecordKind::SelectionSet,
        RecordKind::LookupTable,
        RecordKind::LookupValues,
    ];

    pub fn marker(self) -> &'static str {
        match self {
            RecordKind::Parameter => "PARAMETER",
            RecordKind::Action => "ACTION",
            RecordKind::ActionIcon => "ACTION_ICON",
            RecordKind::ActionLabel => "ACTION_LABEL",
            RecordKind::Grip => "GRIP",
            RecordKind::SelectionSet => "SELECTION_SET",
            RecordKind::LookupTable => "LOOKUP_TABLE",
            RecordKind::LookupValues => "LOOKUP_VALUES",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

impl FromStr for RecordKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.marker() == s)
            .ok_or(())
    }
}

/// One `(tag, value)` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub tag: Tag,
    pub value: Variant,
}

impl Field {
    pub fn new(tag: Tag, value: impl Into<Variant>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }
}

/// Opaque encoded record as handed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Buffer(Vec<u8>);

impl Buffer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

const STRING: &[WireType] = &[WireType::String];
const INT: &[WireType] = &[WireType::Int];
const FLOAT: &[WireType] = &[WireType::Float];
const HANDLE: &[WireType] = &[WireType::Handle];
const NUMERIC: &[WireType] = &[WireType::Int, WireType::Float];
const TEXT_OR_INT: &[WireType] = &[WireType::String, WireType::Int];

/// Wire types a kind accepts for a tag, or `None` when the kind does not
/// declare the tag.
pub fn expected_types(kind: RecordKind, tag: Tag) -> Option<&'static [WireType]> {
    use RecordKind::*;

    if tag == tags::KIND {
        return Some(STRING);
    }
    match (kind, tag) {
        (Parameter, 1001..=1004) => Some(STRING),
        (Parameter, tags::FLAG_0 | tags::FLAG_1) => Some(INT),

        (Action, 1001..=1004) => Some(STRING),
        (Action, tags::FLAG_0) => Some(INT),
        (Action, tags::FLAG_1) => Some(HANDLE),

        (ActionIcon | ActionLabel, 1001..=1005) => Some(STRING),
        (ActionIcon | ActionLabel, 1010..=1012) => Some(FLOAT),
        (ActionIcon | ActionLabel, 1040..=1043) => Some(NUMERIC),

        (Grip, 1010..=1012) => Some(FLOAT),
        (Grip, tags::FLAG_0 | tags::FLAG_2 | tags::FLAG_3) => Some(INT),
        (Grip, tags::FLAG_1) => Some(FLOAT),

        (SelectionSet, tags::NAME) => Some(STRING),
        (SelectionSet, tags::FLAG_0) => Some(INT),
        (SelectionSet, t) if t >= tags::PAYLOAD => Some(HANDLE),

        (LookupValues, tags::FLAG_0) => Some(INT),
        (LookupValues, t) if t >= tags::PAYLOAD => Some(STRING),

        (LookupTable, tags::NAME) => Some(STRING),
        (LookupTable, tags::FLAG_0 | tags::FLAG_1) => Some(INT),
        (LookupTable, t) if t >= tags::PAYLOAD => Some(TEXT_OR_INT),

        _ => None,
    }
}

/// Encode `fields` as a record of `kind`. The kind marker is written first and
/// must not be part of `fields`.
///
/// Every field whose tag is declared for `kind` must carry one of the declared
/// wire types, so anything this accepts decodes back to the same fields.
pub fn encode(kind: RecordKind, fields: &[Field]) -> Result<Buffer, DecodeError> {
    for field in fields {
        check_type(kind, field.tag, &field.value)?;
    }
    Ok(write_record(kind, fields))
}

/// Encoder for field lists built by record types, which conform by
/// construction.
pub(crate) fn write_record(kind: RecordKind, fields: &[Field]) -> Buffer {
    debug_assert!(
        fields
            .iter()
            .all(|f| check_type(kind, f.tag, &f.value).is_ok()),
        "{kind:?} record has a field of an undeclared type"
    );
    let mut writer = wire::Writer::with_capacity(16 * (fields.len() + 1));
    writer.write_entry(tags::KIND, &Variant::from(kind.marker()));
    for field in fields {
        writer.write_entry(field.tag, &field.value);
    }
    Buffer(writer.into_vec())
}

fn check_type(kind: RecordKind, tag: Tag, value: &Variant) -> Result<(), DecodeError> {
    match expected_types(kind, tag) {
        Some(allowed) if !allowed.contains(&value.wire_type()) => {
            Err(DecodeError::TagTypeMismatch {
                kind,
                tag,
                expected: allowed[0].name(),
                found: value.wire_type().name(),
            })
        }
        _ => Ok(()),
    }
}

/// Decode a buffer expected to hold a record of `kind`, returning the fields
/// after the kind marker.
pub fn decode(kind: RecordKind, buffer: &Buffer) -> Result<Vec<Field>, DecodeError> {
    let mut reader = wire::Reader::new(buffer.as_bytes());
    let found = read_marker(&mut reader, kind.marker())?;
    if found != kind {
        return Err(DecodeError::UnknownKindMarker {
            expected: kind.marker().to_string(),
            found: found.marker().to_string(),
        });
    }
    read_fields(kind, &mut reader)
}

/// Decode a buffer of whatever kind its marker names.
pub fn decode_any(buffer: &Buffer) -> Result<(RecordKind, Vec<Field>), DecodeError> {
    let mut reader = wire::Reader::new(buffer.as_bytes());
    let kind = read_marker(&mut reader, "any record kind")?;
    let fields = read_fields(kind, &mut reader)?;
    Ok((kind, fields))
}

/// Read only the kind marker.
pub fn peek_kind(buffer: &Buffer) -> Result<RecordKind, DecodeError> {
    let mut reader = wire::Reader::new(buffer.as_bytes());
    read_marker(&mut reader, "any record kind")
}

fn read_marker(reader: &mut wire::Reader<'_>, expected: &str) -> Result<RecordKind, DecodeError> {
    if reader.is_empty() {
        return Err(DecodeError::TruncatedBuffer { offset: 0 });
    }
    let unknown = |found: String| DecodeError::UnknownKindMarker {
        expected: expected.to_string(),
        found,
    };
    match reader.read_entry()? {
        (tags::KIND, Variant::String(marker)) => marker.parse().map_err(|_| unknown(marker)),
        (tags::KIND, other) => Err(unknown(format!("{} value", other.wire_type()))),
        (tag, _) => Err(unknown(format!("tag {tag}"))),
    }
}

fn read_fields(kind: RecordKind, reader: &mut wire::Reader<'_>) -> Result<Vec<Field>, DecodeError> {
    let mut fields = Vec::new();
    while !reader.is_empty() {
        let (tag, value) = reader.read_entry()?;
        check_type(kind, tag, &value)?;
        fields.push(Field { tag, value });
    }
    Ok(fields)
}

/// Typed accessors over a decoded field list, used by record `from_fields`
/// implementations.
pub struct Fields<'a> {
    kind: RecordKind,
    fields: &'a [Field],
}

impl<'a> Fields<'a> {
    pub fn new(kind: RecordKind, fields: &'a [Field]) -> Self {
        Self { kind, fields }
    }

    fn find(&self, tag: Tag) -> Option<&'a Variant> {
        self.fields.iter().find(|f| f.tag == tag).map(|f| &f.value)
    }

    fn missing(&self, tag: Tag) -> DecodeError {
        DecodeError::MissingField {
            kind: self.kind,
            tag,
        }
    }

    fn mismatch(&self, tag: Tag, expected: WireType, found: &Variant) -> DecodeError {
        DecodeError::TagTypeMismatch {
            kind: self.kind,
            tag,
            expected: expected.name(),
            found: found.wire_type().name(),
        }
    }

    pub fn opt_string(&self, tag: Tag) -> Result<Option<&'a str>, DecodeError> {
        match self.find(tag) {
            None => Ok(None),
            Some(v) => v
                .as_str()
                .map(Some)
                .ok_or_else(|| self.mismatch(tag, WireType::String, v)),
        }
    }

    pub fn string(&self, tag: Tag) -> Result<&'a str, DecodeError> {
        self.opt_string(tag)?.ok_or_else(|| self.missing(tag))
    }

    pub fn opt_int(&self, tag: Tag) -> Result<Option<i64>, DecodeError> {
        match self.find(tag) {
            None => Ok(None),
            Some(v) => v
                .as_int()
                .map(Some)
                .ok_or_else(|| self.mismatch(tag, WireType::Int, v)),
        }
    }

    pub fn int(&self, tag: Tag) -> Result<i64, DecodeError> {
        self.opt_int(tag)?.ok_or_else(|| self.missing(tag))
    }

    pub fn opt_float(&self, tag: Tag) -> Result<Option<f64>, DecodeError> {
        match self.find(tag) {
            None => Ok(None),
            Some(v) => v
                .as_float()
                .map(Some)
                .ok_or_else(|| self.mismatch(tag, WireType::Float, v)),
        }
    }

    pub fn handle(&self, tag: Tag) -> Result<Handle, DecodeError> {
        let v = self.find(tag).ok_or_else(|| self.missing(tag))?;
        v.as_handle()
            .ok_or_else(|| self.mismatch(tag, WireType::Handle, v))
    }

    /// Optional int flag; absent means `default`.
    pub fn flag(&self, tag: Tag, default: bool) -> Result<bool, DecodeError> {
        Ok(self.opt_int(tag)?.map_or(default, |v| v != 0))
    }

    /// Cursor over the repeated payload entries (tags 1070+).
    pub fn payload(&self) -> Payload<'a> {
        Payload {
            kind: self.kind,
            entries: self
                .fields
                .iter()
                .filter(|f| f.tag >= tags::PAYLOAD)
                .collect(),
            position: 0,
        }
    }
}

/// Sequential reader over payload entries, enforcing ascending tag offsets.
pub struct Payload<'a> {
    kind: RecordKind,
    entries: Vec<&'a Field>,
    position: usize,
}

impl<'a> Payload<'a> {
    pub fn remaining(&self) -> usize {
        self.entries.len().saturating_sub(self.position)
    }

    fn next_value(&mut self) -> Result<&'a Variant, DecodeError> {
        let expected_tag = tags::payload(self.position);
        let field = self
            .entries
            .get(self.position)
            .copied()
            .ok_or(DecodeError::MissingField {
                kind: self.kind,
                tag: expected_tag,
            })?;
        if field.tag != expected_tag {
            return Err(DecodeError::InvalidValue {
                tag: field.tag,
                reason: format!("expected payload tag {expected_tag}"),
            });
        }
        self.position += 1;
        Ok(&field.value)
    }

    fn mismatch(&self, expected: WireType, found: &Variant) -> DecodeError {
        DecodeError::TagTypeMismatch {
            kind: self.kind,
            tag: tags::payload(self.position.saturating_sub(1)),
            expected: expected.name(),
            found: found.wire_type().name(),
        }
    }

    pub fn next_string(&mut self) -> Result<&'a str, DecodeError> {
        let v = self.next_value()?;
        v.as_str().ok_or_else(|| self.mismatch(WireType::String, v))
    }

    pub fn next_int(&mut self) -> Result<i64, DecodeError> {
        let v = self.next_value()?;
        v.as_int().ok_or_else(|| self.mismatch(WireType::Int, v))
    }

    pub fn next_handle(&mut self) -> Result<Handle, DecodeError> {
        let v = self.next_value()?;
        v.as_handle().ok_or_else(|| self.mismatch(WireType::Handle, v))
    }

    /// Read a presence flag followed, when set, by a string.
    pub fn next_opt_string(&mut self) -> Result<Option<&'a str>, DecodeError> {
        if self.next_int()? == 0 {
            return Ok(None);
        }
        self.next_string().map(Some)
    }
}

/// Appends payload entries at consecutive tags starting from 1070.
#[derive(Debug, Default)]
pub struct PayloadWriter {
    fields: Vec<Field>,
    next: usize,
}

impl PayloadWriter {
    pub fn new(header: Vec<Field>) -> Self {
        Self {
            fields: header,
            next: 0,
        }
    }

    pub fn push(&mut self, value: impl Into<Variant>) {
        self.fields.push(Field::new(tags::payload(self.next), value));
        self.next += 1;
    }

    /// Counterpart of [`Payload::next_opt_string`].
    pub fn push_opt(&mut self, value: Option<&str>) {
        match value {
            Some(text) => {
                self.push(1i64);
                self.push(text);
            }
            None => self.push(0i64),
        }
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }
}
