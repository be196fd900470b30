//! # Domain Records
//!
//! Typed views over tagged records. Each record type knows its kind marker and
//! how to flatten itself into an ordered field list ([`DomainRecord::to_fields`])
//! and back ([`DomainRecord::from_fields`]). Integer tags never escape this
//! layer: callers work with [`ParameterRecord`], [`ActionRecord`] and friends,
//! or with [`FieldSet`] when the kind is only known at runtime.
//!
//! ## Records Per Host Object
//!
//! | Host object | Named records |
//! |-------------|---------------|
//! | parameter   | `Parameter`, `Grip0`..`GripN` |
//! | action      | `Action`, `SelectionSet`, `LookupValues`, `LookupTable` |

mod action;
mod grip;
mod parameter;
mod selection;

use crate::codec::{self, Buffer, Field, RecordKind};
use crate::error::DecodeError;
use crate::table::LookupTable;

pub use action::{ActionKind, ActionRecord, LookupAction, LookupValues};
pub use grip::{GripRecord, GripType, Point3};
pub use parameter::ParameterRecord;
pub use selection::{SelectionSetManager, SelectionSetRef};

/// Record names used in a host object's attribute dictionary.
pub mod names {
    pub const PARAMETER: &str = "Parameter";
    pub const ACTION: &str = "Action";
    pub const SELECTION_SET: &str = "SelectionSet";
    pub const LOOKUP_VALUES: &str = "LookupValues";
    pub const LOOKUP_TABLE: &str = "LookupTable";
    pub const GRIP_PREFIX: &str = "Grip";

    pub fn grip(index: usize) -> String {
        format!("{GRIP_PREFIX}{index}")
    }
}

/// A type persisted as one tagged record.
pub trait DomainRecord: Sized {
    const KIND: RecordKind;

    fn to_fields(&self) -> Vec<Field>;

    fn from_fields(fields: &[Field]) -> Result<Self, DecodeError>;

    fn encode(&self) -> Buffer {
        codec::write_record(Self::KIND, &self.to_fields())
    }

    fn decode(buffer: &Buffer) -> Result<Self, DecodeError> {
        Self::from_fields(&codec::decode(Self::KIND, buffer)?)
    }
}

/// Any decoded record, selected by its kind marker.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSet {
    Parameter(ParameterRecord),
    Action(ActionRecord),
    Grip(GripRecord),
    SelectionSet(SelectionSetRef),
    LookupValues(LookupValues),
    LookupTable(LookupTable),
    /// Kinds whose content belongs to the host (action icons and labels).
    Raw { kind: RecordKind, fields: Vec<Field> },
}

impl FieldSet {
    pub fn decode(buffer: &Buffer) -> Result<Self, DecodeError> {
        let (kind, fields) = codec::decode_any(buffer)?;
        Ok(match kind {
            RecordKind::Parameter => FieldSet::Parameter(ParameterRecord::from_fields(&fields)?),
            RecordKind::Action => FieldSet::Action(ActionRecord::from_fields(&fields)?),
            RecordKind::Grip => FieldSet::Grip(GripRecord::from_fields(&fields)?),
            RecordKind::SelectionSet => {
                FieldSet::SelectionSet(SelectionSetRef::from_fields(&fields)?)
            }
            RecordKind::LookupValues => FieldSet::LookupValues(LookupValues::from_fields(&fields)?),
            RecordKind::LookupTable => FieldSet::LookupTable(LookupTable::from_fields(&fields)?),
            RecordKind::ActionIcon | RecordKind::ActionLabel => FieldSet::Raw { kind, fields },
        })
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            FieldSet::Parameter(_) => RecordKind::Parameter,
            FieldSet::Action(_) => RecordKind::Action,
            FieldSet::Grip(_) => RecordKind::Grip,
            FieldSet::SelectionSet(_) => RecordKind::SelectionSet,
            FieldSet::LookupValues(_) => RecordKind::LookupValues,
            FieldSet::LookupTable(_) => RecordKind::LookupTable,
            FieldSet::Raw { kind, .. } => *kind,
        }
    }

    /// Raw field lists are checked against their kind; typed records always
    /// encode.
    pub fn encode(&self) -> Result<Buffer, DecodeError> {
        Ok(match self {
            FieldSet::Parameter(r) => r.encode(),
            FieldSet::Action(r) => r.encode(),
            FieldSet::Grip(r) => r.encode(),
            FieldSet::SelectionSet(r) => r.encode(),
            FieldSet::LookupValues(r) => r.encode(),
            FieldSet::LookupTable(r) => r.encode(),
            FieldSet::Raw { kind, fields } => codec::encode(*kind, fields)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tags;
    use crate::model::Handle;

    #[test]
    fn field_set_dispatches_on_marker() {
        let param = ParameterRecord::new("Flip1");
        let decoded = FieldSet::decode(&param.encode()).unwrap();
        assert_eq!(decoded, FieldSet::Parameter(param));

        let action = ActionRecord::lookup("L", Handle::new(3));
        let decoded = FieldSet::decode(&action.encode()).unwrap();
        assert_eq!(decoded.kind(), RecordKind::Action);
    }

    #[test]
    fn host_owned_kinds_decode_raw() {
        let fields = vec![
            Field::new(tags::NAME, "icon"),
            Field::new(tags::POINT_X, 4.0f64),
        ];
        let buffer = codec::encode(RecordKind::ActionIcon, &fields).unwrap();
        let decoded = FieldSet::decode(&buffer).unwrap();
        assert_eq!(
            decoded,
            FieldSet::Raw {
                kind: RecordKind::ActionIcon,
                fields
            }
        );
        assert_eq!(decoded.encode(), Ok(buffer));
    }

    #[test]
    fn raw_fields_of_the_wrong_type_do_not_encode() {
        let raw = FieldSet::Raw {
            kind: RecordKind::ActionLabel,
            fields: vec![Field::new(tags::POINT_X, "left")],
        };
        assert!(matches!(
            raw.encode(),
            Err(DecodeError::TagTypeMismatch {
                tag: tags::POINT_X,
                ..
            })
        ));
    }

    #[test]
    fn grip_names_are_indexed() {
        assert_eq!(names::grip(0), "Grip0");
        assert_eq!(names::grip(12), "Grip12");
    }
}
