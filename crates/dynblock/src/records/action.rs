use super::{DomainRecord, ParameterRecord, SelectionSetRef};
use crate::codec::{tags, Field, Fields, RecordKind, Variant};
use crate::error::DecodeError;
use crate::model::{Handle, WeakRef};
use crate::table::LookupTable;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionKind {
    #[default]
    Lookup,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Lookup => "Lookup",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `ACTION` record itself. Its selection set, lookup values and table are
/// sibling records; see [`LookupAction`].
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub name: String,
    pub description: String,
    pub kind: ActionKind,
    /// Driving parameter. Lookup only: the action neither owns nor keeps it alive.
    pub parameter_ref: WeakRef<ParameterRecord>,
    pub enabled: bool,
}

impl ActionRecord {
    pub fn lookup(name: impl Into<String>, parameter: Handle) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind: ActionKind::Lookup,
            parameter_ref: WeakRef::new(parameter),
            enabled: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl DomainRecord for ActionRecord {
    const KIND: RecordKind = RecordKind::Action;

    fn to_fields(&self) -> Vec<Field> {
        vec![
            Field::new(tags::NAME, self.name.as_str()),
            Field::new(tags::DESCRIPTION, self.description.as_str()),
            Field::new(tags::ACTION_KIND, self.kind.as_str()),
            Field::new(tags::FLAG_0, Variant::flag(self.enabled)),
            Field::new(tags::FLAG_1, self.parameter_ref.handle()),
        ]
    }

    fn from_fields(fields: &[Field]) -> Result<Self, DecodeError> {
        let f = Fields::new(Self::KIND, fields);
        let kind = match f.opt_string(tags::ACTION_KIND)? {
            None | Some("Lookup") => ActionKind::Lookup,
            Some(other) => {
                return Err(DecodeError::InvalidValue {
                    tag: tags::ACTION_KIND,
                    reason: format!("unsupported action kind '{other}'"),
                })
            }
        };

        Ok(Self {
            name: f.string(tags::NAME)?.to_string(),
            description: f.opt_string(tags::DESCRIPTION)?.unwrap_or_default().to_string(),
            kind,
            parameter_ref: WeakRef::new(f.handle(tags::FLAG_1)?),
            enabled: f.flag(tags::FLAG_0, true)?,
        })
    }
}

/// The values a lookup action offers to the user, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupValues(pub Vec<String>);

impl LookupValues {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl DomainRecord for LookupValues {
    const KIND: RecordKind = RecordKind::LookupValues;

    fn to_fields(&self) -> Vec<Field> {
        let mut fields = Vec::with_capacity(self.0.len() + 1);
        fields.push(Field::new(tags::FLAG_0, self.0.len() as i64));
        fields.extend(
            self.0
                .iter()
                .enumerate()
                .map(|(i, v)| Field::new(tags::payload(i), v.as_str())),
        );
        fields
    }

    fn from_fields(fields: &[Field]) -> Result<Self, DecodeError> {
        let f = Fields::new(Self::KIND, fields);
        let mut payload = f.payload();
        let count = f.opt_int(tags::FLAG_0)?.unwrap_or(payload.remaining() as i64);
        if count < 0 || count as usize != payload.remaining() {
            return Err(DecodeError::InvalidValue {
                tag: tags::FLAG_0,
                reason: format!(
                    "value count {count} does not match {} entries",
                    payload.remaining()
                ),
            });
        }
        let mut values = Vec::with_capacity(payload.remaining());
        while payload.remaining() > 0 {
            values.push(payload.next_string()?.to_string());
        }
        Ok(Self(values))
    }
}

/// A lookup action with all of its sibling records, as created and loaded by
/// the command layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupAction {
    pub record: ActionRecord,
    pub selection: SelectionSetRef,
    pub values: LookupValues,
    pub table: LookupTable,
}
