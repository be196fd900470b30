use super::DomainRecord;
use crate::codec::{tags, Field, Fields, RecordKind, Variant};
use crate::error::DecodeError;
use chrono::{DateTime, SecondsFormat, Utc};

/// A user-placed parameter. Owns its grips.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRecord {
    pub name: String,
    pub label: String,
    pub description: String,
    pub grip_count: u32,
    pub show_palette: bool,
    pub created_at: DateTime<Utc>,
}

impl ParameterRecord {
    /// New parameter with one grip, labelled after its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            description: String::new(),
            grip_count: 1,
            show_palette: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_grip_count(mut self, grip_count: u32) -> Self {
        self.grip_count = grip_count;
        self
    }
}

impl DomainRecord for ParameterRecord {
    const KIND: RecordKind = RecordKind::Parameter;

    fn to_fields(&self) -> Vec<Field> {
        vec![
            Field::new(tags::NAME, self.name.as_str()),
            Field::new(tags::LABEL, self.label.as_str()),
            Field::new(tags::DESCRIPTION, self.description.as_str()),
            Field::new(
                tags::DISPLAY_4,
                self.created_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ),
            Field::new(tags::FLAG_0, i64::from(self.grip_count)),
            Field::new(tags::FLAG_1, Variant::flag(self.show_palette)),
        ]
    }

    fn from_fields(fields: &[Field]) -> Result<Self, DecodeError> {
        let f = Fields::new(Self::KIND, fields);
        let name = f.string(tags::NAME)?;
        if name.is_empty() {
            return Err(DecodeError::InvalidValue {
                tag: tags::NAME,
                reason: "parameter name is empty".to_string(),
            });
        }
        let created_at = match f.opt_string(tags::DISPLAY_4)? {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map_err(|e| DecodeError::InvalidValue {
                    tag: tags::DISPLAY_4,
                    reason: e.to_string(),
                })?
                .with_timezone(&Utc),
            None => DateTime::<Utc>::UNIX_EPOCH,
        };
        let grip_count = f.opt_int(tags::FLAG_0)?.unwrap_or(0);
        let grip_count = u32::try_from(grip_count).map_err(|_| DecodeError::InvalidValue {
            tag: tags::FLAG_0,
            reason: format!("grip count {grip_count} out of range"),
        })?;

        Ok(Self {
            name: name.to_string(),
            label: f.opt_string(tags::LABEL)?.unwrap_or(name).to_string(),
            description: f.opt_string(tags::DESCRIPTION)?.unwrap_or_default().to_string(),
            grip_count,
            show_palette: f.flag(tags::FLAG_1, true)?,
            created_at,
        })
    }
}
