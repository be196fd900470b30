use super::DomainRecord;
use crate::codec::{tags, Field, Fields, RecordKind, Variant};
use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// How a grip moves when dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GripType {
    #[default]
    Position,
    Linear,
    Angular,
    Radius,
    XY,
}

impl GripType {
    pub fn id(self) -> i64 {
        match self {
            GripType::Position => 0,
            GripType::Linear => 1,
            GripType::Angular => 2,
            GripType::Radius => 3,
            GripType::XY => 4,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(GripType::Position),
            1 => Some(GripType::Linear),
            2 => Some(GripType::Angular),
            3 => Some(GripType::Radius),
            4 => Some(GripType::XY),
            _ => None,
        }
    }
}

impl fmt::Display for GripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GripType::Position => "Position",
            GripType::Linear => "Linear",
            GripType::Angular => "Angular",
            GripType::Radius => "Radius",
            GripType::XY => "XY",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GripRecord {
    pub location: Point3,
    pub grip_type: GripType,
    pub size: f64,
    pub visible: bool,
    pub enabled: bool,
}

impl GripRecord {
    pub fn new(location: Point3, grip_type: GripType, size: f64) -> Self {
        Self {
            location,
            grip_type,
            size,
            visible: true,
            enabled: true,
        }
    }
}

impl DomainRecord for GripRecord {
    const KIND: RecordKind = RecordKind::Grip;

    fn to_fields(&self) -> Vec<Field> {
        vec![
            Field::new(tags::POINT_X, self.location.x),
            Field::new(tags::POINT_Y, self.location.y),
            Field::new(tags::POINT_Z, self.location.z),
            Field::new(tags::FLAG_0, self.grip_type.id()),
            Field::new(tags::FLAG_1, self.size),
            Field::new(tags::FLAG_2, Variant::flag(self.visible)),
            Field::new(tags::FLAG_3, Variant::flag(self.enabled)),
        ]
    }

    fn from_fields(fields: &[Field]) -> Result<Self, DecodeError> {
        let f = Fields::new(Self::KIND, fields);
        let type_id = f.opt_int(tags::FLAG_0)?.unwrap_or(0);
        let grip_type = GripType::from_id(type_id).ok_or_else(|| DecodeError::InvalidValue {
            tag: tags::FLAG_0,
            reason: format!("unknown grip type id {type_id}"),
        })?;

        Ok(Self {
            location: Point3 {
                x: f.opt_float(tags::POINT_X)?.unwrap_or_default(),
                y: f.opt_float(tags::POINT_Y)?.unwrap_or_default(),
                z: f.opt_float(tags::POINT_Z)?.unwrap_or_default(),
            },
            grip_type,
            size: f.opt_float(tags::FLAG_1)?.unwrap_or(1.0),
            visible: f.flag(tags::FLAG_2, true)?,
            enabled: f.flag(tags::FLAG_3, true)?,
        })
    }
}
