use crate::codec::{RecordKind, Tag};
use crate::model::Handle;
use serde::Serialize;
use thiserror::Error;

/// Failures while reading a tagged-record buffer back into fields or records.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("unknown kind marker: expected {expected}, found {found:?}")]
    UnknownKindMarker { expected: String, found: String },

    #[error("buffer truncated at byte {offset}")]
    TruncatedBuffer { offset: usize },

    #[error("tag {tag} in {kind} record has wire type {found}, expected {expected}")]
    TagTypeMismatch {
        kind: RecordKind,
        tag: Tag,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown wire type {0}")]
    UnknownWireType(u8),

    #[error("invalid utf-8 in string value of tag {tag}")]
    InvalidUtf8 { tag: Tag },

    #[error("{kind} record is missing tag {tag}")]
    MissingField { kind: RecordKind, tag: Tag },

    #[error("invalid value for tag {tag}: {reason}")]
    InvalidValue { tag: Tag, reason: String },
}

/// Structural problems with lookup table columns and rows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("required column '{0}' is missing")]
    MissingRequiredColumn(String),

    #[error("column '{column}' expects {expected}, got '{value}'")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        value: String,
    },

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("row index {index} out of range (table has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("column '{column}' constraint violated: {reason}")]
    ConstraintViolation { column: String, reason: String },

    #[error("invalid property: {}", .0.join("; "))]
    InvalidProperty(Vec<String>),

    #[error("'{0}' already exists")]
    DuplicateName(String),

    #[error("'{0}' not found")]
    UnknownName(String),
}

/// Broken links between records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("dangling reference to {0}")]
    DanglingReference(Handle),

    #[error("record '{name}' not found on {handle}")]
    MissingRecord { handle: Handle, name: String },

    #[error("action on {0} is disabled")]
    ActionDisabled(Handle),
}

/// Failures raised while matching an input against a lookup table.
///
/// `SkippedRow` is never returned as the error of a scan; it is collected in
/// the resolution report so the scan can continue.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum MatchError {
    #[error("range match needs a numeric input, got '{0}'")]
    TypeError(String),

    #[error("row {row} skipped: {reason}")]
    SkippedRow { row: usize, reason: String },

    #[error("match configuration: {0}")]
    Config(String),
}

#[derive(Error, Debug)]
pub enum DynBlockError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Reference error: {0}")]
    Reference(#[from] ReferenceError),

    #[error("Match error: {0}")]
    Match(#[from] MatchError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DynBlockError>;
