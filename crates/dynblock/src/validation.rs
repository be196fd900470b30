//! Property and identifier validation.
//!
//! Identifiers (property names, column names):
//! - ASCII letters, digits and underscores only
//! - Must start with a letter or underscore
//!
//! Property validation never stops at the first problem: every check runs and
//! the messages accumulate in a [`ValidationResult`], so an editor can show
//! everything that is wrong at once.

use crate::table::{CellValue, ColumnType};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Validates an identifier.
///
/// # Examples
/// ```
/// use dynblock::validation::validate_identifier;
///
/// assert!(validate_identifier("Width").is_ok());
/// assert!(validate_identifier("_private").is_ok());
/// assert!(validate_identifier("size_2").is_ok());
///
/// assert!(validate_identifier("").is_err());
/// assert!(validate_identifier("2x").is_err());
/// assert!(validate_identifier("my-size").is_err());
/// ```
pub fn validate_identifier(name: &str) -> Result<(), IdentifierError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(IdentifierError::Empty);
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(IdentifierError::InvalidStart(first));
    }
    match chars.find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '_')) {
        Some(ch) => Err(IdentifierError::InvalidCharacter(ch)),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    Empty,
    InvalidStart(char),
    InvalidCharacter(char),
}

impl std::fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierError::Empty => write!(f, "name cannot be empty"),
            IdentifierError::InvalidStart(ch) => {
                write!(f, "name must start with a letter or underscore, found '{}'", ch)
            }
            IdentifierError::InvalidCharacter(ch) => write!(
                f,
                "name contains invalid character '{}' (only letters, digits and underscore allowed)",
                ch
            ),
        }
    }
}

impl std::error::Error for IdentifierError {}

/// A named, typed, optionally constrained value descriptor.
///
/// Used standalone when a user edits a property, and as the constraint source
/// of a lookup-table column. `type_name` is kept as entered so that an unknown
/// type is reported by validation rather than rejected on construction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParameterProperty {
    pub name: String,
    pub type_name: String,
    pub default: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub allowed_values: Vec<String>,
    pub regex_pattern: Option<String>,
    pub required: bool,
}

impl ParameterProperty {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            type_name: column_type.name().to_string(),
            ..Default::default()
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_range(mut self, min: impl Into<String>, max: impl Into<String>) -> Self {
        self.min = Some(min.into());
        self.max = Some(max.into());
        self
    }

    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.regex_pattern = Some(pattern.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn column_type(&self) -> Option<ColumnType> {
        self.type_name.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate a property descriptor.
pub fn validate_property(property: &ParameterProperty) -> ValidationResult {
    let mut errors = Vec::new();

    if let Err(e) = validate_identifier(&property.name) {
        errors.push(format!("name '{}': {}", property.name, e));
    }

    let pattern = match property.regex_pattern.as_deref().map(Regex::new) {
        Some(Err(e)) => {
            errors.push(format!("invalid regex pattern: {e}"));
            None
        }
        Some(Ok(re)) => Some(re),
        None => None,
    };

    let Some(column_type) = property.column_type() else {
        errors.push(format!("unknown type '{}'", property.type_name));
        return ValidationResult::from_errors(errors);
    };

    let convert = |what: &str, text: &str, errors: &mut Vec<String>| {
        let value = column_type.parse_value(text);
        if value.is_none() {
            errors.push(format!("{what} '{text}' is not a valid {column_type}"));
        }
        value
    };

    let default = property
        .default
        .as_deref()
        .and_then(|text| convert("default", text, &mut errors));
    let min = property
        .min
        .as_deref()
        .and_then(|text| convert("min", text, &mut errors));
    let max = property
        .max
        .as_deref()
        .and_then(|text| convert("max", text, &mut errors));

    if (property.min.is_some() || property.max.is_some()) && !supports_range(column_type) {
        errors.push(format!("range bounds are not supported for {column_type}"));
    }
    if let (Some(lo), Some(hi)) = (&min, &max) {
        if lo.compare(hi) == Some(Ordering::Greater) {
            errors.push(format!("invalid range: min {lo} is greater than max {hi}"));
        }
    }

    for allowed in &property.allowed_values {
        convert("allowed value", allowed, &mut errors);
    }

    if let Some(default) = &default {
        errors.extend(constraint_errors(
            property,
            default,
            min.as_ref(),
            max.as_ref(),
            pattern.as_ref(),
        ));
    }

    ValidationResult::from_errors(errors)
}

/// Validate a candidate value (as entered) against a property.
pub fn validate_value(property: &ParameterProperty, text: &str) -> ValidationResult {
    let Some(column_type) = property.column_type() else {
        return ValidationResult::from_errors(vec![format!(
            "unknown type '{}'",
            property.type_name
        )]);
    };
    if text.is_empty() {
        let errors = if property.required {
            vec![format!("'{}' is required", property.name)]
        } else {
            Vec::new()
        };
        return ValidationResult::from_errors(errors);
    }
    match column_type.parse_value(text) {
        Some(value) => ValidationResult::from_errors(check_value(property, &value)),
        None => ValidationResult::from_errors(vec![format!(
            "'{text}' is not a valid {column_type}"
        )]),
    }
}

/// Constraint checks for an already-typed value. Type conformance is the
/// caller's concern.
///
/// Compiles the property's pattern on every call; use [`CompiledProperty`] to
/// check many values.
pub fn check_value(property: &ParameterProperty, value: &CellValue) -> Vec<String> {
    CompiledProperty::new(property.clone()).check(value)
}

/// A property with its pattern compiled once, for checking many values.
#[derive(Debug, Clone)]
pub struct CompiledProperty {
    property: ParameterProperty,
    pattern: Option<Result<Regex, String>>,
}

impl CompiledProperty {
    pub fn new(property: ParameterProperty) -> Self {
        let pattern = property
            .regex_pattern
            .as_deref()
            .map(|text| Regex::new(text).map_err(|e| e.to_string()));
        Self { property, pattern }
    }

    pub fn property(&self) -> &ParameterProperty {
        &self.property
    }

    /// Same checks as [`check_value`].
    pub fn check(&self, value: &CellValue) -> Vec<String> {
        let parse_bound = |bound: &Option<String>| {
            bound
                .as_deref()
                .and_then(|text| value.column_type().parse_value(text))
        };
        let min = parse_bound(&self.property.min);
        let max = parse_bound(&self.property.max);
        let mut errors = Vec::new();
        let pattern = match &self.pattern {
            Some(Ok(re)) => Some(re),
            Some(Err(e)) => {
                errors.push(format!("invalid regex pattern: {e}"));
                None
            }
            None => None,
        };
        errors.extend(constraint_errors(
            &self.property,
            value,
            min.as_ref(),
            max.as_ref(),
            pattern,
        ));
        errors
    }
}

impl PartialEq for CompiledProperty {
    fn eq(&self, other: &Self) -> bool {
        self.property == other.property
    }
}

impl Serialize for CompiledProperty {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.property.serialize(serializer)
    }
}

fn supports_range(column_type: ColumnType) -> bool {
    matches!(column_type, ColumnType::Number | ColumnType::DateTime)
}

fn constraint_errors(
    property: &ParameterProperty,
    value: &CellValue,
    min: Option<&CellValue>,
    max: Option<&CellValue>,
    pattern: Option<&Regex>,
) -> Vec<String> {
    let mut errors = Vec::new();
    if let Some(lo) = min {
        if value.compare(lo) == Some(Ordering::Less) {
            errors.push(format!("value {value} is below min {lo}"));
        }
    }
    if let Some(hi) = max {
        if value.compare(hi) == Some(Ordering::Greater) {
            errors.push(format!("value {value} is above max {hi}"));
        }
    }
    if !property.allowed_values.is_empty() {
        let column_type = value.column_type();
        let allowed = property
            .allowed_values
            .iter()
            .filter_map(|text| column_type.parse_value(text))
            .any(|candidate| &candidate == value);
        if !allowed {
            errors.push(format!("value {value} is not one of the allowed values"));
        }
    }
    if let Some(re) = pattern {
        if !re.is_match(&value.to_string()) {
            errors.push(format!("value {value} does not match pattern '{}'", re.as_str()));
        }
    }
    errors
}
