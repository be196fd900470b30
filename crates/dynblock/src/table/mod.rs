//! # Lookup Tables
//!
//! A [`LookupTable`] is a small typed store: declared columns ([`ColumnDef`])
//! and rows mapping column names to [`CellValue`]s. It is independent of the
//! attribute layer; an action persists its table as a `LOOKUP_TABLE` record
//! (see [`record`]) and the CLI reads and writes it as CSV (see [`csv`]).
//!
//! ## Row Invariants
//!
//! Every row stored in a table satisfies:
//! - Its keys are a subset of the declared column names.
//! - Every present value has its column's type.
//! - Every `required` column is present.
//! - Optional columns that are absent hold the column default, if any.
//! - Columns created from a [`ParameterProperty`] satisfy its constraints.
//!
//! Mutations validate first and only then touch `rows`, so a failed insert or
//! update leaves the table exactly as it was.

mod csv;
mod duplicates;
mod record;
mod value;

use crate::error::SchemaError;
use crate::validation::{self, validate_identifier, CompiledProperty, ParameterProperty};
use serde::Serialize;
use std::collections::BTreeMap;

pub use self::csv::read_header as read_csv_header;
pub use duplicates::DEFAULT_IDENTITY_COLUMN;
pub use value::{parse_bool, parse_datetime, parse_number, CellValue, ColumnType};

/// One row: column name to value. Absent keys are empty cells.
pub type Row = BTreeMap<String, CellValue>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub required: bool,
    pub default: Option<CellValue>,
    /// Constraint source when the column was created from a property.
    property: Option<CompiledProperty>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            required: false,
            default: None,
            property: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<CellValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Build a column from a property that passes validation.
    pub fn from_property(property: &ParameterProperty) -> Result<Self, SchemaError> {
        let result = validation::validate_property(property);
        if !result.is_valid {
            return Err(SchemaError::InvalidProperty(result.errors));
        }
        let column_type = property
            .column_type()
            .ok_or_else(|| SchemaError::InvalidProperty(vec![property.type_name.clone()]))?;
        Ok(Self {
            name: property.name.clone(),
            column_type,
            required: property.required,
            default: property
                .default
                .as_deref()
                .and_then(|text| column_type.parse_value(text)),
            property: Some(CompiledProperty::new(property.clone())),
        })
    }

    pub fn property(&self) -> Option<&ParameterProperty> {
        self.property.as_ref().map(CompiledProperty::property)
    }

    fn check(&self, value: &CellValue) -> Result<(), SchemaError> {
        let finite = value.as_number().map_or(true, f64::is_finite);
        if value.column_type() != self.column_type || !finite {
            return Err(SchemaError::TypeMismatch {
                column: self.name.clone(),
                expected: self.column_type.name(),
                value: value.to_string(),
            });
        }
        if let Some(property) = &self.property {
            let errors = property.check(value);
            if !errors.is_empty() {
                return Err(SchemaError::ConstraintViolation {
                    column: self.name.clone(),
                    reason: errors.join("; "),
                });
            }
        }
        Ok(())
    }
}

/// Numeric sequence used by [`LookupTable::generate_rows`].
#[derive(Debug, Clone, PartialEq)]
pub struct RowSequence {
    pub column: String,
    pub start: f64,
    pub end: f64,
    pub step: f64,
    /// Optional `(column, template)`; `{value}` in the template is replaced by
    /// the generated number.
    pub label: Option<(String, String)>,
}

const MAX_GENERATED_ROWS: usize = 100_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LookupTable {
    table_name: String,
    columns: Vec<ColumnDef>,
    rows: Vec<Row>,
}

impl LookupTable {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.table_name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.table_name = name.into();
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn add_column(&mut self, def: ColumnDef) -> Result<(), SchemaError> {
        validate_identifier(&def.name).map_err(|e| SchemaError::InvalidName {
            name: def.name.clone(),
            reason: e.to_string(),
        })?;
        if self.column(&def.name).is_some() {
            return Err(SchemaError::DuplicateColumn(def.name));
        }
        if let Some(default) = &def.default {
            def.check(default)?;
        }
        if def.required && def.default.is_none() && !self.rows.is_empty() {
            return Err(SchemaError::MissingRequiredColumn(def.name));
        }

        if let Some(default) = &def.default {
            for row in &mut self.rows {
                row.insert(def.name.clone(), default.clone());
            }
        }
        self.columns.push(def);
        Ok(())
    }

    /// Add a column described by a property; the property must validate.
    pub fn insert_column(&mut self, property: &ParameterProperty) -> Result<(), SchemaError> {
        self.add_column(ColumnDef::from_property(property)?)
    }

    pub fn add_row(&mut self, values: Row) -> Result<(), SchemaError> {
        let row = self.prepare_row(values)?;
        self.rows.push(row);
        Ok(())
    }

    /// Add a row given as text, converting each value by its column type.
    pub fn add_text_row<I, K, V>(&mut self, values: I) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let row = self.parse_text_row(values)?;
        self.add_row(row)
    }

    pub fn update_row(&mut self, index: usize, values: Row) -> Result<(), SchemaError> {
        self.check_index(index)?;
        let row = self.prepare_row(values)?;
        self.rows[index] = row;
        Ok(())
    }

    pub fn remove_row(&mut self, index: usize) -> Result<Row, SchemaError> {
        self.check_index(index)?;
        Ok(self.rows.remove(index))
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Values of one column, in row order, skipping empty cells.
    pub fn column_values(&self, name: &str) -> Result<Vec<&CellValue>, SchemaError> {
        if self.column(name).is_none() {
            return Err(SchemaError::UnknownColumn(name.to_string()));
        }
        Ok(self.rows.iter().filter_map(|row| row.get(name)).collect())
    }

    /// Stable sort by one column. Empty cells sort last in either direction.
    pub fn sort_by_column(&mut self, name: &str, descending: bool) -> Result<(), SchemaError> {
        if self.column(name).is_none() {
            return Err(SchemaError::UnknownColumn(name.to_string()));
        }
        self.rows.sort_by(|a, b| match (a.get(name), b.get(name)) {
            (Some(x), Some(y)) => {
                let ord = x.compare(y).unwrap_or(std::cmp::Ordering::Equal);
                if descending {
                    ord.reverse()
                } else {
                    ord
                }
            }
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Ok(())
    }

    /// Append one row per value of a numeric sequence. All rows are validated
    /// before any is added.
    pub fn generate_rows(&mut self, sequence: &RowSequence) -> Result<usize, SchemaError> {
        let finite = [sequence.start, sequence.end, sequence.step]
            .iter()
            .all(|v| v.is_finite());
        if !finite || sequence.step <= 0.0 {
            return Err(SchemaError::SchemaMismatch(
                "sequence needs finite bounds and a positive step".to_string(),
            ));
        }
        let span = sequence.end - sequence.start;
        if span < 0.0 {
            return Ok(0);
        }
        // Tolerate float drift on the last step.
        let steps = (span / sequence.step + 1e-9).floor();
        if steps >= MAX_GENERATED_ROWS as f64 {
            return Err(SchemaError::SchemaMismatch(format!(
                "sequence would generate more than {MAX_GENERATED_ROWS} rows"
            )));
        }

        let mut staged = Vec::new();
        for i in 0..=(steps as usize) {
            let value = sequence.start + sequence.step * i as f64;
            let mut row = Row::new();
            row.insert(sequence.column.clone(), CellValue::Number(value));
            if let Some((column, template)) = &sequence.label {
                let text = template.replace("{value}", &CellValue::Number(value).to_string());
                let def = self
                    .column(column)
                    .ok_or_else(|| SchemaError::UnknownColumn(column.clone()))?;
                let cell = def.column_type.parse_value(&text).ok_or_else(|| {
                    SchemaError::TypeMismatch {
                        column: column.clone(),
                        expected: def.column_type.name(),
                        value: text.clone(),
                    }
                })?;
                row.insert(column.clone(), cell);
            }
            staged.push(self.prepare_row(row)?);
        }

        let count = staged.len();
        self.rows.extend(staged);
        Ok(count)
    }

    fn check_index(&self, index: usize) -> Result<(), SchemaError> {
        if index >= self.rows.len() {
            return Err(SchemaError::IndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(())
    }

    fn parse_text_row<I, K, V>(&self, values: I) -> Result<Row, SchemaError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut row = Row::new();
        for (key, text) in values {
            let (key, text) = (key.as_ref(), text.as_ref());
            let def = self
                .column(key)
                .ok_or_else(|| SchemaError::UnknownColumn(key.to_string()))?;
            if text.is_empty() && def.column_type != ColumnType::Text {
                continue;
            }
            let value = def
                .column_type
                .parse_value(text)
                .ok_or_else(|| SchemaError::TypeMismatch {
                    column: key.to_string(),
                    expected: def.column_type.name(),
                    value: text.to_string(),
                })?;
            row.insert(key.to_string(), value);
        }
        Ok(row)
    }

    /// Validate a candidate row and fill defaults.
    fn prepare_row(&self, mut values: Row) -> Result<Row, SchemaError> {
        if let Some(unknown) = values.keys().find(|k| self.column(k).is_none()) {
            return Err(SchemaError::UnknownColumn(unknown.clone()));
        }

        for def in &self.columns {
            let blank = matches!(values.get(&def.name), Some(CellValue::Text(s)) if s.is_empty());
            if blank && !def.required {
                values.remove(&def.name);
            }
            match values.get(&def.name) {
                Some(value) => def.check(value)?,
                None if def.required => {
                    return Err(SchemaError::MissingRequiredColumn(def.name.clone()))
                }
                None => {
                    if let Some(default) = &def.default {
                        values.insert(def.name.clone(), default.clone());
                    }
                }
            }
        }
        Ok(values)
    }
}

/// Build a [`Row`] from `(column, value)` pairs.
pub fn row<I, K, V>(values: I) -> Row
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<CellValue>,
{
    values
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
