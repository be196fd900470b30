//! CSV text import and export.
//!
//! The header row holds column names in declaration order. Values are written
//! in their canonical text form and quoted only when they contain a comma,
//! quote or line break. Reading and writing files is left to the caller.

use super::{LookupTable, Row};
use crate::error::{DynBlockError, Result, SchemaError};
use ::csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::HashSet;
use std::io;
use tracing::debug;

/// Column names from the first line of `text`.
pub fn read_header(text: &str) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    Ok(reader.headers()?.iter().map(str::to_string).collect())
}

impl LookupTable {
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .from_writer(Vec::new());

        writer.write_record(self.column_names())?;
        for row in &self.rows {
            let record: Vec<String> = self
                .columns
                .iter()
                .map(|c| row.get(&c.name).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            writer.write_record(&record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| DynBlockError::Io(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| DynBlockError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    /// Replace every row with the rows of `text`. The header must name only
    /// declared columns; any failure leaves the table unchanged.
    pub fn from_csv(&mut self, text: &str) -> Result<usize> {
        let rows = self.parse_csv(text)?;
        let count = rows.len();
        self.rows = rows;
        debug!(table = %self.table_name, rows = count, "imported csv");
        Ok(count)
    }

    /// Append the rows of `text`, all or nothing.
    pub fn append_csv(&mut self, text: &str) -> Result<usize> {
        let rows = self.parse_csv(text)?;
        let count = rows.len();
        self.rows.extend(rows);
        Ok(count)
    }

    fn parse_csv(&self, text: &str) -> Result<Vec<Row>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());
        let header = reader.headers()?.clone();
        self.check_header(&header)?;

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != header.len() {
                return Err(SchemaError::SchemaMismatch(format!(
                    "record {} has {} fields, header has {}",
                    line + 1,
                    record.len(),
                    header.len()
                ))
                .into());
            }
            let parsed = self.parse_text_row(header.iter().zip(record.iter()))?;
            rows.push(self.prepare_row(parsed)?);
        }
        Ok(rows)
    }

    fn check_header(&self, header: &StringRecord) -> Result<()> {
        let mut seen = HashSet::new();
        for name in header {
            if self.column(name).is_none() {
                return Err(SchemaError::SchemaMismatch(format!("unknown column '{name}'")).into());
            }
            if !seen.insert(name) {
                return Err(
                    SchemaError::SchemaMismatch(format!("column '{name}' appears twice")).into(),
                );
            }
        }
        Ok(())
    }
}
