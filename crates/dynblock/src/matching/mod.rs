//! # Match Engine
//!
//! Resolves a user-supplied input to a row of a [`LookupTable`]. Stateless:
//! every call scans the rows in table order and the first structural match
//! wins, so ties are broken purely by row position. Callers that want a
//! priority order sort the table first ([`LookupTable::sort_by_column`]).
//!
//! | Strategy | Row matches when |
//! |----------|------------------|
//! | `exact`  | input equals the row value, ignoring case |
//! | `fuzzy`  | the row value contains the input, ignoring case |
//! | `range`  | the numeric input lies in the row's inclusive `[min, max]` |
//! | `regex`  | the row value, compiled as a pattern, matches the input |
//!
//! A row that cannot be evaluated (a pattern that does not compile, a range
//! that does not parse) is recorded in [`Resolution::skipped`] and the scan
//! carries on.

mod range;

use crate::error::MatchError;
use crate::table::{parse_number, CellValue, LookupTable, Row};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

pub use range::{parse_range, NumericRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    #[default]
    Exact,
    Fuzzy,
    Range,
    Regex,
}

impl MatchStrategy {
    pub fn name(self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::Fuzzy => "fuzzy",
            MatchStrategy::Range => "range",
            MatchStrategy::Regex => "regex",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(MatchStrategy::Exact),
            "fuzzy" | "contains" => Ok(MatchStrategy::Fuzzy),
            "range" => Ok(MatchStrategy::Range),
            "regex" => Ok(MatchStrategy::Regex),
            other => Err(format!("unknown match strategy '{other}'")),
        }
    }
}

/// Which columns to compare and which to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// One column, or two (`min`, `max`) for [`MatchStrategy::Range`].
    pub input_columns: Vec<String>,
    pub output_columns: Vec<String>,
    pub strategy: MatchStrategy,
    pub default_result: Option<String>,
    pub regex_case_insensitive: bool,
}

impl MatchConfig {
    pub fn new(
        input_column: impl Into<String>,
        output_column: impl Into<String>,
        strategy: MatchStrategy,
    ) -> Self {
        Self {
            input_columns: vec![input_column.into()],
            output_columns: vec![output_column.into()],
            strategy,
            default_result: None,
            regex_case_insensitive: true,
        }
    }

    /// Range match over a `min` and a `max` column.
    pub fn range(
        min_column: impl Into<String>,
        max_column: impl Into<String>,
        output_column: impl Into<String>,
    ) -> Self {
        Self {
            input_columns: vec![min_column.into(), max_column.into()],
            ..Self::new("", output_column, MatchStrategy::Range)
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_result = Some(default.into());
        self
    }

    pub fn with_output(mut self, column: impl Into<String>) -> Self {
        self.output_columns.push(column.into());
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.regex_case_insensitive = false;
        self
    }

    fn check(&self, table: &LookupTable) -> Result<(), MatchError> {
        let max_inputs = match self.strategy {
            MatchStrategy::Range => 2,
            _ => 1,
        };
        if self.input_columns.is_empty() || self.input_columns.len() > max_inputs {
            return Err(MatchError::Config(format!(
                "{} matching takes {} input column(s), got {}",
                self.strategy,
                if max_inputs == 1 { "1" } else { "1 or 2" },
                self.input_columns.len()
            )));
        }
        if self.output_columns.is_empty() {
            return Err(MatchError::Config("no output column".to_string()));
        }
        for name in self.input_columns.iter().chain(&self.output_columns) {
            if table.column(name).is_none() {
                return Err(MatchError::Config(format!("unknown column '{name}'")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// First matching row with its present output cells.
    Matched {
        row: usize,
        values: Vec<(String, CellValue)>,
    },
    /// Nothing matched; the configured default.
    Default { value: String },
    NoMatch,
}

impl MatchOutcome {
    /// Text of the first output value, or the default.
    pub fn value(&self) -> Option<String> {
        match self {
            MatchOutcome::Matched { values, .. } => values.first().map(|(_, v)| v.to_string()),
            MatchOutcome::Default { value } => Some(value.clone()),
            MatchOutcome::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub outcome: MatchOutcome,
    /// Rows that could not be evaluated, in scan order.
    pub skipped: Vec<MatchError>,
}

/// Resolve `input` against `table`.
///
/// Fails only for a bad configuration or, under [`MatchStrategy::Range`], a
/// non-numeric input. Running out of rows is not an error.
pub fn resolve(
    table: &LookupTable,
    input: &str,
    config: &MatchConfig,
) -> Result<Resolution, MatchError> {
    config.check(table)?;

    let numeric = match config.strategy {
        MatchStrategy::Range => {
            Some(parse_number(input).ok_or_else(|| MatchError::TypeError(input.to_string()))?)
        }
        _ => None,
    };
    let needle = input.to_lowercase();
    let mut patterns = Patterns::new(config.regex_case_insensitive);
    let mut skipped = Vec::new();

    for (index, row) in table.rows().iter().enumerate() {
        let hit = match (config.strategy, numeric) {
            (MatchStrategy::Range, Some(value)) => {
                match range::row_range(row, &config.input_columns) {
                    Ok(Some(range)) => range.contains(value),
                    Ok(None) => false,
                    Err(reason) => {
                        skip(&mut skipped, index, reason);
                        false
                    }
                }
            }
            (MatchStrategy::Regex, _) => match cell_text(row, &config.input_columns[0]) {
                Some(pattern) => patterns.is_match(pattern, input).unwrap_or_else(|reason| {
                    skip(&mut skipped, index, reason);
                    false
                }),
                None => false,
            },
            (MatchStrategy::Fuzzy, _) => cell_text(row, &config.input_columns[0])
                .is_some_and(|text| text.to_lowercase().contains(&needle)),
            _ => cell_text(row, &config.input_columns[0])
                .is_some_and(|text| text.to_lowercase() == needle),
        };

        if hit {
            debug!(table = table.name(), row = index, strategy = %config.strategy, "matched");
            let values = config
                .output_columns
                .iter()
                .filter_map(|name| row.get(name).map(|v| (name.clone(), v.clone())))
                .collect();
            return Ok(Resolution {
                outcome: MatchOutcome::Matched { row: index, values },
                skipped,
            });
        }
    }

    let outcome = match &config.default_result {
        Some(value) => MatchOutcome::Default {
            value: value.clone(),
        },
        None => MatchOutcome::NoMatch,
    };
    Ok(Resolution { outcome, skipped })
}

/// Row patterns compiled so far in one scan, failures included.
struct Patterns {
    case_insensitive: bool,
    compiled: HashMap<String, Result<Regex, String>>,
}

impl Patterns {
    fn new(case_insensitive: bool) -> Self {
        Self {
            case_insensitive,
            compiled: HashMap::new(),
        }
    }

    fn is_match(&mut self, pattern: String, input: &str) -> Result<bool, String> {
        let case_insensitive = self.case_insensitive;
        let compiled = self.compiled.entry(pattern).or_insert_with_key(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(case_insensitive)
                .build()
                .map_err(|e| e.to_string())
        });
        match compiled {
            Ok(re) => Ok(re.is_match(input)),
            Err(reason) => Err(reason.clone()),
        }
    }
}

fn cell_text(row: &Row, column: &str) -> Option<String> {
    row.get(column).map(CellValue::to_string)
}

fn skip(skipped: &mut Vec<MatchError>, row: usize, reason: String) {
    warn!(row, %reason, "skipping lookup row");
    skipped.push(MatchError::SkippedRow { row, reason });
}
