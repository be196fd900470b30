//! Terminal output.
//!
//! Every function here returns a `String` so output can be tested without a
//! terminal. `console` drops the styling when stdout is not a tty.

use console::{measure_text_width, pad_str, Alignment, Style};
use dynblock::config::DynBlockConfig;
use dynblock::error::{DynBlockError, Result};
use dynblock::matching::{MatchOutcome, Resolution};
use dynblock::table::LookupTable;
use dynblock::validation::ValidationResult;
use serde::Serialize;
use std::fmt::Write;

struct Styles {
    header: Style,
    muted: Style,
    success: Style,
    warning: Style,
    error: Style,
}

fn styles() -> Styles {
    Styles {
        header: Style::new().bold(),
        muted: Style::new().dim(),
        success: Style::new().green(),
        warning: Style::new().yellow().bold(),
        error: Style::new().red().bold(),
    }
}

pub fn json<T: Serialize>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    text.push('\n');
    Ok(text)
}

pub fn table(table: &LookupTable) -> String {
    let s = styles();
    let names: Vec<&str> = table.column_names().collect();
    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| {
            names
                .iter()
                .map(|name| row.get(*name).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| measure_text_width(&row[i]))
                .chain([measure_text_width(name)])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header = names.iter().map(|name| name.to_string()).collect::<Vec<_>>();
    let _ = writeln!(out, "{}", s.header.apply_to(aligned(&header, &widths)));
    for row in &cells {
        let _ = writeln!(out, "{}", aligned(row, &widths));
    }
    let _ = writeln!(
        out,
        "{}",
        s.muted.apply_to(format!("{} rows", table.len()))
    );
    out
}

fn aligned(cells: &[String], widths: &[usize]) -> String {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| pad_str(cell, *w, Alignment::Left, None).into_owned())
        .collect();
    line.join("  ").trim_end().to_string()
}

/// Groups as 1-based data row numbers.
pub fn duplicates(groups: &[Vec<usize>]) -> String {
    let s = styles();
    if groups.is_empty() {
        return format!("{}\n", s.success.apply_to("No duplicate rows"));
    }
    let mut out = String::new();
    for group in groups {
        let rows: Vec<String> = group.iter().map(|i| (i + 1).to_string()).collect();
        let _ = writeln!(out, "rows {}", rows.join(", "));
    }
    let _ = writeln!(
        out,
        "{}",
        s.warning
            .apply_to(format!("{} duplicate groups", groups.len()))
    );
    out
}

pub fn removed(count: usize) -> String {
    let s = styles();
    match count {
        0 => format!("{}\n", s.success.apply_to("No duplicate rows")),
        1 => format!("{}\n", s.warning.apply_to("Removed 1 duplicate row")),
        n => format!("{}\n", s.warning.apply_to(format!("Removed {n} duplicate rows"))),
    }
}

pub fn resolution(resolution: &Resolution) -> String {
    let s = styles();
    match &resolution.outcome {
        MatchOutcome::Matched { values, .. } => {
            let mut out = String::new();
            for (column, value) in values {
                let _ = writeln!(out, "{column} = {value}");
            }
            out
        }
        MatchOutcome::Default { value } => {
            format!("{} {}\n", value, s.muted.apply_to("(default)"))
        }
        MatchOutcome::NoMatch => format!("{}\n", s.muted.apply_to("No match")),
    }
}

pub fn validation(subject: &str, result: &ValidationResult) -> String {
    let s = styles();
    if result.is_valid {
        return format!("{}\n", s.success.apply_to(format!("{subject} is valid")));
    }
    let mut out = format!("{}\n", s.error.apply_to(format!("{subject} is invalid")));
    for error in &result.errors {
        let _ = writeln!(out, "  - {error}");
    }
    out
}

pub fn config(config: &DynBlockConfig) -> Result<String> {
    let value = toml::Value::try_from(config).map_err(|e| DynBlockError::Config(e.to_string()))?;
    let mut out = String::new();
    if let toml::Value::Table(table) = value {
        for (key, value) in &table {
            let _ = writeln!(out, "{key} = {value}");
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynblock::error::MatchError;
    use dynblock::table::{CellValue, ColumnDef, ColumnType};

    #[test]
    fn table_columns_are_aligned() {
        let mut t = LookupTable::new("T");
        t.add_column(ColumnDef::new("Input", ColumnType::Text)).unwrap();
        t.add_column(ColumnDef::new("W", ColumnType::Number)).unwrap();
        t.add_text_row([("Input", "Steel"), ("W", "100")]).unwrap();
        t.add_text_row([("Input", "Oak")]).unwrap();

        let text = console::strip_ansi_codes(&table(&t)).into_owned();
        assert_eq!(text, "Input  W\nSteel  100\nOak\n2 rows\n");
    }

    #[test]
    fn duplicate_rows_are_one_based() {
        let text = console::strip_ansi_codes(&duplicates(&[vec![0, 2]])).into_owned();
        assert!(text.starts_with("rows 1, 3\n"));
    }

    #[test]
    fn resolution_lists_output_values() {
        let resolution = Resolution {
            outcome: MatchOutcome::Matched {
                row: 1,
                values: vec![("Profile".into(), CellValue::from("HEA 200"))],
            },
            skipped: vec![MatchError::SkippedRow {
                row: 0,
                reason: "bad range".into(),
            }],
        };
        assert_eq!(super::resolution(&resolution), "Profile = HEA 200\n");
    }

    #[test]
    fn config_prints_every_key() {
        let text = config(&DynBlockConfig::default()).unwrap();
        assert!(text.contains("identity_column = \"ID\""));
        assert!(text.contains("default_strategy = \"exact\""));
    }
}
