use crate::table::{parse_number, CellValue, Row};

/// Inclusive numeric interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Parse `min..max`, `min-max` or a single number (a one-point range).
pub fn parse_range(text: &str) -> Option<NumericRange> {
    let text = text.trim();
    if let Some(value) = parse_number(text) {
        return Some(NumericRange {
            min: value,
            max: value,
        });
    }
    let (min, max) = match text.split_once("..") {
        Some(bounds) => bounds,
        None => text.split_at(range_dash(text)?),
    };
    let max = max.strip_prefix('-').unwrap_or(max);
    let range = NumericRange {
        min: parse_number(min)?,
        max: parse_number(max)?,
    };
    (range.min <= range.max).then_some(range)
}

/// Byte offset of the dash separating two bounds. A leading sign and the
/// sign of an exponent belong to their number.
fn range_dash(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    (1..bytes.len()).find(|&i| bytes[i] == b'-' && !matches!(bytes[i - 1], b'e' | b'E'))
}

/// The range a row declares in `columns` (one encoded cell, or `min` and
/// `max` cells). `Ok(None)` for a row with blank range cells, `Err` with a
/// reason when the cells do not form a range.
pub(super) fn row_range(row: &Row, columns: &[String]) -> Result<Option<NumericRange>, String> {
    match columns {
        [single] => match row.get(single) {
            None => Ok(None),
            Some(CellValue::Number(v)) => Ok(Some(NumericRange { min: *v, max: *v })),
            Some(cell) => {
                let text = cell.to_string();
                parse_range(&text)
                    .map(Some)
                    .ok_or_else(|| format!("'{text}' is not a range"))
            }
        },
        [min, max] => {
            let (Some(lo), Some(hi)) = (row.get(min), row.get(max)) else {
                return Ok(None);
            };
            let bound = |cell: &CellValue| {
                cell.to_number()
                    .ok_or_else(|| format!("'{cell}' is not a number"))
            };
            let range = NumericRange {
                min: bound(lo)?,
                max: bound(hi)?,
            };
            if range.min > range.max {
                return Err(format!("min {} is greater than max {}", range.min, range.max));
            }
            Ok(Some(range))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_spelling() {
        assert_eq!(
            parse_range("1..5"),
            Some(NumericRange { min: 1.0, max: 5.0 })
        );
        assert_eq!(
            parse_range(" 1.5 - 3 "),
            Some(NumericRange { min: 1.5, max: 3.0 })
        );
        assert_eq!(
            parse_range("-10--2"),
            Some(NumericRange {
                min: -10.0,
                max: -2.0
            })
        );
        assert_eq!(
            parse_range("-4"),
            Some(NumericRange {
                min: -4.0,
                max: -4.0
            })
        );
    }

    #[test]
    fn exponents_are_numbers_not_separators() {
        assert_eq!(
            parse_range("1e-5"),
            Some(NumericRange { min: 1e-5, max: 1e-5 })
        );
        assert_eq!(
            parse_range("-3"),
            Some(NumericRange { min: -3.0, max: -3.0 })
        );
        assert_eq!(
            parse_range("1e-5-2E-3"),
            Some(NumericRange { min: 1e-5, max: 2e-3 })
        );
        assert_eq!(
            parse_range("-2--1"),
            Some(NumericRange { min: -2.0, max: -1.0 })
        );
    }

    #[test]
    fn rejects_garbage_and_inverted() {
        assert_eq!(parse_range("a..b"), None);
        assert_eq!(parse_range("9..1"), None);
        assert_eq!(parse_range(""), None);
    }

    #[test]
    fn bounds_are_inclusive() {
        let range = NumericRange { min: 0.0, max: 1.0 };
        assert!(range.contains(0.0));
        assert!(range.contains(1.0));
        assert!(!range.contains(1.01));
    }
}
