//! `LOOKUP_TABLE` record layout.
//!
//! Header: 1001 table name, 1040 column count, 1041 row count. The payload
//! holds one descriptor per column followed by the rows:
//!
//! ```text
//! column: name, type id, required, [has default, default text],
//!         [has property, type name, default?, min?, max?, pattern?,
//!          required, allowed count, allowed...]
//! row:    present cell count, (column index, canonical text)...
//! ```
//!
//! Decoding rebuilds the table through `add_column`/`add_row`, so a stored
//! table that breaks the row invariants is rejected rather than loaded.

use super::{ColumnDef, ColumnType, LookupTable, Row};
use crate::codec::{tags, Field, Fields, Payload, PayloadWriter, RecordKind};
use crate::error::{DecodeError, SchemaError};
use crate::records::DomainRecord;
use crate::validation::{CompiledProperty, ParameterProperty};

impl DomainRecord for LookupTable {
    const KIND: RecordKind = RecordKind::LookupTable;

    fn to_fields(&self) -> Vec<Field> {
        let mut out = PayloadWriter::new(vec![
            Field::new(tags::NAME, self.table_name.as_str()),
            Field::new(tags::FLAG_0, self.columns.len() as i64),
            Field::new(tags::FLAG_1, self.rows.len() as i64),
        ]);

        for column in &self.columns {
            out.push(column.name.as_str());
            out.push(column.column_type.id());
            out.push(i64::from(column.required));
            let default = column.default.as_ref().map(|v| v.to_string());
            out.push_opt(default.as_deref());
            match column.property() {
                Some(property) => {
                    out.push(1i64);
                    write_property(&mut out, property);
                }
                None => out.push(0i64),
            }
        }

        for row in &self.rows {
            let cells: Vec<_> = self
                .columns
                .iter()
                .enumerate()
                .filter_map(|(i, c)| row.get(&c.name).map(|v| (i, v)))
                .collect();
            out.push(cells.len() as i64);
            for (index, value) in cells {
                out.push(index as i64);
                out.push(value.to_string());
            }
        }

        out.into_fields()
    }

    fn from_fields(fields: &[Field]) -> Result<Self, DecodeError> {
        let f = Fields::new(Self::KIND, fields);
        let column_count = count(f.int(tags::FLAG_0)?, tags::FLAG_0)?;
        let row_count = count(f.int(tags::FLAG_1)?, tags::FLAG_1)?;
        let mut payload = f.payload();

        let mut table = LookupTable::new(f.opt_string(tags::NAME)?.unwrap_or_default());
        for _ in 0..column_count {
            let column = read_column(&mut payload)?;
            table.add_column(column).map_err(invalid)?;
        }

        for _ in 0..row_count {
            let cells = count(payload.next_int()?, tags::FLAG_1)?;
            let mut row = Row::new();
            for _ in 0..cells {
                let index = payload.next_int()?;
                let text = payload.next_string()?;
                let column = usize::try_from(index)
                    .ok()
                    .and_then(|i| table.columns.get(i))
                    .ok_or_else(|| DecodeError::InvalidValue {
                        tag: tags::FLAG_0,
                        reason: format!("cell refers to column {index}"),
                    })?;
                let value = parse_cell(column.column_type, text)?;
                row.insert(column.name.clone(), value);
            }
            table.add_row(row).map_err(invalid)?;
        }

        if payload.remaining() > 0 {
            return Err(DecodeError::InvalidValue {
                tag: tags::PAYLOAD,
                reason: format!("{} trailing payload entries", payload.remaining()),
            });
        }
        Ok(table)
    }
}

fn write_property(out: &mut PayloadWriter, property: &ParameterProperty) {
    out.push(property.type_name.as_str());
    out.push_opt(property.default.as_deref());
    out.push_opt(property.min.as_deref());
    out.push_opt(property.max.as_deref());
    out.push_opt(property.regex_pattern.as_deref());
    out.push(i64::from(property.required));
    out.push(property.allowed_values.len() as i64);
    for value in &property.allowed_values {
        out.push(value.as_str());
    }
}

fn read_column(payload: &mut Payload<'_>) -> Result<ColumnDef, DecodeError> {
    let name = payload.next_string()?.to_string();
    let type_id = payload.next_int()?;
    let column_type = ColumnType::from_id(type_id).ok_or_else(|| DecodeError::InvalidValue {
        tag: tags::PAYLOAD,
        reason: format!("unknown column type id {type_id}"),
    })?;
    let required = payload.next_int()? != 0;
    let default = payload
        .next_opt_string()?
        .map(|text| parse_cell(column_type, text))
        .transpose()?;

    let property = if payload.next_int()? != 0 {
        let mut property = ParameterProperty {
            name: name.clone(),
            type_name: payload.next_string()?.to_string(),
            default: payload.next_opt_string()?.map(str::to_string),
            min: payload.next_opt_string()?.map(str::to_string),
            max: payload.next_opt_string()?.map(str::to_string),
            regex_pattern: payload.next_opt_string()?.map(str::to_string),
            required: payload.next_int()? != 0,
            ..Default::default()
        };
        let allowed = count(payload.next_int()?, tags::PAYLOAD)?;
        for _ in 0..allowed {
            property
                .allowed_values
                .push(payload.next_string()?.to_string());
        }
        Some(property)
    } else {
        None
    };

    Ok(ColumnDef {
        name,
        column_type,
        required,
        default,
        property: property.map(CompiledProperty::new),
    })
}

fn parse_cell(column_type: ColumnType, text: &str) -> Result<super::CellValue, DecodeError> {
    column_type
        .parse_value(text)
        .ok_or_else(|| DecodeError::InvalidValue {
            tag: tags::PAYLOAD,
            reason: format!("'{text}' is not a valid {column_type}"),
        })
}

fn count(value: i64, tag: i32) -> Result<usize, DecodeError> {
    usize::try_from(value).map_err(|_| DecodeError::InvalidValue {
        tag,
        reason: format!("negative count {value}"),
    })
}

fn invalid(err: SchemaError) -> DecodeError {
    DecodeError::InvalidValue {
        tag: tags::PAYLOAD,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{row, CellValue};
    use chrono::{TimeZone, Utc};

    fn sample() -> LookupTable {
        let mut table = LookupTable::new("Beams");
        table
            .add_column(ColumnDef::new("Input", ColumnType::Text).required())
            .unwrap();
        table
            .add_column(ColumnDef::new("Width", ColumnType::Number).with_default(100.0))
            .unwrap();
        table
            .add_column(ColumnDef::new("Stock", ColumnType::Boolean))
            .unwrap();
        table
            .add_column(ColumnDef::new("Updated", ColumnType::DateTime))
            .unwrap();
        table
            .insert_column(
                &ParameterProperty::new("Grade", ColumnType::Text)
                    .with_allowed_values(["S235", "S355"]),
            )
            .unwrap();

        let when = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        table
            .add_row(row([
                ("Input", CellValue::from("Steel, \"HEA\"")),
                ("Stock", CellValue::Boolean(true)),
                ("Updated", CellValue::DateTime(when)),
                ("Grade", CellValue::from("S355")),
            ]))
            .unwrap();
        table
            .add_row(row([("Input", CellValue::from("")), ("Width", 0.25.into())]))
            .unwrap();
        table
    }

    #[test]
    fn table_round_trips_through_record() {
        let table = sample();
        let decoded = LookupTable::decode(&table.encode()).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn header_counts_columns_and_rows() {
        let fields = sample().to_fields();
        let f = Fields::new(RecordKind::LookupTable, &fields);
        assert_eq!(f.string(tags::NAME), Ok("Beams"));
        assert_eq!(f.int(tags::FLAG_0), Ok(5));
        assert_eq!(f.int(tags::FLAG_1), Ok(2));
    }

    #[test]
    fn empty_table_round_trips() {
        let table = LookupTable::new("Empty");
        assert_eq!(LookupTable::decode(&table.encode()).unwrap(), table);
    }

    #[test]
    fn row_breaking_invariants_is_rejected() {
        // One required text column, one row with no cells.
        let fields = vec![
            Field::new(tags::FLAG_0, 1i64),
            Field::new(tags::FLAG_1, 1i64),
            Field::new(tags::payload(0), "Input"),
            Field::new(tags::payload(1), 0i64),
            Field::new(tags::payload(2), 1i64),
            Field::new(tags::payload(3), 0i64),
            Field::new(tags::payload(4), 0i64),
            Field::new(tags::payload(5), 0i64),
        ];
        let err = LookupTable::from_fields(&fields).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidValue { .. }));
    }

    #[test]
    fn truncated_payload_is_missing_field() {
        let mut fields = sample().to_fields();
        fields.pop();
        assert!(matches!(
            LookupTable::from_fields(&fields),
            Err(DecodeError::MissingField { .. })
        ));
    }
}
