/// Per-column decode dispatch
///
/// Each `ColumnType` knows which `ScanRow` getter to call and how to wrap
/// the result. Non-nullable types treat SQL NULL as a scan failure.
use crate::connection::ScanRow;
use crate::core::{ColumnType, DriverError, MapperError, Record, Result, Value};

impl ColumnType {
    pub fn decode<R: ScanRow>(self, row: &R, idx: usize) -> std::result::Result<Value, DriverError> {
        let value = match self {
            Self::String => Value::String(not_null(row.text(idx)?)?),
            Self::NullableString => Value::NullableString(row.text(idx)?),
            Self::Int64 => Value::Int64(not_null(row.int(idx)?)?),
            Self::NullableInt64 => Value::NullableInt64(row.int(idx)?),
            Self::Bool => Value::Bool(not_null(row.boolean(idx)?)?),
            Self::NullableBool => Value::NullableBool(row.boolean(idx)?),
            Self::Timestamp => Value::Timestamp(not_null(row.timestamp(idx)?)?),
            Self::NullableTimestamp => Value::NullableTimestamp(row.timestamp(idx)?),
        };
        Ok(value)
    }
}

fn not_null<T>(value: Option<T>) -> std::result::Result<T, DriverError> {
    value.ok_or_else(|| "unexpected NULL in non-nullable column".into())
}

/// Decode one row into a record. `fields` and `types` are parallel and in
/// select-list order; `row_idx` is only used for error reporting.
pub fn decode_row<R: ScanRow>(
    row: &R,
    row_idx: usize,
    fields: &[String],
    types: &[ColumnType],
) -> Result<Record> {
    if row.width() != fields.len() {
        return Err(MapperError::RowScan {
            row: row_idx,
            field: fields.join(", "),
            message: format!(
                "row has {} column(s), select list has {}",
                row.width(),
                fields.len()
            ),
        });
    }

    let mut record = Record::with_capacity(fields.len());
    for (idx, (field, ty)) in fields.iter().zip(types).enumerate() {
        let value = ty.decode(row, idx).map_err(|e| MapperError::RowScan {
            row: row_idx,
            field: field.clone(),
            message: e.to_string(),
        })?;
        record.insert(field.as_str(), value);
    }
    Ok(record)
}
