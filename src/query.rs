use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value;
use tokio_postgres::SimpleQueryMessage;

use crate::error::PgdbError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Extracts a `RowValues` from a `tokio_postgres` Row at the given index.
///
/// # Errors
/// Returns `PgdbError` if the column cannot be retrieved.
pub fn extract_value(row: &tokio_postgres::Row, idx: usize) -> Result<RowValues, PgdbError> {
    let type_info = row.columns()[idx].type_();

    match type_info.name() {
        "int2" => {
            let val: Option<i16> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))))
        }
        "int4" => {
            let val: Option<i32> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))))
        }
        "int8" => {
            let val: Option<i64> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Int))
        }
        "float4" | "float8" => {
            let val: Option<f64> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Float))
        }
        "bool" => {
            let val: Option<bool> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Bool))
        }
        "timestamp" | "timestamptz" => {
            let val: Option<NaiveDateTime> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Timestamp))
        }
        "json" | "jsonb" => {
            let val: Option<Value> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::JSON))
        }
        "bytea" => {
            let val: Option<Vec<u8>> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Blob))
        }
        // Everything else comes back as its text form
        _ => {
            let val: Option<String> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Text))
        }
    }
}

/// Build a result set from typed Postgres rows.
///
/// # Errors
/// Returns errors from row value extraction.
pub fn build_result_set(rows: &[tokio_postgres::Row]) -> Result<ResultSet, PgdbError> {
    let mut result_set = ResultSet::with_capacity(rows.len());
    if let Some(row) = rows.first() {
        let cols: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
        result_set.set_column_names(Arc::new(cols));
    }

    for row in rows {
        let col_count = row.columns().len();
        let mut row_values = Vec::with_capacity(col_count);
        for idx in 0..col_count {
            row_values.push(extract_value(row, idx)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Build a result set from simple-query protocol messages.
///
/// The simple protocol delivers every value as text, so all non-NULL cells
/// come back as `RowValues::Text`; the command tag supplies the affected-row
/// count when the statement returned no rows.
///
/// # Errors
/// Returns an error if the affected-row count does not fit in `usize`.
pub fn build_result_set_from_simple(
    messages: &[SimpleQueryMessage],
) -> Result<ResultSet, PgdbError> {
    let mut result_set = ResultSet::with_capacity(messages.len());
    let mut command_rows: Option<u64> = None;

    for message in messages {
        match message {
            SimpleQueryMessage::Row(row) => {
                if result_set.get_column_names().is_none() {
                    let cols: Vec<String> =
                        row.columns().iter().map(|c| c.name().to_string()).collect();
                    result_set.set_column_names(Arc::new(cols));
                }
                let mut row_values = Vec::with_capacity(row.len());
                for idx in 0..row.len() {
                    let value = row
                        .try_get(idx)?
                        .map_or(RowValues::Null, |v: &str| RowValues::Text(v.to_string()));
                    row_values.push(value);
                }
                result_set.add_row_values(row_values);
            }
            SimpleQueryMessage::CommandComplete(count) => {
                command_rows = Some(*count);
            }
            _ => {}
        }
    }

    if result_set.results.is_empty()
        && let Some(count) = command_rows
    {
        let count = usize::try_from(count).map_err(|e| {
            PgdbError::ExecutionError(format!("invalid rows affected count: {e}"))
        })?;
        result_set.set_rows_affected(count);
    }

    Ok(result_set)
}
