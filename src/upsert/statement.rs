use std::collections::HashMap;

use crate::error::PgdbError;
use crate::schema::TableDef;
use crate::types::RowValues;

/// Build a multi-row `INSERT ... ON CONFLICT DO UPDATE` statement.
///
/// Every insert column defaults to its `EXCLUDED` (proposed-insert) value in
/// the conflict-update clause; `update_cols` entries replace that default
/// with a caller-supplied SQL expression, and override-only columns are
/// appended in sorted order. The conflict target is the table's primary key.
///
/// Returns the statement text and its `$n` parameters in row-major order.
///
/// # Errors
/// Returns `ExecutionError` when the table has no primary key, or
/// `ParameterError` when an insert column is not part of the table
/// definition or a row is missing a value for one.
pub fn build_upsert_statement(
    table: &TableDef,
    keys: &[String],
    rows: &[HashMap<String, RowValues>],
    update_cols: &HashMap<String, String>,
) -> Result<(String, Vec<RowValues>), PgdbError> {
    if table.primary_key.is_empty() {
        return Err(PgdbError::ExecutionError(format!(
            "table {} has no primary key to use as conflict target",
            table.name
        )));
    }
    if keys.is_empty() {
        return Err(PgdbError::ParameterError(
            "upsert requires at least one insert column".to_string(),
        ));
    }
    for key in keys {
        if !table.columns.iter().any(|col| col.name == *key) {
            return Err(PgdbError::ParameterError(format!(
                "column {key} is not part of table {}",
                table.name
            )));
        }
    }

    let mut params = Vec::with_capacity(rows.len() * keys.len());
    let mut value_groups = Vec::with_capacity(rows.len());
    for row in rows {
        let mut slots = Vec::with_capacity(keys.len());
        for key in keys {
            let value = row.get(key).cloned().ok_or_else(|| {
                PgdbError::ParameterError(format!("row is missing a value for column {key}"))
            })?;
            params.push(value);
            slots.push(format!("${}", params.len()));
        }
        value_groups.push(format!("({})", slots.join(", ")));
    }

    let mut set_clauses: Vec<String> = keys
        .iter()
        .map(|key| match update_cols.get(key) {
            Some(expr) => format!("{key} = {expr}"),
            None => format!("{key} = EXCLUDED.{key}"),
        })
        .collect();

    let mut extra: Vec<&String> = update_cols
        .keys()
        .filter(|col| !keys.contains(*col))
        .collect();
    extra.sort();
    for col in extra {
        set_clauses.push(format!("{col} = {}", update_cols[col]));
    }

    let statement = format!(
        "INSERT INTO {} ({}) VALUES {} ON CONFLICT ({}) DO UPDATE SET {}",
        table.name,
        keys.join(", "),
        value_groups.join(", "),
        table.primary_key.join(", "),
        set_clauses.join(", "),
    );

    Ok((statement, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDef;

    fn events_table() -> TableDef {
        TableDef {
            name: "events".to_string(),
            columns: vec![
                ColumnDef {
                    name: "id".to_string(),
                    data_type: "bigint".to_string(),
                },
                ColumnDef {
                    name: "name".to_string(),
                    data_type: "text".to_string(),
                },
            ],
            primary_key: vec!["id".to_string()],
        }
    }

    fn row(pairs: &[(&str, RowValues)]) -> HashMap<String, RowValues> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn two_rows_update_on_conflict() {
        let rows = vec![
            row(&[("name", RowValues::Text("a".to_string()))]),
            row(&[("name", RowValues::Text("b".to_string()))]),
        ];
        let (sql, params) = build_upsert_statement(
            &events_table(),
            &["name".to_string()],
            &rows,
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(
            sql,
            "INSERT INTO events (name) VALUES ($1), ($2) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn skip_column_never_reaches_set_clause() {
        // caller already filtered `id` out of the keys; the SET clause must
        // only carry the remaining columns
        let rows = vec![row(&[("name", RowValues::Text("a".to_string()))])];
        let (sql, _) = build_upsert_statement(
            &events_table(),
            &["name".to_string()],
            &rows,
            &HashMap::new(),
        )
        .unwrap();
        assert!(!sql.contains("id = "));
        assert!(sql.contains("ON CONFLICT (id)"));
    }

    #[test]
    fn overrides_replace_excluded_reference() {
        let rows = vec![row(&[("name", RowValues::Text("a".to_string()))])];
        let mut overrides = HashMap::new();
        overrides.insert("name".to_string(), "lower(EXCLUDED.name)".to_string());
        overrides.insert("updated_at".to_string(), "now()".to_string());

        let (sql, _) = build_upsert_statement(
            &events_table(),
            &["name".to_string()],
            &rows,
            &overrides,
        )
        .unwrap();

        assert!(sql.ends_with("DO UPDATE SET name = lower(EXCLUDED.name), updated_at = now()"));
    }

    #[test]
    fn missing_row_value_is_an_error() {
        let rows = vec![row(&[("other", RowValues::Int(1))])];
        let err = build_upsert_statement(
            &events_table(),
            &["name".to_string()],
            &rows,
            &HashMap::new(),
        )
        .unwrap_err();
        assert!(matches!(err, PgdbError::ParameterError(_)));
    }

    #[test]
    fn table_without_primary_key_is_an_error() {
        let mut table = events_table();
        table.primary_key.clear();
        let rows = vec![row(&[("name", RowValues::Text("a".to_string()))])];
        let err =
            build_upsert_statement(&table, &["name".to_string()], &rows, &HashMap::new())
                .unwrap_err();
        assert!(matches!(err, PgdbError::ExecutionError(_)));
    }

    #[test]
    fn parameters_bind_row_major() {
        let rows = vec![
            row(&[
                ("a", RowValues::Int(1)),
                ("b", RowValues::Int(2)),
            ]),
            row(&[
                ("a", RowValues::Int(3)),
                ("b", RowValues::Int(4)),
            ]),
        ];
        let table = TableDef {
            name: "t".to_string(),
            columns: vec![
                ColumnDef {
                    name: "a".to_string(),
                    data_type: "bigint".to_string(),
                },
                ColumnDef {
                    name: "b".to_string(),
                    data_type: "bigint".to_string(),
                },
            ],
            primary_key: vec!["a".to_string()],
        };
        let (sql, params) = build_upsert_statement(
            &table,
            &["a".to_string(), "b".to_string()],
            &rows,
            &HashMap::new(),
        )
        .unwrap();
        assert!(sql.contains("VALUES ($1, $2), ($3, $4)"));
        assert_eq!(
            params,
            vec![
                RowValues::Int(1),
                RowValues::Int(2),
                RowValues::Int(3),
                RowValues::Int(4),
            ]
        );
    }
}
