// Upsert adapter.
//
// A loader is configured once (catalog, overrides, skip-columns) and then
// reused across every batch handed to it, the shape a bulk-table-load
// routine expects from its insertion callback.

use std::collections::HashMap;

use tokio_postgres::Client;

use crate::error::PgdbError;
use crate::params::Params;
use crate::schema::SchemaCatalog;
use crate::types::RowValues;

mod statement;

pub use statement::build_upsert_statement;

/// Batch upsert callback over a reflected schema catalog.
///
/// Skip-columns (typically serial primary keys the server manages) are
/// removed from the table definition and from every row before the
/// statement is built; they never appear in the conflict-update clause, and
/// any override naming one is discarded at construction.
pub struct UpsertLoader {
    catalog: SchemaCatalog,
    update_cols: HashMap<String, String>,
    skip_cols: Vec<String>,
}

impl UpsertLoader {
    /// Create a loader. `update_cols` maps column names to raw SQL
    /// expressions used in place of the default `EXCLUDED` reference (e.g.
    /// `ins_ts -> now()`); `skip_cols` names columns stripped from both the
    /// table definition and the incoming rows.
    #[must_use]
    pub fn new(
        catalog: SchemaCatalog,
        update_cols: HashMap<String, String>,
        skip_cols: Vec<String>,
    ) -> Self {
        let mut update_cols = update_cols;
        update_cols.retain(|col, _| !skip_cols.contains(col));
        Self {
            catalog,
            update_cols,
            skip_cols,
        }
    }

    /// Upsert one batch of rows into `table_name`.
    ///
    /// `keys` names the columns of each incoming row, in order; `rows`
    /// yields one value list per row. Returns the affected-row count.
    ///
    /// # Errors
    /// Returns `ExecutionError` for an unknown table name or a table
    /// without a primary key, `ParameterError` when a row does not line up
    /// with `keys` or is missing a skip-column, and driver errors from the
    /// execution itself.
    pub async fn load_batch<I>(
        &self,
        table_name: &str,
        client: &Client,
        keys: &[String],
        rows: I,
    ) -> Result<usize, PgdbError>
    where
        I: IntoIterator<Item = Vec<RowValues>>,
    {
        let table = self.catalog.table(table_name).ok_or_else(|| {
            PgdbError::ExecutionError(format!("unknown table {table_name} in schema catalog"))
        })?;
        let mut table = table.clone();
        table.remove_columns(&self.skip_cols);

        let mut dict_rows = Vec::new();
        for values in rows {
            if values.len() != keys.len() {
                return Err(PgdbError::ParameterError(format!(
                    "row has {} values for {} columns",
                    values.len(),
                    keys.len()
                )));
            }
            let row: HashMap<String, RowValues> =
                keys.iter().cloned().zip(values).collect();
            dict_rows.push(row);
        }
        if dict_rows.is_empty() {
            return Ok(0);
        }

        // Strict removal: a skip-column absent from a row is an error.
        for row in &mut dict_rows {
            for col in &self.skip_cols {
                row.remove(col).ok_or_else(|| {
                    PgdbError::ParameterError(format!("row is missing skip-column {col}"))
                })?;
            }
        }

        let insert_keys: Vec<String> = keys
            .iter()
            .filter(|key| !self.skip_cols.contains(*key))
            .cloned()
            .collect();

        let (sql, params) =
            build_upsert_statement(&table, &insert_keys, &dict_rows, &self.update_cols)?;

        let converted = Params::convert(&params)?;
        let affected = client.execute(&sql, converted.as_refs()).await?;
        usize::try_from(affected)
            .map_err(|e| PgdbError::ExecutionError(format!("invalid rows affected count: {e}")))
    }
}
