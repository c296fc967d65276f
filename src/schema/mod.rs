// Eager schema reflection.
//
// The catalog is loaded once, right after connecting, and later consulted by
// name when the upsert loader needs a table definition.

use std::collections::HashMap;

use tokio_postgres::Client;

use crate::error::PgdbError;

/// A reflected table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Formatted SQL type, e.g. `bigint` or `character varying(32)`
    pub data_type: String,
}

/// A reflected table or view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDef {
    /// Relation name
    pub name: String,
    /// Columns in ordinal order
    pub columns: Vec<ColumnDef>,
    /// Primary-key column names, in key order (empty for views)
    pub primary_key: Vec<String>,
}

impl TableDef {
    /// Remove the named columns from this definition. Idempotent: names
    /// without a matching column are simply not found and skipped.
    pub fn remove_columns(&mut self, names: &[String]) {
        self.columns.retain(|col| !names.contains(&col.name));
    }

    /// Column names in ordinal order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// In-memory catalog of every user table and view, keyed by relation name.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    tables: HashMap<String, TableDef>,
}

impl SchemaCatalog {
    /// Reflect all user tables, views, and their primary keys.
    ///
    /// # Errors
    /// Returns errors from the catalog queries.
    pub async fn reflect(client: &Client) -> Result<Self, PgdbError> {
        let column_rows = client
            .query(
                "SELECT c.relname, a.attname, format_type(a.atttypid, a.atttypmod) \
                 FROM pg_class c \
                 JOIN pg_namespace n ON n.oid = c.relnamespace \
                 JOIN pg_attribute a ON a.attrelid = c.oid \
                 WHERE c.relkind IN ('r','v','m') \
                   AND n.nspname NOT LIKE 'pg_%' \
                   AND n.nspname != 'information_schema' \
                   AND a.attnum > 0 AND NOT a.attisdropped \
                 ORDER BY c.relname, a.attnum",
                &[],
            )
            .await?;

        let mut tables: HashMap<String, TableDef> = HashMap::new();
        for row in &column_rows {
            let table: String = row.get(0);
            let column: String = row.get(1);
            let data_type: String = row.get(2);
            let entry = tables.entry(table.clone()).or_insert_with(|| TableDef {
                name: table,
                ..TableDef::default()
            });
            entry.columns.push(ColumnDef {
                name: column,
                data_type,
            });
        }

        let pk_rows = client
            .query(
                "SELECT c.relname, a.attname \
                 FROM pg_constraint con \
                 JOIN pg_class c ON c.oid = con.conrelid \
                 JOIN pg_namespace n ON n.oid = c.relnamespace \
                 JOIN LATERAL unnest(con.conkey) WITH ORDINALITY AS u(attnum, ord) ON true \
                 JOIN pg_attribute a ON a.attrelid = c.oid AND a.attnum = u.attnum \
                 WHERE con.contype = 'p' \
                   AND n.nspname NOT LIKE 'pg_%' \
                   AND n.nspname != 'information_schema' \
                 ORDER BY c.relname, u.ord",
                &[],
            )
            .await?;

        for row in &pk_rows {
            let table: String = row.get(0);
            let column: String = row.get(1);
            if let Some(def) = tables.get_mut(&table) {
                def.primary_key.push(column);
            }
        }

        Ok(SchemaCatalog { tables })
    }

    /// Look up a table definition by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(name)
    }

    /// Number of reflected relations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Build a catalog from already-known definitions (mainly for tests and
    /// offline statement building).
    #[must_use]
    pub fn from_tables(defs: Vec<TableDef>) -> Self {
        SchemaCatalog {
            tables: defs.into_iter().map(|d| (d.name.clone(), d)).collect(),
        }
    }
}
