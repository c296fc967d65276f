use std::collections::HashMap;

use async_trait::async_trait;

use super::literal::render_literal;
use super::rewrite::rewrite_placeholders;
use super::{AsyncDatabaseExecutor, Cursor};
use crate::error::PgdbError;
use crate::query::build_result_set_from_simple;
use crate::results::ResultSet;
use crate::types::RowValues;

/// One cached server-side prepared statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedExec {
    /// Statement name on the server, e.g. `ps_3`
    pub statement: String,
    /// The generated execute command, e.g. `execute ps_3($1, $2)`
    pub exec_cmd: String,
    /// Number of argument slots
    pub arity: usize,
}

/// Cache mapping raw SQL text to its prepared execute command.
///
/// Scoped to one cursor: identifiers are unique per cursor instance and
/// assigned in first-seen order starting at 1. Grows monotonically, never
/// evicted; call sites are expected to use a small fixed set of statement
/// texts.
#[derive(Debug, Clone, Default)]
pub struct StatementCache {
    entries: HashMap<String, PreparedExec>,
}

impl StatementCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up by the *original* SQL text, never the rewritten form.
    #[must_use]
    pub fn get(&self, sql: &str) -> Option<&PreparedExec> {
        self.entries.get(sql)
    }

    /// Identifier for the next statement: `ps_<n+1>` where n is the current
    /// cache size.
    #[must_use]
    pub fn next_statement_id(&self) -> String {
        format!("ps_{}", self.entries.len() + 1)
    }

    pub fn insert(&mut self, sql: String, prepared: PreparedExec) {
        self.entries.insert(sql, prepared);
    }

    /// Number of distinct SQL texts prepared so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the `PREPARE` declaration for a rewritten statement.
#[must_use]
pub fn prepare_command(id: &str, rewritten_sql: &str) -> String {
    format!("prepare {id} as {rewritten_sql}")
}

/// Build the `EXECUTE` command for a statement with `arity` argument slots;
/// no slot list when there are no arguments.
#[must_use]
pub fn exec_command(id: &str, arity: usize) -> String {
    if arity == 0 {
        format!("execute {id}")
    } else {
        let slots: Vec<String> = (1..=arity).map(|n| format!("${n}")).collect();
        format!("execute {id}({})", slots.join(", "))
    }
}

fn render_exec(entry: &PreparedExec, args: &[RowValues]) -> Result<String, PgdbError> {
    if args.len() != entry.arity {
        return Err(PgdbError::ParameterError(format!(
            "statement {} expects {} arguments, got {}",
            entry.statement,
            entry.arity,
            args.len()
        )));
    }
    if entry.arity == 0 {
        return Ok(entry.exec_cmd.clone());
    }
    let literals: Vec<String> = args.iter().map(render_literal).collect();
    Ok(format!("execute {}({})", entry.statement, literals.join(", ")))
}

/// Cursor wrapper adding explicit server-side prepared statements.
///
/// Each distinct SQL text is declared once via `PREPARE` and re-run via
/// `EXECUTE`; both the cache and the server-side statements live for the
/// connection's lifetime.
pub struct PreparedCursor {
    cursor: Cursor,
    cache: StatementCache,
}

impl PreparedCursor {
    #[must_use]
    pub fn new(cursor: Cursor) -> Self {
        Self {
            cursor,
            cache: StatementCache::new(),
        }
    }

    /// Access the wrapped base cursor.
    #[must_use]
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Inspect the prepared-statement cache.
    #[must_use]
    pub fn cache(&self) -> &StatementCache {
        &self.cache
    }

    /// Translate a SQL command into its prepared form and declare it on the
    /// server under `id`; returns the generated execute command.
    ///
    /// # Errors
    /// Returns errors from the `PREPARE` declaration.
    pub async fn prepare(&self, sql: &str, id: &str) -> Result<PreparedExec, PgdbError> {
        let (rewritten, specifiers) = rewrite_placeholders(sql);
        self.cursor.batch(&prepare_command(id, &rewritten)).await?;

        Ok(PreparedExec {
            statement: id.to_string(),
            exec_cmd: exec_command(id, specifiers.len()),
            arity: specifiers.len(),
        })
    }

    /// Execute a command through its server-side prepared statement,
    /// declaring it first if this text has not been seen on this cursor.
    ///
    /// Argument values are rendered as SQL literals into the execute
    /// command, so result rows arrive over the simple-query protocol as
    /// text values.
    ///
    /// # Errors
    /// Returns errors from preparation, argument rendering, or execution.
    pub async fn exec_prepared(
        &mut self,
        sql: &str,
        args: &[RowValues],
    ) -> Result<ResultSet, PgdbError> {
        let entry = match self.cache.get(sql) {
            Some(entry) => entry.clone(),
            None => {
                let id = self.cache.next_statement_id();
                let entry = self.prepare(sql, &id).await?;
                self.cache.insert(sql.to_string(), entry.clone());
                entry
            }
        };

        let command = render_exec(&entry, args)?;
        let messages = self.cursor.client().simple_query(&command).await?;
        build_result_set_from_simple(&messages)
    }

    /// Prepared-statement version of `executemany`: one `exec_prepared` per
    /// argument list, in order. Returns the summed affected-row count.
    ///
    /// # Errors
    /// Returns the first execution error encountered.
    pub async fn exec_many_prepared(
        &mut self,
        sql: &str,
        seq_of_args: &[Vec<RowValues>],
    ) -> Result<usize, PgdbError> {
        let mut affected = 0;
        for args in seq_of_args {
            let result = self.exec_prepared(sql, args).await?;
            affected += result.rows_affected;
        }
        Ok(affected)
    }
}

#[async_trait]
impl AsyncDatabaseExecutor for PreparedCursor {
    async fn execute_batch(&mut self, query: &str) -> Result<(), PgdbError> {
        self.cursor.batch(query).await
    }

    async fn execute_select(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, PgdbError> {
        self.cursor.select(query, params).await
    }

    async fn execute_dml(&mut self, query: &str, params: &[RowValues]) -> Result<usize, PgdbError> {
        self.cursor.dml(query, params).await
    }
}
