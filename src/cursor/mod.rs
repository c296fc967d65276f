// Cursor layer.
//
// `Cursor` is the base capability over one exclusively-owned client;
// `PreparedCursor` wraps it and adds the server-side prepared-statement
// cache. Composition, not inheritance: the wrapper owns the base and
// delegates the plain execution surface to it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_postgres::Client;

use crate::error::PgdbError;
use crate::params::Params;
use crate::query::build_result_set;
use crate::results::ResultSet;
use crate::types::RowValues;

mod literal;
mod prepared;
mod rewrite;

pub use prepared::{PreparedCursor, PreparedExec, StatementCache, exec_command, prepare_command};
pub use rewrite::rewrite_placeholders;

/// The plain execution surface shared by the base cursor and the
/// prepared-statement wrapper.
#[async_trait]
pub trait AsyncDatabaseExecutor {
    /// Executes a batch of SQL statements (can be a mix of reads/writes). No
    /// parameters are supported.
    async fn execute_batch(&mut self, query: &str) -> Result<(), PgdbError>;

    /// Executes a single SELECT statement and returns the result set.
    async fn execute_select(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, PgdbError>;

    /// Executes a single DML statement (INSERT, UPDATE, DELETE, etc.) and
    /// returns the number of rows affected.
    async fn execute_dml(&mut self, query: &str, params: &[RowValues]) -> Result<usize, PgdbError>;
}

/// Base cursor over one exclusively-owned connection.
#[derive(Clone)]
pub struct Cursor {
    client: Arc<Client>,
}

impl Cursor {
    pub(crate) fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Access the underlying client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) async fn batch(&self, query: &str) -> Result<(), PgdbError> {
        self.client.batch_execute(query).await?;
        Ok(())
    }

    pub(crate) async fn select(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, PgdbError> {
        let converted = Params::convert(params)?;
        let rows = self.client.query(query, converted.as_refs()).await?;
        build_result_set(&rows)
    }

    pub(crate) async fn dml(&self, query: &str, params: &[RowValues]) -> Result<usize, PgdbError> {
        let converted = Params::convert(params)?;
        let rows = self.client.execute(query, converted.as_refs()).await?;
        usize::try_from(rows)
            .map_err(|e| PgdbError::ExecutionError(format!("invalid rows affected count: {e}")))
    }
}

#[async_trait]
impl AsyncDatabaseExecutor for Cursor {
    async fn execute_batch(&mut self, query: &str) -> Result<(), PgdbError> {
        self.batch(query).await
    }

    async fn execute_select(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, PgdbError> {
        self.select(query, params).await
    }

    async fn execute_dml(&mut self, query: &str, params: &[RowValues]) -> Result<usize, PgdbError> {
        self.dml(query, params).await
    }
}
