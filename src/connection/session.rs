use tokio_postgres::Client;

use crate::error::PgdbError;

/// Statement timeout applied to every statement on a normalized session.
pub const STATEMENT_TIMEOUT: &str = "10min";

/// Normalize a freshly opened session: clear any open transaction, apply the
/// read-only flag, and cap statement runtime.
///
/// The rollback runs on its own so the following `set` commands execute
/// outside any transaction block; rolling back with no transaction open only
/// draws a server warning.
///
/// # Errors
/// Returns errors from the session commands.
pub(crate) async fn normalize(client: &Client, readonly: bool) -> Result<(), PgdbError> {
    client.batch_execute("rollback").await?;

    let flag = if readonly { "on" } else { "off" };
    client
        .batch_execute(&format!("set default_transaction_read_only = {flag}"))
        .await?;

    client
        .batch_execute(&format!("set statement_timeout = '{STATEMENT_TIMEOUT}'"))
        .await?;

    Ok(())
}

/// Leave autocommit: open an explicit read-committed transaction.
pub(crate) async fn begin_explicit(client: &Client) -> Result<(), PgdbError> {
    client
        .batch_execute("begin transaction isolation level read committed")
        .await?;
    Ok(())
}

/// Return to autocommit: commit the explicit transaction.
pub(crate) async fn commit_explicit(client: &Client) -> Result<(), PgdbError> {
    client.batch_execute("commit").await?;
    Ok(())
}
