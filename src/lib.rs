//! Thin async convenience layer over `tokio-postgres`.
//!
//! Resolves connection parameters from environment variables or a JSON
//! config file, opens one non-pooled connection per handle with an
//! application-identifying session name, normalizes the session (read-only
//! flag, autocommit, statement timeout), and exposes a cursor that can run
//! statements through explicit server-side `PREPARE`/`EXECUTE` commands.
//! A separate loader adapts bulk tabular inserts into
//! `INSERT ... ON CONFLICT DO UPDATE` upserts.

pub mod config;
pub mod connection;
pub mod cursor;
pub mod error;
pub mod params;
pub mod query;
pub mod results;
pub mod schema;
pub mod types;
pub mod upsert;

pub mod prelude;

pub use config::{AccessMode, ConnectionConfig};
pub use connection::Database;
pub use cursor::{AsyncDatabaseExecutor, Cursor, PreparedCursor, StatementCache};
pub use error::{PgdbError, error_details};
pub use results::{CustomDbRow, ResultSet};
pub use schema::SchemaCatalog;
pub use types::RowValues;
pub use upsert::UpsertLoader;
