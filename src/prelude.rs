//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{AccessMode, ConnectionConfig, application_name, mode_env_var};
pub use crate::connection::Database;
pub use crate::cursor::{
    AsyncDatabaseExecutor, Cursor, PreparedCursor, PreparedExec, StatementCache, exec_command,
    prepare_command, rewrite_placeholders,
};
pub use crate::error::{PgdbError, error_details};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::schema::{ColumnDef, SchemaCatalog, TableDef};
pub use crate::types::RowValues;
pub use crate::upsert::{UpsertLoader, build_upsert_statement};
