// Connection manager.
//
// One `Database` owns exactly one connection; there is no pooling or reuse
// across handles. A failed connection attempt is captured in the handle
// rather than raised, so construction against an unreachable host still
// yields a handle whose accessors return `None`.

use std::sync::Arc;
use std::time::Duration;

use tokio_postgres::{Client, NoTls};

use crate::config::{AccessMode, ConnectionConfig};
use crate::cursor::{Cursor, PreparedCursor};
use crate::error::PgdbError;
use crate::schema::SchemaCatalog;

mod session;

/// The live half of a handle: present only while the connection is up.
struct Live {
    client: Arc<Client>,
    cursor: PreparedCursor,
    catalog: SchemaCatalog,
    driver: tokio::task::JoinHandle<()>,
}

/// Handle owning one database connection, its cursor, and the reflected
/// schema catalog.
pub struct Database {
    state: Result<Live, PgdbError>,
    config: ConnectionConfig,
    readonly: bool,
    autocommit: bool,
}

impl Database {
    /// Resolve configuration for `mode` and open a connection.
    ///
    /// Connection-establishment failures (network, auth, timeout) do not
    /// propagate: the returned handle reports `available() == false` and
    /// keeps the failure in [`Database::connect_error`]. Configuration
    /// resolution failures (missing or malformed config file) do return
    /// `Err`.
    ///
    /// # Errors
    /// Returns `ConfigError` from parameter resolution only.
    pub async fn connect(mode: &str, config_file: &str) -> Result<Database, PgdbError> {
        let access = AccessMode::from_mode_str(mode);
        let config = ConnectionConfig::resolve(mode, config_file)?;
        Ok(Self::connect_with_config(config, access).await)
    }

    /// Connect with the default config file name, `pgdb.json`.
    ///
    /// # Errors
    /// Same contract as [`Database::connect`].
    pub async fn connect_default(mode: &str) -> Result<Database, PgdbError> {
        Self::connect(mode, "pgdb.json").await
    }

    /// Open a handle from already-resolved parameters, bypassing
    /// environment and file lookup. Connection-establishment failures are
    /// captured in the handle, never raised.
    pub async fn connect_with_config(config: ConnectionConfig, access: AccessMode) -> Database {
        let readonly = access.is_readonly();
        let state = match Self::open(&config, readonly).await {
            Ok(live) => Ok(live),
            Err(e) => {
                tracing::warn!("connection unavailable: {e}");
                Err(e)
            }
        };

        Database {
            state,
            config,
            readonly,
            autocommit: true,
        }
    }

    async fn open(config: &ConnectionConfig, readonly: bool) -> Result<Live, PgdbError> {
        let mut pg_config = tokio_postgres::Config::new();
        if let Some(host) = &config.host {
            pg_config.host(host);
        }
        if let Some(port) = config.port {
            pg_config.port(port);
        }
        if let Some(database) = &config.database {
            pg_config.dbname(database);
        }
        if let Some(user) = &config.user {
            pg_config.user(user);
        }
        if let Some(password) = &config.password {
            pg_config.password(password);
        }
        pg_config.application_name(&config.application_name);
        pg_config.connect_timeout(Duration::from_secs(10));

        let (client, connection) = pg_config.connect(NoTls).await?;
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!("connection task ended: {e}");
            }
        });
        let client = Arc::new(client);

        let catalog = SchemaCatalog::reflect(&client).await?;
        session::normalize(&client, readonly).await?;

        let cursor = PreparedCursor::new(Cursor::new(Arc::clone(&client)));

        Ok(Live {
            client,
            cursor,
            catalog,
            driver,
        })
    }

    /// Whether the initial connection attempt succeeded.
    #[must_use]
    pub fn available(&self) -> bool {
        self.state.is_ok()
    }

    /// The captured connection failure, when unavailable.
    #[must_use]
    pub fn connect_error(&self) -> Option<&PgdbError> {
        self.state.as_ref().err()
    }

    /// The resolved connection parameters.
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Whether the session was requested read-only.
    #[must_use]
    pub fn readonly(&self) -> bool {
        self.readonly
    }

    /// The underlying client, `None` when unavailable.
    #[must_use]
    pub fn client(&self) -> Option<&Client> {
        self.state.as_ref().ok().map(|live| live.client.as_ref())
    }

    /// The prepared-statement cursor, `None` when unavailable.
    #[must_use]
    pub fn cursor(&self) -> Option<&PreparedCursor> {
        self.state.as_ref().ok().map(|live| &live.cursor)
    }

    /// Mutable cursor access (required by the prepared-statement cache),
    /// `None` when unavailable.
    #[must_use]
    pub fn cursor_mut(&mut self) -> Option<&mut PreparedCursor> {
        self.state.as_mut().ok().map(|live| &mut live.cursor)
    }

    /// Client and cursor together, `None` when unavailable.
    #[must_use]
    pub fn client_and_cursor(&self) -> Option<(&Client, &PreparedCursor)> {
        self.state
            .as_ref()
            .ok()
            .map(|live| (live.client.as_ref(), &live.cursor))
    }

    /// The schema catalog reflected at connect time, `None` when
    /// unavailable.
    #[must_use]
    pub fn catalog(&self) -> Option<&SchemaCatalog> {
        self.state.as_ref().ok().map(|live| &live.catalog)
    }

    /// Toggle the session between autocommit and an explicit
    /// read-committed transaction. Callable at any time after construction;
    /// a no-op when the requested mode is already active.
    ///
    /// # Errors
    /// Returns `ConnectionError` on an unavailable handle, or errors from
    /// the transaction commands.
    pub async fn set_autocommit(&mut self, auto: bool) -> Result<(), PgdbError> {
        let live = self.state.as_ref().map_err(|_| {
            PgdbError::ConnectionError("connection is unavailable".to_string())
        })?;

        if auto == self.autocommit {
            return Ok(());
        }
        if auto {
            session::commit_explicit(&live.client).await?;
        } else {
            session::begin_explicit(&live.client).await?;
        }
        self.autocommit = auto;
        Ok(())
    }

    /// Whether the session is currently in autocommit mode.
    #[must_use]
    pub fn autocommit(&self) -> bool {
        self.autocommit
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Ok(live) = &self.state {
            live.driver.abort();
        }
    }
}
