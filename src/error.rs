use thiserror::Error;

#[derive(Debug, Error)]
pub enum PgdbError {
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Other database error: {0}")]
    Other(String),
}

/// Emit an error and its full source chain to the error stream.
///
/// Not called automatically anywhere; call sites decide when a failure is
/// worth a traceback-style report.
pub fn error_details(err: &(dyn std::error::Error + 'static)) {
    tracing::error!("{}", format_details(err));
}

fn format_details(err: &(dyn std::error::Error + 'static)) -> String {
    let mut details = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        details.push_str(", ");
        details.push_str(&cause.to_string());
        source = cause.source();
    }
    details
}
