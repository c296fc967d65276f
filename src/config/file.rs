use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::PgdbError;

/// On-disk JSON configuration; every key is optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub(crate) struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Pick the config file within `dir`: a host-suffixed variant
/// (`<base>.<hostname>`) wins over the plain base name when it exists.
pub(crate) fn resolve_config_path(dir: &Path, base: &str, host: &str) -> PathBuf {
    let suffixed = dir.join(format!("{base}.{host}"));
    if suffixed.exists() {
        suffixed
    } else {
        dir.join(base)
    }
}

/// Read and parse a JSON config file.
///
/// # Errors
/// Returns `ConfigError` if the file cannot be read or is not valid JSON.
pub(crate) fn load_config_file(path: &Path) -> Result<FileConfig, PgdbError> {
    let bytes = std::fs::read(path).map_err(|e| {
        PgdbError::ConfigError(format!("cannot read config file {}: {e}", path.display()))
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        PgdbError::ConfigError(format!("invalid config file {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_suffixed_file_preferred() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pgdb.json"), "{}").unwrap();
        std::fs::write(dir.path().join("pgdb.json.box1"), "{}").unwrap();

        let path = resolve_config_path(dir.path(), "pgdb.json", "box1");
        assert_eq!(path, dir.path().join("pgdb.json.box1"));

        let path = resolve_config_path(dir.path(), "pgdb.json", "box2");
        assert_eq!(path, dir.path().join("pgdb.json"));
    }

    #[test]
    fn parses_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pgdb.json");
        std::fs::write(
            &path,
            r#"{"host":"h","port":5432,"database":"d","user":"u","password":"p"}"#,
        )
        .unwrap();

        let cfg = load_config_file(&path).unwrap();
        assert_eq!(cfg.host.as_deref(), Some("h"));
        assert_eq!(cfg.port, Some(5432));
        assert_eq!(cfg.database.as_deref(), Some("d"));
        assert_eq!(cfg.user.as_deref(), Some("u"));
        assert_eq!(cfg.password.as_deref(), Some("p"));
    }

    #[test]
    fn missing_keys_resolve_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pgdb.json");
        std::fs::write(&path, r#"{"host":"h"}"#).unwrap();

        let cfg = load_config_file(&path).unwrap();
        assert_eq!(cfg.host.as_deref(), Some("h"));
        assert_eq!(cfg.port, None);
        assert_eq!(cfg.user, None);
    }

    #[test]
    fn unreadable_file_is_config_error() {
        let err = load_config_file(Path::new("/nonexistent/pgdb.json")).unwrap_err();
        assert!(matches!(err, PgdbError::ConfigError(_)));
    }
}
