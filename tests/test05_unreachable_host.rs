use pgdb::prelude::*;
use tokio::runtime::Runtime;

fn unreachable_config() -> ConnectionConfig {
    // nothing listens on the discard port; the connect attempt is refused
    // immediately, well inside the 10s connect timeout
    ConnectionConfig {
        host: Some("127.0.0.1".to_string()),
        port: Some(9),
        database: Some("test_db".to_string()),
        user: Some("test_user".to_string()),
        password: Some("test_password".to_string()),
        application_name: "pgdb-test".to_string(),
    }
}

#[test]
fn test05_unreachable_host_marks_handle_unavailable() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let db = Database::connect_with_config(unreachable_config(), AccessMode::ReadWrite).await;

        assert!(!db.available());
        assert!(db.connect_error().is_some());
        assert!(db.client().is_none());
        assert!(db.cursor().is_none());
        assert!(db.client_and_cursor().is_none());
        assert!(db.catalog().is_none());
    });
}

#[test]
fn test05_unavailable_handle_rejects_autocommit_toggle() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let mut db =
            Database::connect_with_config(unreachable_config(), AccessMode::ReadOnly).await;

        assert!(db.readonly());
        let err = db.set_autocommit(false).await.unwrap_err();
        assert!(matches!(err, PgdbError::ConnectionError(_)));
    });
}

#[test]
fn test05_config_survives_failed_connect() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let db = Database::connect_with_config(unreachable_config(), AccessMode::ReadWrite).await;
        assert_eq!(db.config().host.as_deref(), Some("127.0.0.1"));
        let repr = db.config().to_string();
        assert!(repr.contains("Host: 127.0.0.1"));
    });
}
