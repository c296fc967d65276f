use pgdb::prelude::*;

fn entry_for(id: &str, arity: usize) -> PreparedExec {
    PreparedExec {
        statement: id.to_string(),
        exec_cmd: exec_command(id, arity),
        arity,
    }
}

#[test]
fn test02_cache_size_tracks_distinct_texts() {
    let mut cache = StatementCache::new();

    // first sight of a text allocates the next sequential id
    let id = cache.next_statement_id();
    assert_eq!(id, "ps_1");
    cache.insert("select %s".to_string(), entry_for(&id, 1));

    // repeat of the same raw text is a hit; the cache does not grow
    assert!(cache.get("select %s").is_some());
    assert_eq!(cache.len(), 1);

    // a second distinct text gets the next id
    let id = cache.next_statement_id();
    assert_eq!(id, "ps_2");
    cache.insert("select %s, %s".to_string(), entry_for(&id, 2));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test02_cache_key_is_raw_text_not_rewritten() {
    let mut cache = StatementCache::new();
    let (rewritten, specifiers) = rewrite_placeholders("select %s");
    cache.insert(
        "select %s".to_string(),
        entry_for("ps_1", specifiers.len()),
    );

    assert!(cache.get("select %s").is_some());
    assert!(cache.get(&rewritten).is_none());
}

#[test]
fn test02_execute_command_recorded_per_text() {
    let mut cache = StatementCache::new();
    cache.insert("select 1".to_string(), entry_for("ps_1", 0));
    cache.insert("select %s".to_string(), entry_for("ps_2", 1));

    assert_eq!(
        cache.get("select 1").map(|e| e.exec_cmd.as_str()),
        Some("execute ps_1")
    );
    assert_eq!(
        cache.get("select %s").map(|e| e.exec_cmd.as_str()),
        Some("execute ps_2($1)")
    );
}
