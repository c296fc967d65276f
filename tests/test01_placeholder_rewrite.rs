use pgdb::prelude::*;

#[test]
fn test01_n_specifiers_produce_n_slots() {
    for n in 0..6 {
        let sql = (0..n).map(|_| "%s").collect::<Vec<_>>().join(", ");
        let sql = format!("select {sql}");
        let (_, specifiers) = rewrite_placeholders(&sql);
        assert_eq!(specifiers.len(), n);

        let cmd = exec_command("ps_1", specifiers.len());
        if n == 0 {
            assert_eq!(cmd, "execute ps_1");
        } else {
            let slots: Vec<String> = (1..=n).map(|i| format!("${i}")).collect();
            assert_eq!(cmd, format!("execute ps_1({})", slots.join(", ")));
        }
    }
}

#[test]
fn test01_numbering_follows_order_of_appearance() {
    let (rewritten, specifiers) =
        rewrite_placeholders("insert into t (a, b, c) values (%(a)s, %s, %(c)s)");
    assert_eq!(rewritten, "insert into t (a, b, c) values ($1, $2, $3)");
    assert_eq!(specifiers, vec!["%(a)s", "%s", "%(c)s"]);
}

#[test]
fn test01_prepare_command_shape() {
    let (rewritten, _) = rewrite_placeholders("select * from t where a = %s");
    assert_eq!(
        prepare_command("ps_4", &rewritten),
        "prepare ps_4 as select * from t where a = $1"
    );
}
