use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    // Fishes out positional (`%s`) and named (`%(name)s`) format specifiers.
    static ref FORMAT_RE: Regex = Regex::new(r"%s|%\([\w.]+\)s").expect("format pattern");
}

/// Rewrite format-style placeholders into numbered parameters.
///
/// Each specifier is replaced left-to-right with `$1`, `$2`, … and the
/// original specifier text is recorded in order of appearance. Pure text
/// transformation; nothing is sent to a server.
#[must_use]
pub fn rewrite_placeholders(sql: &str) -> (String, Vec<String>) {
    let mut specifiers = Vec::new();
    let rewritten = FORMAT_RE
        .replace_all(sql, |caps: &Captures<'_>| {
            specifiers.push(caps[0].to_string());
            format!("${}", specifiers.len())
        })
        .into_owned();
    (rewritten, specifiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_positional_specifiers() {
        let (sql, specs) = rewrite_placeholders("select * from t where a = %s and b = %s");
        assert_eq!(sql, "select * from t where a = $1 and b = $2");
        assert_eq!(specs, vec!["%s", "%s"]);
    }

    #[test]
    fn rewrites_named_specifiers() {
        let (sql, specs) = rewrite_placeholders("update t set a = %(a)s where id = %(row.id)s");
        assert_eq!(sql, "update t set a = $1 where id = $2");
        assert_eq!(specs, vec!["%(a)s", "%(row.id)s"]);
    }

    #[test]
    fn mixed_styles_number_left_to_right() {
        let (sql, specs) = rewrite_placeholders("insert into t values (%s, %(name)s, %s)");
        assert_eq!(sql, "insert into t values ($1, $2, $3)");
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[1], "%(name)s");
    }

    #[test]
    fn no_specifiers_leaves_text_unchanged() {
        let (sql, specs) = rewrite_placeholders("select now()");
        assert_eq!(sql, "select now()");
        assert!(specs.is_empty());
    }

    #[test]
    fn repeated_named_specifiers_get_distinct_numbers() {
        let (sql, specs) = rewrite_placeholders("select %(a)s, %(a)s");
        assert_eq!(sql, "select $1, $2");
        assert_eq!(specs, vec!["%(a)s", "%(a)s"]);
    }
}
