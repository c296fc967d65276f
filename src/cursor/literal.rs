use crate::types::RowValues;

/// Render a value as a SQL literal for splicing into an `EXECUTE` command.
///
/// `EXECUTE` is a utility statement and cannot carry protocol-level binds,
/// so prepared-statement arguments travel as literals over the simple-query
/// protocol.
#[must_use]
pub fn render_literal(value: &RowValues) -> String {
    match value {
        RowValues::Int(i) => i.to_string(),
        RowValues::Float(f) => {
            if f.is_finite() {
                f.to_string()
            } else {
                // NaN / Infinity must be quoted to be accepted as float8
                format!("'{f}'")
            }
        }
        RowValues::Text(s) => escape_string(s),
        RowValues::Bool(b) => b.to_string(),
        RowValues::Timestamp(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S%.f")),
        RowValues::Null => "NULL".to_string(),
        RowValues::JSON(v) => escape_string(&v.to_string()),
        RowValues::Blob(bytes) => format!("'\\x{}'", to_hex(bytes)),
    }
}

/// Quote a string literal, doubling embedded quotes. Strings containing a
/// backslash use the `E''` form with the backslashes doubled, which reads
/// the same under any `standard_conforming_strings` setting.
pub(crate) fn escape_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 2);
    if s.contains('\\') {
        escaped.push('E');
    }
    escaped.push('\'');
    for c in s.chars() {
        if c == '\'' {
            escaped.push('\'');
        }
        if c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('\'');
    escaped
}

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
