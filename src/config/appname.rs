/// Synthesize the session application name reported to the server:
/// `<hostname>.<pid>.<UNIQUE_ID>.<program>`.
///
/// Used purely for server-side session identification; the `UNIQUE_ID`
/// segment is empty when the correlation-id variable is unset.
#[must_use]
pub fn application_name() -> String {
    let host = local_hostname();
    let pid = std::process::id();
    let unique_id = std::env::var("UNIQUE_ID").unwrap_or_default();
    let program = std::env::current_exe()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default();

    format!("{host}.{pid}.{unique_id}.{program}")
}

/// Local machine name, empty when it cannot be determined.
#[must_use]
pub fn local_hostname() -> String {
    hostname::get()
        .ok()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_default()
}
