//! Shared utility helpers.

/// Bracket-quote a SQL Server identifier, doubling any closing bracket.
#[inline]
pub fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Case-insensitive equality without allocating.
#[inline]
pub fn eq_ci(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.as_bytes().eq_ignore_ascii_case(b.as_bytes())
}
