//! ECMA-335 identifier sanitization
//!
//! Conceptual names must be usable as .NET identifiers. Any character that
//! cannot appear in an identifier is replaced with `_`; a name whose first
//! character cannot start an identifier is prefixed.

/// Whether `c` may start an identifier
fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// Whether `c` may appear after the first character of an identifier
fn is_identifier_part(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Whether `name` is already a valid identifier
pub fn is_valid_ecma_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_identifier_part),
        _ => false,
    }
}

/// Produce a valid identifier from `name`.
///
/// Invalid characters become `_`. If the result still cannot start an
/// identifier (it begins with a digit, or `name` was empty) `prefix` is
/// prepended.
pub fn create_valid_ecma_name(name: &str, prefix: char) -> String {
    let mut result: String = name
        .chars()
        .map(|c| if is_identifier_part(c) { c } else { '_' })
        .collect();

    match result.chars().next() {
        Some(first) if is_identifier_start(first) => {}
        _ => result.insert(0, prefix),
    }
    result
}
