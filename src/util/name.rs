//! Element and block name rules.

/// Check whether `name` is a valid element or block name.
///
/// Names are case-preserving ASCII identifiers: the first character is a
/// letter or `_`, the rest are alphanumeric, `_`, `.` or `:`. Empty names are
/// invalid.
pub fn is_valid_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b':'))
}

/// Panic if `name` is not a valid name. Invalid names are programmer errors.
#[inline]
#[track_caller]
pub fn assert_valid_name(name: &str) {
    assert!(is_valid_name(name), "invalid archive element name: {:?}", name);
}
