//! Namespace helpers for fully qualified type names.

/// Split a fully qualified type name into `(namespace, type)`.
///
/// Dots inside generic argument lists are ignored, so
/// `Test.Grid<System.String>` splits into `("Test", "Grid<System.String>")`.
/// A top-level type has an empty namespace.
pub fn split_namespace_and_type(full_name: &str) -> (&str, &str) {
    let mut depth = 0usize;
    let mut last_dot = None;
    for (i, b) in full_name.bytes().enumerate() {
        match b {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b'.' if depth == 0 => last_dot = Some(i),
            _ => {}
        }
    }
    match last_dot {
        Some(i) => (&full_name[..i], &full_name[i + 1..]),
        None => ("", full_name),
    }
}

/// Whether a type declared in `type_namespace` is visible from code in
/// `current_namespace` without a using directive.
///
/// Every segment of `type_namespace` must equal the corresponding leading
/// segment of `current_namespace`. The global namespace is always in scope.
pub fn is_namespace_in_scope(type_namespace: &str, current_namespace: &str) -> bool {
    if type_namespace.is_empty() {
        return true;
    }
    let mut current = current_namespace.split('.');
    type_namespace
        .split('.')
        .all(|segment| current.next() == Some(segment))
}
