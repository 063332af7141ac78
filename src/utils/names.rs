// Mon Jan 19 2026 - Alex

//! Helpers for C++ names as they appear in the type dump.

use crate::output::MethodKind;

/// Drops every `<...>` template argument list, nested ones included.
pub fn strip_template_args(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut depth = 0usize;

    for c in name.chars() {
        match c {
            '<' => depth += 1,
            '>' if depth > 0 => depth -= 1,
            _ if depth == 0 => result.push(c),
            _ => {}
        }
    }
    result
}

/// Last `::` component of a qualified name, ignoring separators inside
/// template arguments. Operator names are kept whole.
pub fn last_component(name: &str) -> &str {
    if let Some(pos) = name.rfind("::operator") {
        return &name[pos + 2..];
    }

    let bytes = name.as_bytes();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' if depth > 0 => depth -= 1,
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                start = i + 2;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    &name[start..]
}

/// Last component of a qualified name with template arguments removed.
/// `ns::Vec<std::pair<int,int>>::Vec<int>` -> `Vec`.
pub fn unqualified_name(name: &str) -> String {
    let last = last_component(name);
    if last.starts_with("operator") {
        return last.to_string();
    }
    strip_template_args(last)
}

/// Constructor when the method is named after its class, destructor when it
/// is that name prefixed with `~`.
pub fn method_kind(class_name: &str, method_name: &str) -> MethodKind {
    let class = unqualified_name(class_name);
    let method = unqualified_name(method_name);

    if method == class {
        MethodKind::Constructor
    } else if method.strip_prefix('~') == Some(class.as_str()) {
        MethodKind::Destructor
    } else {
        MethodKind::Method
    }
}
