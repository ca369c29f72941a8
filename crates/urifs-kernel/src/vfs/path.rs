//! Lexical path cleaning shared by the resolver and backends.

/// Clean a `/`-separated path without touching any storage.
///
/// - repeated separators collapse;
/// - `.` segments are dropped;
/// - `x/..` cancels out; `..` directly under the root is dropped, so a
///   rooted path can never climb above `/`;
/// - leading `..` of a relative path is kept;
/// - a trailing separator is removed, except for `/` itself.
///
/// `""` and `"."` both clean to `""`, the backend-relative root.
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            name => parts.push(name),
        }
    }

    let joined = parts.join("/");
    if rooted {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Join `segment` onto `base` and clean the result.
pub fn join_clean(base: &str, segment: &str) -> String {
    if base.is_empty() {
        clean_path(segment)
    } else {
        clean_path(&format!("{base}/{segment}"))
    }
}

/// Last segment of a cleaned path, `""` for a root.
pub fn file_name(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((_, name)) => name,
        None => path,
    }
}
