//! POSIX-style path algebra over virtual paths.
//!
//! The virtual file tree only exists as strings, so every operation here is
//! pure string manipulation. Host OS path conventions never leak in.

/// Returns the directory portion of a virtual path.
///
/// `dirname("/src/pages/home.ts")` is `"/src/pages"`. A path without a
/// separator (or a bare root) yields `"/"`.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "/",
    }
}

/// Returns the final component of a virtual path.
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Returns the extension including the leading dot, or `""` if there is none.
pub fn extname(path: &str) -> &str {
    let name = basename(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[idx..],
        _ => "",
    }
}

/// Joins `base` and a relative segment, collapsing `.` and `..` components.
pub fn join(base: &str, relative: &str) -> String {
    let mut parts: Vec<&str> = base.split('/').filter(|p| !p.is_empty()).collect();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    let mut joined = String::from("/");
    joined.push_str(&parts.join("/"));
    joined
}
