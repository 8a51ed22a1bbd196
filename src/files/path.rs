//! Slash-separated path helpers.

/// Extension of the last segment, including the dot (`".html"`), or `""`.
pub fn extension(path: &str) -> &str {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match base.rfind('.') {
        Some(i) => &base[i..],
        None => "",
    }
}

/// `path` without the extension of its last segment.
pub fn strip_extension(path: &str) -> &str {
    &path[..path.len() - extension(path).len()]
}

/// File name without directory and extension: `"data/site.json"` → `"site"`.
pub fn name(path: &str) -> &str {
    let stripped = strip_extension(path);
    stripped.rsplit(['/', '\\']).next().unwrap_or(stripped)
}

/// Lexically normalize a relative path.
///
/// Empty and `.` segments are dropped, `..` pops the previous segment where
/// possible. Backslashes are treated as separators. The result never starts
/// or ends with `/`.
pub fn clean(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => match out.last() {
                Some(&last) if last != ".." => {
                    out.pop();
                }
                _ => out.push(".."),
            },
            s => out.push(s),
        }
    }
    out.join("/")
}

/// Join a URL path prefix (possibly empty) with a relative asset path.
pub fn join_url(prefix: &str, rel: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return rel.to_string();
    }
    format!("{}/{}", prefix, rel.trim_start_matches('/'))
}
