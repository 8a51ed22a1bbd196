//! Ignored path detection.
//!
//! A path is ignored when any of its segments starts with `_`, or starts with
//! `.` followed by something other than another `.`. The parent reference
//! `..` and a bare `.` stay visible.

/// Returns true if any segment of `path` marks it as ignored.
pub fn is_ignored(path: &str) -> bool {
    path.split(['/', '\\']).any(is_ignored_segment)
}

fn is_ignored_segment(segment: &str) -> bool {
    if segment.starts_with('_') {
        return true;
    }

    let mut chars = segment.chars();
    matches!((chars.next(), chars.next()), (Some('.'), Some(c)) if c != '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_segments() {
        assert!(is_ignored("_layout.html"));
        assert!(is_ignored("/_drafts/post.html"));
        assert!(is_ignored(".git/config"));
        assert!(is_ignored("css/.hidden.css"));
        assert!(is_ignored("a\\_b\\c.js"));
    }

    #[test]
    fn test_visible_segments() {
        assert!(!is_ignored("index.html"));
        assert!(!is_ignored("/css/site.css"));
        assert!(!is_ignored("../shared/app.js"));
        assert!(!is_ignored("./app.js"));
        assert!(!is_ignored("a_b/c.js"));
        assert!(!is_ignored(""));
    }
}
