//! Site directory access.
//!
//! # Data Flow
//! ```text
//! site root on disk (or in memory, for tests)
//!     → site_fs.rs (SiteFs: kind / read / read_dir / walk)
//!     → ignore.rs (leading `.` or `_` segments are invisible)
//!     → path.rs (logical names, extensions, lexical cleaning)
//!     → consumed by template compilation and asset resolution
//! ```
//!
//! # Design Decisions
//! - All paths handed to a `SiteFs` are relative to the site root and use `/`
//! - A leading `/` on a relative path is tolerated and ignored
//! - Ignored entries are skipped silently, never reported as errors

pub mod ignore;
pub mod path;
pub mod site_fs;

pub use ignore::is_ignored;
pub use path::{clean, extension, join_url, name, strip_extension};
pub use site_fs::{DiskFs, EntryKind, MemFs, SiteFs};

/// Recursively list the non-ignored files at `rel`.
///
/// A file yields itself, a directory yields its alphabetically sorted
/// contents, anything else yields nothing.
pub fn list(fs: &dyn SiteFs, rel: &str) -> Vec<String> {
    if is_ignored(rel) {
        return Vec::new();
    }

    match fs.kind(rel) {
        Some(EntryKind::File) => vec![rel.to_string()],
        Some(EntryKind::Dir) => {
            let entries = match fs.read_dir(rel) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::debug!(path = %rel, error = %e, "Skipping unreadable directory");
                    return Vec::new();
                }
            };

            let mut files = Vec::new();
            for entry in entries {
                let child = if rel.is_empty() {
                    entry
                } else {
                    format!("{}/{}", rel.trim_end_matches('/'), entry)
                };

                if is_ignored(&child) {
                    continue;
                }

                match fs.kind(&child) {
                    Some(EntryKind::Dir) => files.extend(list(fs, &child)),
                    Some(EntryKind::File) => files.push(child),
                    None => {}
                }
            }
            files
        }
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> MemFs {
        let fs = MemFs::new();
        fs.insert("css/b.css", "b");
        fs.insert("css/a.css", "a");
        fs.insert("css/_partial.css", "p");
        fs.insert("css/.hidden/x.css", "x");
        fs.insert("css/vendor/z.css", "z");
        fs.insert("index.html", "i");
        fs
    }

    #[test]
    fn test_list_directory_sorted_and_filtered() {
        let fs = site();
        assert_eq!(
            list(&fs, "css"),
            vec!["css/a.css", "css/b.css", "css/vendor/z.css"]
        );
    }

    #[test]
    fn test_list_single_file() {
        let fs = site();
        assert_eq!(list(&fs, "index.html"), vec!["index.html"]);
    }

    #[test]
    fn test_list_missing_and_ignored() {
        let fs = site();
        assert!(list(&fs, "nope").is_empty());
        assert!(list(&fs, "css/_partial.css").is_empty());
    }
}
