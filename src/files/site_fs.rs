//! Filesystem abstraction over the site root.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};
use walkdir::WalkDir;

/// What a site-relative path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// Read access to a site directory.
///
/// Paths are relative to the site root, `/`-separated, and may carry a
/// leading `/`.
pub trait SiteFs: Send + Sync + std::fmt::Debug {
    /// Kind of the entry at `rel`, or `None` if nothing is there.
    fn kind(&self, rel: &str) -> Option<EntryKind>;

    /// Full contents of the file at `rel`.
    fn read(&self, rel: &str) -> io::Result<Vec<u8>>;

    /// Names of the entries directly inside `rel`, sorted.
    fn read_dir(&self, rel: &str) -> io::Result<Vec<String>>;

    /// Every regular file under the root, sorted, relative and `/`-separated.
    fn walk(&self) -> io::Result<Vec<String>>;

    /// Convenience check for a regular file.
    fn is_file(&self, rel: &str) -> bool {
        self.kind(rel) == Some(EntryKind::File)
    }

    /// Directory on disk backing this source, if any.
    fn disk_root(&self) -> Option<&Path> {
        None
    }
}

/// A `SiteFs` backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute (root-joined) location of `rel`.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        self.root.join(rel.trim_start_matches('/'))
    }
}

impl SiteFs for DiskFs {
    fn kind(&self, rel: &str) -> Option<EntryKind> {
        let meta = std::fs::metadata(self.resolve(rel)).ok()?;
        if meta.is_dir() {
            Some(EntryKind::Dir)
        } else {
            Some(EntryKind::File)
        }
    }

    fn read(&self, rel: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(rel))
    }

    fn read_dir(&self, rel: &str) -> io::Result<Vec<String>> {
        let mut names = std::fs::read_dir(self.resolve(rel))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();
        Ok(names)
    }

    fn walk(&self) -> io::Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            files.push(rel.to_string_lossy().replace('\\', "/"));
        }
        Ok(files)
    }

    fn disk_root(&self) -> Option<&Path> {
        Some(&self.root)
    }
}

/// An in-memory `SiteFs`.
///
/// Directories are implied by file paths. Every successful `read` is counted
/// per path, which lets callers observe whether a cache was trusted.
#[derive(Debug, Default)]
pub struct MemFs {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
    reads: Mutex<BTreeMap<String, usize>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a file.
    pub fn insert(&self, rel: &str, contents: impl Into<Vec<u8>>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalize(rel), contents.into());
    }

    pub fn remove(&self, rel: &str) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&normalize(rel));
    }

    /// Number of successful reads of `rel` so far.
    pub fn read_count(&self, rel: &str) -> usize {
        self.reads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&normalize(rel))
            .copied()
            .unwrap_or(0)
    }
}

fn normalize(rel: &str) -> String {
    super::path::clean(rel)
}

impl SiteFs for MemFs {
    fn kind(&self, rel: &str) -> Option<EntryKind> {
        let rel = normalize(rel);
        if rel.is_empty() {
            return Some(EntryKind::Dir);
        }

        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        if files.contains_key(&rel) {
            return Some(EntryKind::File);
        }

        let prefix = format!("{}/", rel);
        files
            .keys()
            .any(|k| k.starts_with(&prefix))
            .then_some(EntryKind::Dir)
    }

    fn read(&self, rel: &str) -> io::Result<Vec<u8>> {
        let rel = normalize(rel);
        let contents = self
            .files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&rel)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, rel.clone()))?;

        *self
            .reads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(rel)
            .or_insert(0) += 1;

        Ok(contents)
    }

    fn read_dir(&self, rel: &str) -> io::Result<Vec<String>> {
        let rel = normalize(rel);
        let prefix = if rel.is_empty() { String::new() } else { format!("{}/", rel) };

        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let names = files
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .map(str::to_string)
            .collect::<BTreeSet<_>>();

        if names.is_empty() {
            return Err(io::Error::new(io::ErrorKind::NotFound, rel));
        }
        Ok(names.into_iter().collect())
    }

    fn walk(&self) -> io::Result<Vec<String>> {
        Ok(self
            .files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect())
    }
}
