//! Asset cache.
//!
//! # Design Decisions
//! - Per-file entries and bundle entries live in separate maps, so a source
//!   path can never collide with a bundle name
//! - A trusted cache (production) returns existing entries without calling
//!   the producer; an untrusted cache (development) always recomputes and
//!   overwrites
//! - Concurrent first access may compute an entry twice; the last insert wins
//! - Entries are never evicted

use dashmap::DashMap;
use std::sync::Arc;
use std::time::SystemTime;

use crate::observability::metrics;

/// A cached asset payload.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Source path (per-file entries) or bundle file name (bundles).
    pub name: String,
    pub mime: &'static str,
    pub modified: SystemTime,
    /// Ordered source paths that contributed to `bytes`.
    pub paths: Vec<String>,
    pub bytes: Vec<u8>,
}

/// Which of the two key spaces an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSpace {
    File,
    Bundle,
}

impl CacheSpace {
    fn label(self) -> &'static str {
        match self {
            CacheSpace::File => "file",
            CacheSpace::Bundle => "bundle",
        }
    }
}

#[derive(Debug)]
pub struct AssetCache {
    trusted: bool,
    files: DashMap<String, Arc<CacheEntry>>,
    bundles: DashMap<String, Arc<CacheEntry>>,
}

impl AssetCache {
    /// Create an empty cache. `trusted` enables reuse of existing entries.
    pub fn new(trusted: bool) -> Self {
        Self {
            trusted,
            files: DashMap::new(),
            bundles: DashMap::new(),
        }
    }

    fn map(&self, space: CacheSpace) -> &DashMap<String, Arc<CacheEntry>> {
        match space {
            CacheSpace::File => &self.files,
            CacheSpace::Bundle => &self.bundles,
        }
    }

    /// Return the entry for `key`, producing it when missing or untrusted.
    pub fn get_or_insert_with<E>(
        &self,
        space: CacheSpace,
        key: &str,
        produce: impl FnOnce() -> Result<CacheEntry, E>,
    ) -> Result<Arc<CacheEntry>, E> {
        let map = self.map(space);

        if self.trusted {
            // Clone out before producing so no shard lock is held across disk reads.
            let cached = map.get(key).map(|entry| Arc::clone(entry.value()));
            if let Some(entry) = cached {
                metrics::record_cache_lookup(space.label(), true);
                return Ok(entry);
            }
        }

        metrics::record_cache_lookup(space.label(), false);
        let entry = Arc::new(produce()?);
        map.insert(key.to_string(), Arc::clone(&entry));
        Ok(entry)
    }

    /// Look up an existing entry without producing anything.
    pub fn get(&self, space: CacheSpace, key: &str) -> Option<Arc<CacheEntry>> {
        self.map(space).get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self, space: CacheSpace) -> usize {
        self.map(space).len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.bundles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn entry(name: &str, bytes: &[u8]) -> CacheEntry {
        CacheEntry {
            name: name.to_string(),
            mime: "text/plain",
            modified: SystemTime::now(),
            paths: vec![name.to_string()],
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_trusted_cache_reuses_entries() {
        let cache = AssetCache::new(true);
        let mut calls = 0;

        for _ in 0..3 {
            let e = cache
                .get_or_insert_with(CacheSpace::File, "a.md", || {
                    calls += 1;
                    Ok::<_, Infallible>(entry("a.md", b"a"))
                })
                .unwrap();
            assert_eq!(e.bytes, b"a");
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_untrusted_cache_recomputes() {
        let cache = AssetCache::new(false);
        let mut calls = 0;

        for i in 0..3u8 {
            let e = cache
                .get_or_insert_with(CacheSpace::File, "a.md", || {
                    calls += 1;
                    Ok::<_, Infallible>(entry("a.md", &[i]))
                })
                .unwrap();
            assert_eq!(e.bytes, vec![i]);
        }
        assert_eq!(calls, 3);
        assert_eq!(cache.get(CacheSpace::File, "a.md").unwrap().bytes, vec![2]);
    }

    #[test]
    fn test_key_spaces_are_distinct() {
        let cache = AssetCache::new(true);
        cache
            .get_or_insert_with(CacheSpace::File, "k", || Ok::<_, Infallible>(entry("k", b"file")))
            .unwrap();

        assert!(cache.get(CacheSpace::Bundle, "k").is_none());
        assert_eq!(cache.len(CacheSpace::File), 1);
        assert_eq!(cache.len(CacheSpace::Bundle), 0);
    }

    #[test]
    fn test_producer_errors_are_not_cached() {
        let cache = AssetCache::new(true);
        let result = cache.get_or_insert_with(CacheSpace::Bundle, "x.css", || Err("boom"));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
