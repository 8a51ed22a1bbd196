//! Asset resolution and rendering.

use std::sync::Arc;
use std::time::SystemTime;

use super::cache::{AssetCache, CacheEntry, CacheSpace};
use super::kind::{AssetKind, Embedding};
use super::AssetError;
use crate::files::{self, SiteFs};

/// URL segment under which bundles are served.
pub const BUNDLE_ROOT: &str = "/assets";

/// Resolves asset references and renders them as HTML fragments.
#[derive(Debug)]
pub struct AssetPipeline {
    fs: Arc<dyn SiteFs>,
    prod: bool,
    /// Public URL path of the site (`""` when served at `/`).
    frontend_path: String,
    /// Per-process random segment in bundle URLs.
    root: String,
    cache: AssetCache,
}

impl AssetPipeline {
    pub fn new(fs: Arc<dyn SiteFs>, prod: bool, frontend_path: impl Into<String>) -> Self {
        Self {
            fs,
            prod,
            frontend_path: frontend_path.into(),
            root: hash(&rand::random::<u64>().to_string()),
            cache: AssetCache::new(prod),
        }
    }

    /// The random segment placed between [`BUNDLE_ROOT`] and bundle names.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// URL path prefix of every bundle, e.g. `/assets/3fa9c01d2e4b/`.
    pub fn bundle_prefix(&self) -> String {
        format!("{}/{}/", BUNDLE_ROOT, self.root)
    }

    /// Expand references into concrete site-relative file paths.
    ///
    /// Rooted references (leading `/`) produce rooted paths.
    pub fn resolve(&self, references: &[String]) -> Vec<String> {
        references
            .iter()
            .flat_map(|reference| self.resolve_one(reference))
            .collect()
    }

    fn resolve_one(&self, reference: &str) -> Vec<String> {
        let rooted = reference.starts_with('/');
        let rel = files::clean(reference);

        files::list(self.fs.as_ref(), &rel)
            .into_iter()
            .map(|path| if rooted { format!("/{}", path) } else { path })
            .collect()
    }

    /// Render references the way the kind is embedded in this environment.
    ///
    /// Inline kinds are always inlined. Referenced kinds are linked one by one
    /// in development and bundled in production.
    pub fn render(&self, kind: AssetKind, references: &[String]) -> Result<String, AssetError> {
        match (kind.embedding(), self.prod) {
            (Embedding::Inline, _) => self.inline(kind, references),
            (Embedding::Reference, false) => Ok(self.linked(kind, references)),
            (Embedding::Reference, true) => self.combined(kind, references),
        }
    }

    /// One fragment per resolved file with its processed contents inlined.
    pub fn inline(&self, kind: AssetKind, references: &[String]) -> Result<String, AssetError> {
        let mut fragments = Vec::new();

        for path in self.resolve(references) {
            // The same file may be pasted raw and rendered as markdown.
            let key = format!("{}:{}", kind.name(), path);
            let entry = self.cache.get_or_insert_with(CacheSpace::File, &key, || {
                let bytes = self.read(&path)?;
                Ok::<_, AssetError>(CacheEntry {
                    name: path.clone(),
                    mime: kind.mime(),
                    modified: SystemTime::now(),
                    paths: vec![path.clone()],
                    bytes: kind.process(bytes),
                })
            })?;

            let url = files::join_url(&self.frontend_path, &entry.name);
            fragments.push(kind.fragment(&url, &String::from_utf8_lossy(&entry.bytes)));
        }

        Ok(fragments.join("\n"))
    }

    /// One fragment per resolved file, referencing it by URL.
    pub fn linked(&self, kind: AssetKind, references: &[String]) -> String {
        self.resolve(references)
            .iter()
            .map(|path| kind.fragment(&files::join_url(&self.frontend_path, path), ""))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// A single fragment referencing a bundle of every resolved file.
    pub fn combined(&self, kind: AssetKind, references: &[String]) -> Result<String, AssetError> {
        let paths = self.resolve(references);
        if paths.is_empty() {
            return Ok(String::new());
        }

        let entry = self.bundle_for(kind, paths)?;
        let href = format!("{}{}", self.bundle_prefix(), entry.name);

        let rooted = references.first().is_some_and(|r| r.starts_with('/'));
        let href = if rooted {
            files::join_url(&self.frontend_path, &href)
        } else {
            href.trim_start_matches('/').to_string()
        };

        Ok(kind.fragment(&href, ""))
    }

    /// Produce (or reuse) the bundle entry for an ordered path list.
    pub fn bundle_for(&self, kind: AssetKind, paths: Vec<String>) -> Result<Arc<CacheEntry>, AssetError> {
        let name = format!("{}{}", hash(&paths.concat()), kind.extension());

        self.cache.get_or_insert_with(CacheSpace::Bundle, &name, || {
            let mut bytes = Vec::new();
            for path in &paths {
                bytes.extend(self.read(path)?);
            }

            tracing::debug!(bundle = %name, files = paths.len(), "Bundled assets");

            Ok(CacheEntry {
                name: name.clone(),
                mime: kind.mime(),
                modified: SystemTime::now(),
                paths,
                bytes: kind.process(bytes),
            })
        })
    }

    /// Look up a previously produced bundle by file name.
    pub fn bundle(&self, name: &str) -> Option<Arc<CacheEntry>> {
        self.cache.get(CacheSpace::Bundle, name)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        self.fs.read(path).map_err(|source| AssetError::Read {
            path: path.to_string(),
            source,
        })
    }
}

/// First 12 hex characters of the BLAKE3 hash of `seed`.
pub fn hash(seed: &str) -> String {
    let digest = blake3::hash(seed.as_bytes());
    hex::encode(&digest.as_bytes()[..6])
}
