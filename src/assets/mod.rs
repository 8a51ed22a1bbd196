//! Asset pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! template helper call: css("/css", ["a.js", "b.js"]) ...
//!     → pipeline.rs (flattened references → resolved site paths)
//!     → kind.rs (fragment format + optional processor per kind)
//!     → cache.rs (per-file entries, bundle entries)
//!     → HTML fragment returned into the template
//!
//! GET /assets/<root>/<hash>.<ext>
//!     → pipeline.bundle(name) → bytes + mime + timestamp
//! ```
//!
//! # Design Decisions
//! - Development: stylesheets and scripts are linked file by file, nothing
//!   is trusted from cache
//! - Production: stylesheets and scripts are bundled under a content hash,
//!   every entry is computed once
//! - The random `<root>` segment changes on every start, so browsers never
//!   keep a stale bundle across restarts

pub mod cache;
pub mod kind;
pub mod markdown;
pub mod pipeline;

pub use cache::{AssetCache, CacheEntry, CacheSpace};
pub use kind::AssetKind;
pub use pipeline::{AssetPipeline, BUNDLE_ROOT};

use thiserror::Error;

/// Errors raised while producing asset fragments.
#[derive(Debug, Error)]
pub enum AssetError {
    /// A resolved file could not be read.
    #[error("failed to read asset {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
