//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI flags override individual fields (cli.rs)
//!     → validation.rs (semantic checks)
//!     → SiteConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! Template environment:
//!     data.rs loads the configured JSON files into one blob
//!     → memoized in production, re-read per render in development
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the data blob is the only lazy field
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod data;
pub mod loader;
pub mod schema;
pub mod validation;

pub use data::SiteData;
pub use loader::{load_config, ConfigError};
pub use schema::SiteConfig;
pub use validation::{validate_config, ValidationError};
