//! Decorating template server library.

pub mod assets;
pub mod cli;
pub mod config;
pub mod files;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod security;
pub mod site;
pub mod template;

pub use config::schema::SiteConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use site::Site;
pub use template::{Env, Helpers};
