//! Command line interface.
//!
//! Every configuration field can be given on the command line; flags win
//! over the file passed with `--config`.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{loader::read_config, ConfigError, SiteConfig};

#[derive(Debug, Parser)]
#[command(name = "decorating-proxy")]
#[command(about = "Serve a directory of templates, decorating JSON from a backend", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Public address, e.g. `:8000` or `http://localhost:8000/app/`
    #[arg(short, long)]
    pub frontend: Option<String>,

    /// Backend base URL
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Site root directory
    #[arg(short, long)]
    pub dir: Option<String>,

    /// JSON data file exposed as `config.<name>` (repeatable)
    #[arg(short, long)]
    pub json: Vec<String>,

    /// Layout template wrapping every page
    #[arg(short, long)]
    pub layout: Option<String>,

    /// Basic auth rule `user:pass@path` (repeatable)
    #[arg(short, long)]
    pub auth: Vec<String>,

    /// Trust X-Forwarded-For / X-Real-IP
    #[arg(long)]
    pub proxy: bool,

    /// Production mode
    #[arg(long)]
    pub prod: bool,

    /// Verbose logging
    #[arg(long)]
    pub debug: bool,

    /// Backend round trip deadline in seconds
    #[arg(long)]
    pub backend_timeout_secs: Option<u64>,

    /// Prometheus scrape address
    #[arg(long)]
    pub metrics_address: Option<String>,
}

impl Cli {
    /// The configuration file (if any) with command line overrides applied.
    pub fn into_config(self) -> Result<SiteConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => SiteConfig::default(),
        };

        if let Some(frontend) = self.frontend {
            config.frontend = frontend;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(dir) = self.dir {
            config.dir = dir;
        }
        if !self.json.is_empty() {
            config.json = self.json;
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if !self.auth.is_empty() {
            config.auth = self.auth;
        }
        config.proxy |= self.proxy;
        config.prod |= self.prod;
        config.debug |= self.debug;
        if let Some(secs) = self.backend_timeout_secs {
            config.backend_timeout_secs = secs;
        }
        if self.metrics_address.is_some() {
            config.metrics_address = self.metrics_address;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_without_file() {
        let cli = Cli::parse_from([
            "decorating-proxy",
            "--frontend",
            ":9000",
            "--json",
            "a.json",
            "--json",
            "b.json",
            "--prod",
        ]);
        let config = cli.into_config().unwrap();

        assert_eq!(config.frontend, ":9000");
        assert_eq!(config.json, vec!["a.json", "b.json"]);
        assert!(config.prod);
        assert!(!config.debug);
        assert_eq!(config.backend_timeout_secs, 30);
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        std::fs::write(&path, "backend = \"http://api/\"\nlayout = \"base.html\"\n").unwrap();

        let cli = Cli::parse_from([
            "decorating-proxy",
            "--config",
            path.to_str().unwrap(),
            "--backend",
            "http://other/",
        ]);
        let config = cli.into_config().unwrap();

        assert_eq!(config.backend, "http://other/");
        assert_eq!(config.layout, "base.html");
    }
}
