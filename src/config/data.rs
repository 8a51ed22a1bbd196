//! JSON data files exposed to templates.

use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::config::loader::ConfigError;
use crate::config::schema::SiteConfig;
use crate::files;

/// The `config` blob passed to every template.
///
/// Each configured JSON file is keyed by its file name without extension.
/// Production loads the files once; development re-reads them on every call.
#[derive(Debug, Default)]
pub struct SiteData {
    memo: OnceLock<Value>,
}

impl SiteData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current blob for `config`. `Null` when no files are configured.
    pub fn get(&self, config: &SiteConfig) -> Value {
        if config.json.is_empty() {
            return Value::Null;
        }

        if config.prod {
            return self.memo.get_or_init(|| load_data(config)).clone();
        }

        load_data(config)
    }
}

fn load_data(config: &SiteConfig) -> Value {
    let mut blob = Map::new();

    for rel in &config.json {
        match load_json_file(rel) {
            Ok(value) => {
                blob.insert(files::name(rel).to_string(), value);
            }
            Err(e) => tracing::error!(file = %rel, error = %e, "Skipping JSON data file"),
        }
    }

    Value::Object(blob)
}

/// Read and parse one JSON file.
pub fn load_json_file(rel: &str) -> Result<Value, ConfigError> {
    let bytes = std::fs::read(rel)?;
    serde_json::from_slice(&bytes).map_err(|source| ConfigError::Json {
        path: rel.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(path: &std::path::Path, prod: bool) -> SiteConfig {
        SiteConfig {
            json: vec![path.display().to_string()],
            prod,
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_no_files_is_null() {
        assert_eq!(SiteData::new().get(&SiteConfig::default()), Value::Null);
    }

    #[test]
    fn test_files_keyed_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        std::fs::write(&path, r#"{"title":"Home"}"#).unwrap();

        let data = SiteData::new();
        assert_eq!(data.get(&config(&path, false)), json!({"site": {"title": "Home"}}));
    }

    #[test]
    fn test_production_memoizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.json");
        std::fs::write(&path, "[1]").unwrap();

        let config = config(&path, true);
        let data = SiteData::new();
        assert_eq!(data.get(&config), json!({"menu": [1]}));

        std::fs::write(&path, "[2]").unwrap();
        assert_eq!(data.get(&config), json!({"menu": [1]}));
    }

    #[test]
    fn test_development_rereads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.json");
        std::fs::write(&path, "[1]").unwrap();

        let config = config(&path, false);
        let data = SiteData::new();
        assert_eq!(data.get(&config), json!({"menu": [1]}));

        std::fs::write(&path, "[2]").unwrap();
        assert_eq!(data.get(&config), json!({"menu": [2]}));
    }

    #[test]
    fn test_malformed_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{").unwrap();

        assert_eq!(SiteData::new().get(&config(&path, false)), json!({}));
    }
}
