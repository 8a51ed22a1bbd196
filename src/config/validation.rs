//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check addresses carry a scheme and parse as URLs
//! - Check referenced directories and files exist
//! - Check auth patterns are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{normalize_address, SiteConfig};
use crate::security::access_control::AuthRule;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} address must include a protocol and be a valid URL: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("frontend address has no usable port: {0}")]
    MissingPort(String),

    #[error("site directory does not exist: {0}")]
    MissingDir(String),

    #[error("unknown JSON data file: {0}")]
    MissingJson(String),

    #[error("invalid auth pattern: {0}")]
    InvalidAuthPattern(String),

    #[error("backend_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("invalid metrics address: {0}")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, value) in [("frontend", &config.frontend), ("backend", &config.backend)] {
        if !value.is_empty() && normalize_address(value).is_none() {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.clone(),
            });
        }
    }

    if config.listen_address().is_none() {
        errors.push(ValidationError::MissingPort(config.frontend_url()));
    }

    if !config.dir().is_dir() {
        errors.push(ValidationError::MissingDir(config.dir().display().to_string()));
    }

    for rel in &config.json {
        if !Path::new(rel).is_file() {
            errors.push(ValidationError::MissingJson(rel.clone()));
        }
    }

    for pattern in &config.auth {
        if pattern.is_empty() {
            continue;
        }
        if let Err(e) = AuthRule::parse(pattern) {
            errors.push(e);
        }
    }

    if config.backend_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if let Some(addr) = &config.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SiteConfig {
        SiteConfig {
            dir: std::env::temp_dir().display().to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_default_in_existing_dir_is_valid() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let config = SiteConfig {
            frontend: "localhost".into(),
            backend: "ftp-without-scheme".into(),
            auth: vec!["nocolon".into()],
            backend_timeout_secs: 0,
            metrics_address: Some("nowhere".into()),
            ..valid()
        };

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidAddress {
            field: "frontend",
            value: "localhost".into()
        }));
        assert!(errors.contains(&ValidationError::InvalidAddress {
            field: "backend",
            value: "ftp-without-scheme".into()
        }));
        assert!(errors.contains(&ValidationError::InvalidAuthPattern("nocolon".into())));
        assert!(errors.contains(&ValidationError::ZeroTimeout));
        assert!(errors.contains(&ValidationError::InvalidMetricsAddress("nowhere".into())));
    }

    #[test]
    fn test_missing_json_file() {
        let config = SiteConfig {
            json: vec!["no/such/file.json".into()],
            ..valid()
        };
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MissingJson("no/such/file.json".into())])
        );
    }
}
