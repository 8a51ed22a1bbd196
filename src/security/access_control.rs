//! Basic auth rules.
//!
//! A rule is written `user:pass@path`. Requests whose URI (without the leading
//! slash) starts with `path` must present matching basic credentials. A rule
//! without `@path` protects the whole site.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::config::ValidationError;

/// Realm announced in `WWW-Authenticate` challenges.
pub const REALM: &str = "Restricted";

/// One credential requirement for a path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRule {
    pub user: String,
    pub pass: String,
    /// URI prefix without leading slash; empty matches everything.
    pub path: String,
}

impl AuthRule {
    /// Parse a `user:pass@path` pattern.
    pub fn parse(pattern: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidAuthPattern(pattern.to_string());

        if pattern.len() < 3 {
            return Err(invalid());
        }

        let (credentials, path) = match pattern.rfind('@') {
            Some(at) => (&pattern[..at], &pattern[at + 1..]),
            None => (pattern, ""),
        };

        let (user, pass) = credentials.rsplit_once(':').ok_or_else(invalid)?;
        if user.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            user: user.to_string(),
            pass: pass.to_string(),
            path: path.trim_start_matches('/').to_string(),
        })
    }

    /// Whether this rule covers the given request URI.
    pub fn covers(&self, uri: &str) -> bool {
        uri.trim_start_matches('/').starts_with(&self.path)
    }

    /// Check an `Authorization` header value against this rule.
    pub fn accepts(&self, authorization: Option<&str>) -> bool {
        let Some(encoded) = authorization.and_then(|v| v.strip_prefix("Basic ")) else {
            return false;
        };
        let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
            return false;
        };

        let expected = format!("{}:{}", self.user, self.pass);
        // blake3::Hash equality is constant time.
        blake3::hash(&decoded) == blake3::hash(expected.as_bytes())
    }
}

/// Ordered auth rules; the first covering rule decides.
#[derive(Debug, Clone, Default)]
pub struct AuthRules {
    rules: Vec<AuthRule>,
}

impl AuthRules {
    /// Build from config patterns, skipping empty and malformed ones.
    ///
    /// Malformed patterns are reported by config validation.
    pub fn from_patterns(patterns: &[String]) -> Self {
        let rules = patterns
            .iter()
            .filter(|p| !p.is_empty())
            .filter_map(|p| match AuthRule::parse(p) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring auth pattern");
                    None
                }
            })
            .collect();
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rule guarding `uri`, if any.
    pub fn rule_for(&self, uri: &str) -> Option<&AuthRule> {
        self.rules.iter().find(|rule| rule.covers(uri))
    }
}
