//! Generator configuration
//!
//! Settings baked into generated clients: headers sent with every request,
//! rate limiting, retries, caching, pagination, OAuth2 and webhooks. Loaded
//! from YAML; every field is optional in the file.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use specforge_common::Result;
use std::fs;
use std::path::Path;

/// Settings for generated clients
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base URL used when the document declares no servers
    pub base_url: Option<String>,

    /// Headers sent with every request
    pub custom_headers: IndexMap<String, String>,

    pub rate_limit: RateLimitConfig,

    /// Attempts per request before the last error is raised
    pub retries: u32,

    /// Response cache lifetime in seconds (0 disables caching)
    pub cache_ttl: u64,

    pub pagination: PaginationConfig,
    pub auth: AuthConfig,
    pub webhook: WebhookConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            custom_headers: IndexMap::new(),
            rate_limit: RateLimitConfig::default(),
            retries: 3,
            cache_ttl: 300,
            pagination: PaginationConfig::default(),
            auth: AuthConfig::default(),
            webhook: WebhookConfig::default(),
        }
    }
}

/// At most `calls` requests per `period` seconds
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub calls: u32,
    pub period: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            calls: 5,
            period: 1,
        }
    }
}

/// How list endpoints are walked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationStrategy {
    /// Follow a continuation token until it is empty
    Token,
    /// Increment a page number until a page comes back empty
    Page,
    None,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub strategy: PaginationStrategy,

    /// Response field holding the page items
    pub results_field: String,

    /// Response field holding the next token (token strategy)
    pub token_field: String,

    /// Query parameter carrying the token or page number
    pub request_param: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            strategy: PaginationStrategy::Token,
            results_field: "results".to_string(),
            token_field: "next_page_token".to_string(),
            request_param: "page_token".to_string(),
        }
    }
}

/// OAuth2 client-credentials settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub token_url: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Path webhooks are registered under, relative to the base URL
    pub register_path: String,

    /// Header carrying the payload signature, if signatures are checked
    pub secret_header: Option<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            register_path: "/webhooks".to_string(),
            secret_header: None,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text (an empty document yields defaults)
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Add a header sent with every request
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specforge_common::GeneratorError;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.retries, 3);
        assert_eq!(config.cache_ttl, 300);
        assert_eq!(config.rate_limit, RateLimitConfig { calls: 5, period: 1 });
        assert_eq!(config.pagination.strategy, PaginationStrategy::Token);
        assert!(config.custom_headers.is_empty());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = GeneratorConfig::from_yaml(
            "custom_headers:\n  X-Client: specforge\nrate_limit:\n  calls: 10\npagination:\n  strategy: page\n",
        )
        .unwrap();

        assert_eq!(config.custom_headers["X-Client"], "specforge");
        assert_eq!(config.rate_limit.calls, 10);
        assert_eq!(config.rate_limit.period, 1);
        assert_eq!(config.pagination.strategy, PaginationStrategy::Page);
        assert_eq!(config.pagination.results_field, "results");
        assert_eq!(config.retries, 3);
    }

    #[test]
    fn test_empty_yaml() {
        assert_eq!(
            GeneratorConfig::from_yaml("  \n").unwrap(),
            GeneratorConfig::default()
        );
    }

    #[test]
    fn test_invalid_yaml() {
        let err = GeneratorConfig::from_yaml("retries: [1, 2").unwrap_err();
        assert!(matches!(err, GeneratorError::Yaml(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GeneratorConfig::load(Path::new("/nonexistent/specforge.yaml")).unwrap_err();
        assert!(matches!(err, GeneratorError::Io(_)));
    }
}
