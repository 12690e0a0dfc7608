//! Scrape configuration loaded from TOML.
//!
//! A default configuration covering the three storefront categories is
//! embedded at compile time; a file on disk can replace it.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use jaessence_api::types::Category;
use jaessence_api::RetryPolicy;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::catalog::Pacing;

/// Error types for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level structure of a scrape config file.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScrapeConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// When false only listings are crawled and every record stays a seed.
    #[serde(default = "default_fetch_details")]
    pub fetch_details: bool,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub pacing: PacingConfig,

    /// Categories in crawl order.
    #[serde(default)]
    pub categories: Vec<CategorySource>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct PacingConfig {
    #[serde(default = "default_product_delay_ms")]
    pub product_delay_ms: u64,
    #[serde(default = "default_category_delay_ms")]
    pub category_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            product_delay_ms: default_product_delay_ms(),
            category_delay_ms: default_category_delay_ms(),
        }
    }
}

/// A category and the listing page it is discovered from.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CategorySource {
    pub category: Category,
    /// Listing path relative to the base URL, or an absolute URL.
    pub url: String,
}

impl CategorySource {
    pub fn new(category: Category, url: impl Into<String>) -> Self {
        Self {
            category,
            url: url.into(),
        }
    }
}

fn default_base_url() -> String {
    jaessence_api::DEFAULT_BASE_URL.to_string()
}

fn default_fetch_details() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    jaessence_api::DEFAULT_MAX_ATTEMPTS
}

fn default_backoff_ms() -> u64 {
    jaessence_api::DEFAULT_BACKOFF.as_millis() as u64
}

fn default_product_delay_ms() -> u64 {
    500
}

fn default_category_delay_ms() -> u64 {
    1000
}

impl ScrapeConfig {
    /// Overrides the storefront base URL (from the environment or the CLI).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.backoff_ms),
        )
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            product_delay: Duration::from_millis(self.pacing.product_delay_ms),
            category_delay: Duration::from_millis(self.pacing.category_delay_ms),
        }
    }

    /// Checks the invariants the crawl relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url {}: {}", self.base_url, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "base_url must be http or https, got {}",
                base.scheme()
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.categories.is_empty() {
            return Err(ConfigError::Invalid("no categories configured".into()));
        }

        let mut seen = HashSet::new();
        for source in &self.categories {
            if !seen.insert(source.category) {
                return Err(ConfigError::Invalid(format!(
                    "category {} configured twice",
                    source.category
                )));
            }
            base.join(&source.url).map_err(|e| {
                ConfigError::Invalid(format!(
                    "listing url {} for {}: {}",
                    source.url, source.category, e
                ))
            })?;
        }
        Ok(())
    }
}

/// Parse and validate a scrape config from TOML content.
pub fn parse_config(toml_content: &str) -> Result<ScrapeConfig, ConfigError> {
    let config: ScrapeConfig = toml::from_str(toml_content)?;
    config.validate()?;
    Ok(config)
}

/// Load the config embedded at compile time.
pub fn load_default_config() -> Result<ScrapeConfig, ConfigError> {
    let toml_content = include_str!("../../seed_data/scrape.toml");
    parse_config(toml_content)
}

/// Load a config file from disk.
pub fn load_config(path: &Path) -> Result<ScrapeConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = load_default_config().unwrap();
        assert_eq!(config.base_url, "https://www.jaessencedelavie.com.br");
        assert!(config.fetch_details);
        let order: Vec<Category> = config.categories.iter().map(|c| c.category).collect();
        assert_eq!(order, Category::ALL.to_vec());
        assert_eq!(config.categories[0].url, "/compartilhaveis/");
    }

    #[test]
    fn test_default_config_policies() {
        let config = load_default_config().unwrap();
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        let pacing = config.pacing();
        assert_eq!(pacing.product_delay, Duration::from_millis(500));
        assert_eq!(pacing.category_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = parse_config(
            r#"
            [[categories]]
            category = "feminine"
            url = "/femininos/"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, jaessence_api::DEFAULT_BASE_URL);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.pacing.category_delay_ms, 1000);
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let result = parse_config(
            r#"
            [[categories]]
            category = "masculine"
            url = "/masculinos/"

            [[categories]]
            category = "masculine"
            url = "/outros/"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_categories_rejected() {
        let result = parse_config("base_url = \"https://example.com\"");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let result = parse_config(
            r#"
            [retry]
            max_attempts = 0

            [[categories]]
            category = "shareable"
            url = "/compartilhaveis/"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_category_is_parse_error() {
        let result = parse_config(
            r#"
            [[categories]]
            category = "kids"
            url = "/kids/"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_category_slug_accepted() {
        let config = parse_config(
            r#"
            [[categories]]
            category = "masculinos"
            url = "/masculinos/"
            "#,
        )
        .unwrap();
        assert_eq!(config.categories[0].category, Category::Masculine);
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let result = parse_config(
            r#"
            base_url = "ftp://example.com"

            [[categories]]
            category = "shareable"
            url = "/compartilhaveis/"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_with_base_url_trims_slash() {
        let config = load_default_config()
            .unwrap()
            .with_base_url("http://127.0.0.1:8080/");
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_config(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
