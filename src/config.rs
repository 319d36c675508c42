//! Engine configuration.

use std::fs;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::{LoupeError, Result};

/// Name of the analyzed title field.
pub const TITLE_FIELD: &str = "title";
/// Name of the exact-match url field.
pub const URL_FIELD: &str = "url";
/// Name of the exact-match time field.
pub const TIME_FIELD: &str = "time";

/// Configuration for the search engine and its query boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoupeConfig {
    /// Field searched by terms without a `field:` prefix.
    pub default_field: String,
    /// Maximum number of hits ranked per query.
    pub result_max_num: usize,
    /// Number of items per result page.
    pub page_size: usize,
    /// Highlight fragment length in characters.
    pub fragment_size: usize,
    /// Marker inserted before every matched span.
    pub pre_tag: String,
    /// Marker inserted after every matched span.
    pub post_tag: String,
    /// `chrono` format string for document timestamps.
    pub time_format: String,
    /// Number of generation files kept on disk after a publish.
    pub keep_generations: usize,
}

impl Default for LoupeConfig {
    fn default() -> Self {
        LoupeConfig {
            default_field: TITLE_FIELD.to_string(),
            result_max_num: 100,
            page_size: 10,
            fragment_size: 100,
            pre_tag: "<b>".to_string(),
            post_tag: "</b>".to_string(),
            time_format: "%Y-%m-%d %H:%M:%S".to_string(),
            keep_generations: 1,
        }
    }
}

impl LoupeConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: LoupeConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the maximum number of ranked hits.
    pub fn result_max_num(mut self, result_max_num: usize) -> Self {
        self.result_max_num = result_max_num;
        self
    }

    /// Set the page size.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the fragment size.
    pub fn fragment_size(mut self, fragment_size: usize) -> Self {
        self.fragment_size = fragment_size;
        self
    }

    /// Set the match marker pair.
    pub fn markers<S: Into<String>>(mut self, pre_tag: S, post_tag: S) -> Self {
        self.pre_tag = pre_tag.into();
        self.post_tag = post_tag.into();
        self
    }

    /// Set how many generation files survive a publish.
    pub fn keep_generations(mut self, keep: usize) -> Self {
        self.keep_generations = keep;
        self
    }

    /// Check the configuration for values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.default_field.is_empty() {
            return Err(LoupeError::invalid_argument("default_field must not be empty"));
        }
        if self.result_max_num == 0 {
            return Err(LoupeError::invalid_argument("result_max_num must be > 0"));
        }
        if self.page_size == 0 {
            return Err(LoupeError::invalid_argument("page_size must be > 0"));
        }
        if self.fragment_size == 0 {
            return Err(LoupeError::invalid_argument("fragment_size must be > 0"));
        }
        if self.keep_generations == 0 {
            return Err(LoupeError::invalid_argument("keep_generations must be > 0"));
        }
        if StrftimeItems::new(&self.time_format).any(|item| matches!(item, Item::Error)) {
            return Err(LoupeError::invalid_argument(format!(
                "invalid time_format: {}",
                self.time_format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = LoupeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_field, "title");
        assert_eq!(config.pre_tag, "<b>");
    }

    #[test]
    fn test_builder_setters() {
        let config = LoupeConfig::new()
            .page_size(5)
            .fragment_size(20)
            .markers("[", "]")
            .result_max_num(50);

        assert_eq!(config.page_size, 5);
        assert_eq!(config.fragment_size, 20);
        assert_eq!(config.pre_tag, "[");
        assert_eq!(config.post_tag, "]");
        assert_eq!(config.result_max_num, 50);
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        assert!(LoupeConfig::new().page_size(0).validate().is_err());
        assert!(LoupeConfig::new().fragment_size(0).validate().is_err());
        assert!(LoupeConfig::new().result_max_num(0).validate().is_err());
        assert!(LoupeConfig::new().keep_generations(0).validate().is_err());

        let mut config = LoupeConfig::new();
        config.time_format = "%Y-%".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"page_size": 3, "pre_tag": "<em>", "post_tag": "</em>"}}"#).unwrap();

        let config = LoupeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.page_size, 3);
        assert_eq!(config.pre_tag, "<em>");
        assert_eq!(config.fragment_size, 100);
    }
}
