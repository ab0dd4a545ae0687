//! Process configuration consumed by the subscriber
//!
//! Loaded from TOML:
//!
//! ```toml
//! source = "web-01:shop"
//! custom_fields = ["user", "tenant"]
//! timestamp = "system"          # or any fixed string
//! ```

use crate::clock::{Clock, FixedClock, SystemClock};
use crate::errors::StasherError;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Environment variable overriding `source`
pub const SOURCE_ENV: &str = "STASHER_SOURCE";

const SYSTEM_TIMESTAMP: &str = "system";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StasherConfig {
    /// Value of the `@source` envelope key
    pub source: String,
    /// Completion payload keys copied into the response record
    pub custom_fields: Vec<String>,
    /// `"system"` for the wall clock, anything else is used verbatim
    pub timestamp: String,
}

impl Default for StasherConfig {
    fn default() -> Self {
        Self {
            source: "unknown".to_string(),
            custom_fields: Vec::new(),
            timestamp: SYSTEM_TIMESTAMP.to_string(),
        }
    }
}

impl StasherConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `StasherError::InvalidConfig` on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, StasherError> {
        let config: Self = toml::from_str(text).map_err(|e| StasherError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `StasherError::ConfigRead` if the file cannot be read, or
    /// `StasherError::InvalidConfig` if it does not parse.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, StasherError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| StasherError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `STASHER_SOURCE` if set and non-empty
    pub fn apply_env(self) -> Self {
        self.apply_source_override(std::env::var(SOURCE_ENV).ok())
    }

    fn apply_source_override(mut self, source: Option<String>) -> Self {
        if let Some(source) = source.filter(|s| !s.trim().is_empty()) {
            self.source = source;
        }
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_custom_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_fields = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// The clock selected by `timestamp`
    pub fn clock(&self) -> Arc<dyn Clock> {
        if self.timestamp == SYSTEM_TIMESTAMP {
            Arc::new(SystemClock)
        } else {
            Arc::new(FixedClock::new(self.timestamp.clone()))
        }
    }

    fn validate(&self) -> Result<(), StasherError> {
        if self.source.trim().is_empty() {
            return Err(StasherError::InvalidConfig {
                reason: "source must not be empty".to_string(),
            });
        }
        if let Some(name) = self.custom_fields.iter().find(|n| n.trim().is_empty()) {
            return Err(StasherError::InvalidConfig {
                reason: format!("custom field name {:?} is blank", name),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StasherConfig::from_toml_str("").unwrap();
        assert_eq!(config, StasherConfig::default());
        assert_eq!(config.source, "unknown");
    }

    #[test]
    fn test_parse_full_document() {
        let config = StasherConfig::from_toml_str(
            r#"
            source = "web-01:shop"
            custom_fields = ["user", "tenant"]
            timestamp = "timestamp"
            "#,
        )
        .unwrap();

        assert_eq!(config.source, "web-01:shop");
        assert_eq!(config.custom_fields, vec!["user", "tenant"]);
        assert_eq!(config.clock().now(), "timestamp");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = StasherConfig::from_toml_str("sorce = \"typo\"").unwrap_err();
        assert!(matches!(err, StasherError::InvalidConfig { .. }));
    }

    #[test]
    fn test_blank_source_rejected() {
        let err = StasherConfig::from_toml_str("source = \"  \"").unwrap_err();
        assert!(err.to_string().contains("source must not be empty"));
    }

    #[test]
    fn test_source_override_ignores_blank() {
        let config = StasherConfig::default().with_source("file");

        let kept = config.clone().apply_source_override(Some(" ".into()));
        assert_eq!(kept.source, "file");

        let replaced = config.apply_source_override(Some("env".into()));
        assert_eq!(replaced.source, "env");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = StasherConfig::from_path("/nonexistent/stasher.toml").unwrap_err();
        assert!(matches!(err, StasherError::ConfigRead { .. }));
    }
}
