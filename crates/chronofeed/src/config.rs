//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{FeedError, FeedResult};

/// Page size used when a caller does not pick one.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Subevent nesting hydrated when a caller does not pick a limit.
pub const DEFAULT_MAX_SUBEVENT_DEPTH: usize = 64;

/// Hard ceiling on the subevent depth a config may ask for. Hydration
/// recurses once per level and the views it builds are nested just as deep.
pub const SUBEVENT_DEPTH_CEILING: usize = 256;

/// Tunables for a [`crate::Chronofeed`] instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub default_per_page: usize,
    /// Nesting limit for subevent hydration, at most
    /// [`SUBEVENT_DEPTH_CEILING`]. Cycles are cut regardless.
    pub max_subevent_depth: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_subevent_depth: DEFAULT_MAX_SUBEVENT_DEPTH,
        }
    }
}

impl FeedConfig {
    /// Read a config from a JSON file. Missing fields take their defaults.
    pub fn read_from_file(path: &Path) -> FeedResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FeedError::Config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// Parse a config from JSON text.
    pub fn from_json(raw: &str) -> FeedResult<Self> {
        let config: FeedConfig = serde_json::from_str(raw)
            .map_err(|e| FeedError::Config(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FeedResult<()> {
        if self.default_per_page == 0 {
            return Err(FeedError::Config(
                "default_per_page must be at least 1".to_string(),
            ));
        }
        if self.max_subevent_depth > SUBEVENT_DEPTH_CEILING {
            return Err(FeedError::Config(format!(
                "max_subevent_depth must be at most {SUBEVENT_DEPTH_CEILING}, got {}",
                self.max_subevent_depth
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FeedConfig::default();
        assert_eq!(config.default_per_page, 10);
        assert_eq!(config.max_subevent_depth, DEFAULT_MAX_SUBEVENT_DEPTH);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = FeedConfig::from_json(r#"{"max_subevent_depth": 3}"#).unwrap();
        assert_eq!(config.default_per_page, 10);
        assert_eq!(config.max_subevent_depth, 3);
    }

    #[test]
    fn test_depth_above_ceiling_rejected() {
        let err = FeedConfig::from_json(r#"{"max_subevent_depth": 100000}"#).unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));

        let config = FeedConfig::from_json(r#"{"max_subevent_depth": 256}"#).unwrap();
        assert_eq!(config.max_subevent_depth, SUBEVENT_DEPTH_CEILING);
    }

    #[test]
    fn test_unbounded_depth_is_not_a_valid_config() {
        assert!(FeedConfig::from_json(r#"{"max_subevent_depth": null}"#).is_err());
    }

    #[test]
    fn test_zero_per_page_rejected() {
        let err = FeedConfig::from_json(r#"{"default_per_page": 0}"#).unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"default_per_page": 25}"#).unwrap();

        let config = FeedConfig::read_from_file(&path).unwrap();
        assert_eq!(config.default_per_page, 25);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FeedConfig::read_from_file(&dir.path().join("nope.json"));
        assert!(result.is_err());
    }
}
