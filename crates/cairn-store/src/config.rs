use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Settings for [`DiskObjectStore`](crate::DiskObjectStore).
///
/// Every field has a default, so a TOML document only needs the keys it
/// changes:
///
/// ```toml
/// root = "/var/lib/cairn"
/// compression_level = 3
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskStoreConfig {
    /// Store directory. Objects live under `objects/`, refs under `refs/`.
    pub root: PathBuf,
    /// zstd level for newly written objects; `None` stores them raw.
    pub compression_level: Option<i32>,
    /// Upper bound on concurrent file reads during a batch read.
    pub max_concurrency: usize,
}

impl DiskStoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_compression(mut self, level: i32) -> Self {
        self.compression_level = Some(level);
        self
    }

    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.max_concurrency == 0 {
            return Err(StoreError::Config("max_concurrency must be at least 1".into()));
        }
        if let Some(level) = self.compression_level {
            let range = zstd::compression_level_range();
            if !range.contains(&level) {
                return Err(StoreError::Config(format!(
                    "compression_level {level} outside {}..={}",
                    range.start(),
                    range.end()
                )));
            }
        }
        Ok(())
    }
}

impl Default for DiskStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".cairn"),
            compression_level: None,
            max_concurrency: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = DiskStoreConfig::default();
        assert_eq!(c.root, PathBuf::from(".cairn"));
        assert_eq!(c.compression_level, None);
        assert_eq!(c.max_concurrency, 8);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = DiskStoreConfig::from_toml_str("root = \"/tmp/objects\"\ncompression_level = 3\n").unwrap();
        assert_eq!(c.root, PathBuf::from("/tmp/objects"));
        assert_eq!(c.compression_level, Some(3));
        assert_eq!(c.max_concurrency, 8);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            DiskStoreConfig::from_toml_str("max_concurrency = 0"),
            Err(StoreError::Config(_))
        ));
        assert!(DiskStoreConfig::from_toml_str("compression_level = 1000").is_err());
        assert!(DiskStoreConfig::from_toml_str("root = [").is_err());
    }

    #[test]
    fn toml_round_trip() {
        let c = DiskStoreConfig::new("/data").with_compression(5);
        let text = toml::to_string(&c).unwrap();
        assert_eq!(DiskStoreConfig::from_toml_str(&text).unwrap(), c);
    }
}
