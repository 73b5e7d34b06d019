//! Store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Options for [`Store::open`](crate::store::Store::open).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// N-Quads file backing the dataset; `None` keeps everything in memory.
    pub path: Option<PathBuf>,
    /// Create the file if it doesn't exist.
    pub create_if_missing: bool,
    /// Register descriptions kept by the caching layer; 0 disables it.
    pub cache_size: usize,
    /// Base URI of the root register.
    pub base_uri: String,
    /// Enable verbose logging.
    pub verbose: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            create_if_missing: true,
            cache_size: 100,
            base_uri: "http://localhost/".to_string(),
            verbose: false,
        }
    }
}

impl StoreConfig {
    /// File-backed configuration.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    pub fn cache_size(mut self, value: usize) -> Self {
        self.cache_size = value;
        self
    }

    pub fn base_uri(mut self, value: impl Into<String>) -> Self {
        self.base_uri = value.into();
        self
    }

    pub fn verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = StoreConfig::new("/tmp/reg.nq")
            .create_if_missing(false)
            .cache_size(0)
            .base_uri("http://example.com/");
        assert_eq!(config.path, Some(PathBuf::from("/tmp/reg.nq")));
        assert!(!config.create_if_missing);
        assert_eq!(config.cache_size, 0);
        assert_eq!(config.base_uri, "http://example.com/");
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = StoreConfig::in_memory().verbose(true);
        let json = serde_json::to_string(&config).unwrap();
        let back: StoreConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
