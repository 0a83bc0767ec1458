//! Cache configuration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Settings for constructing a [`Cache`](crate::Cache)
///
/// Deserializable so it can be embedded in a service's own config file:
///
/// ```
/// let config: keylru::CacheConfig =
///     serde_json::from_str(r#"{ "capacity": 128, "name": "users" }"#).unwrap();
/// assert_eq!(config.capacity, 128);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries (at least 1)
    pub capacity: usize,

    /// Label used in log events
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_name() -> String {
    "lru".to_string()
}

impl CacheConfig {
    /// Config with the given capacity and the default name
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            name: default_name(),
        }
    }

    /// Set the name used in log events
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Reject settings a cache cannot be built from
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidCapacity(self.capacity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_name() {
        let config: CacheConfig = serde_json::from_str(r#"{ "capacity": 4 }"#).unwrap();
        assert_eq!(config, CacheConfig::new(4));
        assert_eq!(config.name, "lru");
    }

    #[test]
    fn test_config_requires_capacity() {
        assert!(serde_json::from_str::<CacheConfig>(r#"{ "name": "x" }"#).is_err());
    }

    #[test]
    fn test_config_validate() {
        assert!(CacheConfig::new(1).validate().is_ok());
        assert_eq!(
            CacheConfig::new(0).with_name("empty").validate(),
            Err(Error::InvalidCapacity(0))
        );
    }
}
