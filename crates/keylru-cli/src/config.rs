//! Loads the cache config from a JSON file and command-line overrides

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use keylru::CacheConfig;

/// Capacity used when neither a config file nor `--capacity` is given
pub const DEFAULT_CAPACITY: usize = 1024;

/// Build a validated config: file first, then `capacity` override
pub fn load(path: Option<&Path>, capacity: Option<usize>) -> Result<CacheConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<CacheConfig>(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => CacheConfig::new(DEFAULT_CAPACITY),
    };

    if let Some(capacity) = capacity {
        config.capacity = capacity;
    }

    config.validate()?;
    Ok(config)
}
