//! Buffer configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{BufferError, RecordShape, Result};

/// Configuration for a bounded sampling buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Maximum number of records held at once
    pub capacity: usize,
    /// Seed for the sampling RNG; entropy-seeded when absent
    pub seed: Option<u64>,
    /// Shape every record must have; locked by the first insert when absent
    pub record_shape: Option<RecordShape>,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            seed: None,
            record_shape: None,
        }
    }
}

impl BufferConfig {
    /// Create a configuration with the given capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Use a fixed RNG seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Declare the record shape up front
    #[must_use]
    pub fn with_record_shape(mut self, shape: impl Into<RecordShape>) -> Self {
        self.record_shape = Some(shape.into());
        self
    }

    /// Check that the configuration can produce a buffer
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(BufferError::InvalidConfiguration(
                "capacity must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a JSON configuration file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), capacity = config.capacity, "loaded buffer config");
        Ok(config)
    }

    /// Write the configuration as JSON
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}
