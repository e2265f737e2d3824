use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::RagError;

/// Engine configuration. `Default` carries the stock constants; a
/// deployment can override any subset from a TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Characters per chunk.
    pub chunk_size: usize,
    /// Number of chunks retrieved per query.
    pub top_k: usize,
    /// Base URL of the local inference backend.
    pub base_url: String,
    /// Model used to generate answers.
    pub generation_model: String,
    /// Model used to embed chunks and queries.
    pub embedding_model: String,
    /// Timeout applied to each backend request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            top_k: 3,
            base_url: "http://localhost:11434".to_string(),
            generation_model: "llama3".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file. Missing fields fall back to
    /// the defaults; unknown fields are rejected.
    pub fn from_toml_path(path: &Path) -> Result<Self, RagError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| RagError::InvalidConfiguration(format!("{}: {}", path.display(), e)))?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| RagError::InvalidConfiguration(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_size == 0 {
            return Err(RagError::InvalidConfiguration(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.top_k == 0 {
            return Err(RagError::InvalidConfiguration(
                "top_k must be greater than 0".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(RagError::InvalidConfiguration(
                "base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
