//! Codec configuration.
//!
//! Holds the cache namespace and the nesting limit. Defaults suit a single
//! application with no namespace partitioning. Override via environment
//! variables or explicit construction.

use serde::Deserialize;

/// Default maximum nesting depth for pack and unpack.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration for a [`Codec`](crate::Codec).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Namespace written into the outer envelope by `dumps`.
    /// Empty means no envelope.
    pub namespace: String,
    /// Deepest container nesting accepted in either direction.
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CodecConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CACHEPACK_NAMESPACE` (default: empty, no envelope)
    /// - `CACHEPACK_MAX_DEPTH` (default: 128, must be a positive integer)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            namespace: std::env::var("CACHEPACK_NAMESPACE").unwrap_or_default(),
            max_depth: env_depth("CACHEPACK_MAX_DEPTH", DEFAULT_MAX_DEPTH)?,
        })
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check values that deserialization or the builders let through.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth("0".to_string()));
        }
        Ok(())
    }
}

fn env_depth(var: &str, default: usize) -> Result<usize, ConfigError> {
    let Ok(raw) = std::env::var(var) else {
        return Ok(default);
    };
    match raw.trim().parse::<usize>() {
        Ok(depth) if depth > 0 => Ok(depth),
        _ => Err(ConfigError::InvalidMaxDepth(raw)),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max depth must be a positive integer, got {0:?}")]
    InvalidMaxDepth(String),
}
