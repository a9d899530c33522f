use async_trait::async_trait;
use std::time::Duration;

/// Cache trait - storage for rendered fragments keyed by string.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a value; expired entries read as absent.
    async fn get(&self, key: &str) -> Option<String>;

    /// Set a value, optionally expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;
}

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
