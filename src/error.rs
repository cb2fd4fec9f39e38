//! Error types for castlist.
//!
//! Resolution itself never fails: given well-typed mentions it always produces
//! a character list. Errors only arise around it, when configuration is loaded
//! and compiled, when an extraction payload is parsed, when the cache is
//! touched, or when the worker runtime cannot accept a job.

use thiserror::Error;

use crate::storage::StorageError;

/// Configuration errors, raised when a resolver is constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid blacklist pattern '{pattern}': {reason}")]
    InvalidPattern {
        pattern: String,
        reason: String,
    },

    #[error("Fuzzy threshold {value} is out of range [0.0, 1.0]")]
    InvalidThreshold {
        value: f64,
    },

    #[error("Pattern group '{name}' has no tokens")]
    EmptyPatternGroup {
        name: String,
    },

    #[error("Failed to read config '{path}': {message}")]
    Io {
        path: String,
        message: String,
    },

    #[error("Failed to parse config: {message}")]
    Parse {
        message: String,
    },
}

/// Errors from parsing an upstream extraction payload.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Extraction payload is not valid JSON: {message}")]
    InvalidJson {
        message: String,
    },

    #[error("Extraction payload has unexpected shape: expected a list of characters, found {found}")]
    UnexpectedShape {
        found: String,
    },

    #[error("Failed to read extraction payload '{path}': {message}")]
    Io {
        path: String,
        message: String,
    },
}

/// Errors from the per-document resolution runtime.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Resolution queue is full (capacity {capacity})")]
    QueueFull {
        capacity: usize,
    },

    #[error("Resolution worker disconnected")]
    Disconnected,

    #[error("Resolution timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },

    #[error("Failed to spawn resolution worker: {message}")]
    WorkerSpawn {
        message: String,
    },
}

/// Top-level error type for castlist.
#[derive(Debug, Error)]
pub enum CastlistError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
}

impl CastlistError {
    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is an extraction payload error.
    #[must_use]
    pub const fn is_extraction(&self) -> bool {
        matches!(self, Self::Extraction(_))
    }

    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Execution(e) => matches!(
                e,
                ExecutionError::QueueFull { .. } | ExecutionError::Timeout { .. }
            ),
            Self::Config(_) | Self::Extraction(_) | Self::Storage(_) => false,
        }
    }
}

/// Result type alias for castlist operations.
pub type CastlistResult<T> = Result<T, CastlistError>;
