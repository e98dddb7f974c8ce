//! Error types for Flowdraft.
//!
//! All errors in Flowdraft are represented by the `FlowdraftError` enum.
//! Layout degradations (missing selection, no free gap) are not errors:
//! they are logged and the engine falls back to a usable position.

use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Flowdraft operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum FlowdraftError {
    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML).
    #[error("{0}")]
    Convert(String),

    /// Node lookup or definition errors.
    #[error("{0}")]
    Node(String),

    /// Edge definition errors.
    #[error("{0}")]
    Edge(String),

    /// Selection state errors.
    #[error("{0}")]
    Selection(String),

    /// Viewport errors.
    #[error("{0}")]
    Viewport(String),

    /// Workflow document errors.
    #[error("{0}")]
    Workflow(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl From<FlowdraftError> for String {
    fn from(val: FlowdraftError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for FlowdraftError {
    fn from(error: std::io::Error) -> Self {
        FlowdraftError::IoError(error.to_string())
    }
}

impl From<FlowdraftError> for std::io::Error {
    fn from(val: FlowdraftError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<serde_json::Error> for FlowdraftError {
    fn from(error: serde_json::Error) -> Self {
        FlowdraftError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for FlowdraftError {
    fn from(error: toml::de::Error) -> Self {
        FlowdraftError::Config(error.to_string())
    }
}

impl From<globset::Error> for FlowdraftError {
    fn from(error: globset::Error) -> Self {
        FlowdraftError::Config(format!("invalid glob pattern: {}", error))
    }
}
