use thiserror::Error;

use super::config::ConfigError;
use super::index::IndexError;
use crate::core::contact::ExpressionError;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid contact expression: {0}")]
    Expression(#[from] ExpressionError),

    #[error("Residue index error: {0}")]
    Index(#[from] IndexError),

    #[error("Model {model} cannot be used: {reason}")]
    InvalidModel { model: usize, reason: String },

    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Descriptors cannot be compared: {0}")]
    Uncomparable(String),

    #[error("File error for '{path}': {message}")]
    Io { path: PathBuf, message: String },

    #[error("Failed to write manifest: {0}")]
    Manifest(#[from] csv::Error),

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        EngineError::Io {
            path: path.into(),
            message: error.to_string(),
        }
    }
}
