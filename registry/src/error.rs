//! Error types for schema registry operations.
//!
//! Provides a unified error type covering I/O, serialization, schema
//! generation, bundle hash verification, and lookup failures.

use entity_schema_core::GenerateError;
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Generating a schema from a type description failed.
    #[error("schema generation failed: {0}")]
    GenerateError(#[from] GenerateError),

    /// Bundle hash does not match the bundled schemas.
    #[error("invalid checksum: {0}")]
    InvalidChecksum(String),

    /// A schema failed structural checks while loading in strict mode.
    #[error("schema {name} is malformed: {details}")]
    InvalidSchema { name: String, details: String },

    /// No schema is registered under the requested name.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// All configured loader sources failed.
    #[error("no schema sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;
