//! Error types for the nestsdk generator.

use nestsdk_define::{DocumentError, HttpVerb};
use thiserror::Error;

use crate::diagnostics::Diagnostics;

/// Errors that abort a generation run.
///
/// A run that returns one of these writes nothing: any previous output file
/// is left untouched.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The API document could not be read or parsed
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// An operation has no usable `operationId` and the run is strict.
    ///
    /// `diagnostics` holds everything the run recorded before it was
    /// stopped, including this operation.
    #[error(
        "Invalid operationId {} on {verb} {path}: expected '<controller>{separator}<method>'",
        display_operation_id(.operation_id)
    )]
    InvalidOperationId {
        path: String,
        verb: HttpVerb,
        operation_id: Option<String>,
        separator: String,
        diagnostics: Diagnostics,
    },

    /// Failed to generate code
    #[error("Code generation failed: {0}")]
    CodeGenError(String),

    /// Failed to write output file
    #[error("Failed to write output file '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The configuration file could not be read
    #[error("Failed to read configuration file '{path}': {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::config::GeneratorConfig`]
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

fn display_operation_id(operation_id: &Option<String>) -> String {
    match operation_id {
        Some(id) => format!("'{}'", id),
        None => "(missing)".to_string(),
    }
}
