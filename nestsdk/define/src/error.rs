//! Error types for loading API documents.

use thiserror::Error;

/// Errors that can occur while loading an API description.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The input file could not be read.
    #[error("Failed to read API document '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The input is not JSON, or does not have the expected document shape.
    #[error("Failed to parse API document: {0}")]
    Parse(#[from] serde_json::Error),
}
