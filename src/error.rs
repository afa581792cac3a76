//! Error types for the AWD exporter.

use thiserror::Error;

/// Result type alias using ExportError.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Main error type for scene export operations.
///
/// Every variant is fatal for the export it came from: nothing is retried and
/// no partial file is left behind.
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error while writing to the sink or touching the target file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a JSON scene description or options file.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A count or length does not fit the width the format gives it.
    #[error("Capacity exceeded: {0}")]
    Capacity(String),

    /// A scene node points at a geometry block that was never added to the container.
    #[error("Scene node '{node}' (block {node_id}) references a geometry block that is not in the container")]
    UnresolvedReference { node: String, node_id: u32 },

    /// Collaborator input was rejected before any block was built.
    #[error("Invalid mesh '{mesh}': {reason}")]
    InvalidInput { mesh: String, reason: String },

    /// The container was already flushed and no longer accepts changes.
    #[error("Container has already been flushed")]
    Finalized,
}

impl ExportError {
    pub(crate) fn invalid_input(mesh: &str, reason: impl Into<String>) -> Self {
        ExportError::InvalidInput {
            mesh: mesh.to_string(),
            reason: reason.into(),
        }
    }
}
