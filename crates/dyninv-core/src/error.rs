//! Core error types for dyninv-core

use dyninv_client::{TransportError, ValidationError};
use dyninv_inventory::InventoryError;
use thiserror::Error;

/// Errors that end a resolve/fetch/build cycle
///
/// None of these are recovered locally; a failed cycle produces no graph.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    /// Source string does not name a usable URL
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Document could not be retrieved
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Document was retrieved but has the wrong shape
    #[error("malformed inventory document from {url}: {error}")]
    Malformed {
        /// URL the document was fetched from
        url: String,
        /// Decoding failure
        #[source]
        error: InventoryError,
    },
}

impl SourceError {
    /// Short label for logs and exit reporting
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Validation(_) => "validation",
            SourceError::Transport(_) => "transport",
            SourceError::Malformed { .. } => "malformed",
        }
    }
}
