//! Error types for the inventory client.

use crate::types::ItemId;
use thiserror::Error;

/// Main error type for client operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Rejected client-side, before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote service answered with a failure status, or could not be reached.
    #[error("{}", remote_message(.status, .message))]
    Remote { status: Option<u16>, message: String },

    /// The item is not part of the current snapshot.
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn remote_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Error {}: {}", code, message),
        None => format!("Request failed: {}", message),
    }
}

impl SyncError {
    /// Build a remote error for a failed HTTP status.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        SyncError::Remote {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Build a remote error for a transport failure (no response received).
    pub fn transport(message: impl Into<String>) -> Self {
        SyncError::Remote {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP status of a remote failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Remote { status, .. } => *status,
            _ => None,
        }
    }
}

// Decode paths only; encoders map to `Serialization` themselves.
impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Deserialization(e.to_string())
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, SyncError>;
