//! Layered error definitions
//!
//! Categorized by source: config / coordinator / general.
//! Refusals are NOT errors; they travel through the failure continuation.

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum UploadError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Coordinator Errors =====
    /// Request resolution for an id that was never submitted
    #[error("unknown item: {item_id}")]
    UnknownItem { item_id: String },

    /// Request resolution for an item that is not in the queue
    #[error("item '{item_id}' is not queued (status: {status})")]
    ItemNotQueued { item_id: String, status: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl UploadError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create unknown-item error
    pub fn unknown_item(item_id: impl Into<String>) -> Self {
        Self::UnknownItem {
            item_id: item_id.into(),
        }
    }

    /// Create not-queued error
    pub fn item_not_queued(item_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self::ItemNotQueued {
            item_id: item_id.into(),
            status: status.into(),
        }
    }
}
