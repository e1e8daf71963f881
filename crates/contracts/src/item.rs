//! Upload item descriptors and send-time request resolution output.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::ItemId;

/// A file the caller wants to upload.
///
/// The coordinator never touches file contents; transport owns the bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadItem {
    /// Unique identifier, assigned by the caller
    pub id: ItemId,

    /// Original filename, for logs and hooks
    pub name: String,

    /// Size on disk in bytes
    pub size_bytes: u64,
}

impl UploadItem {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size_bytes,
        }
    }
}

/// Queue status of a submitted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Submission check is still pending (deferred decision)
    AwaitingCheck,
    /// Admitted; eligible for request resolution
    Queued,
    /// Refused by a check or by the item limit
    Rejected,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AwaitingCheck => "awaiting_check",
            Self::Queued => "queued",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// The fully-resolved request for one item, produced at send time.
///
/// Endpoint and parameters come from the override stores; lazy parameters
/// have already been evaluated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundRequest {
    /// Target endpoint (absolute URL or site-relative path)
    pub endpoint: String,

    /// Materialized request parameters (JSON object)
    pub params: Value,
}
