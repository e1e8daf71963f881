//! # Coordinator
//!
//! Owning level of the upload decision core.
//!
//! Responsibilities:
//! - Seed and expose the per-item override stores (params, endpoint)
//! - Gate item submission through checked callbacks
//! - Track item status across deferred settlements
//! - Resolve the outbound request (endpoint + materialized params) at send time
//!
//! Transport is not here: callers take the resolved [`OutboundRequest`]
//! (re-exported from `contracts`) and hand it to whatever owns the wire.

mod coordinator;
mod registry;

pub use contracts::{OutboundRequest, UploadItem};
pub use coordinator::{SubmitDecision, UploadCoordinator};
pub use registry::ItemRegistry;
