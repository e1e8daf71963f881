//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Identity Model
//! - `ItemId` is the per-file key for configuration overrides and queue state
//! - Ids are assigned by the caller at submission time and never reused

mod blueprint;
mod error;
mod item;
mod item_id;
mod params;

pub use blueprint::*;
pub use error::*;
pub use item::*;
pub use item_id::ItemId;
pub use params::{LazyParam, ParamValue, RequestParams};
