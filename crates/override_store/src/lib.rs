//! # Override Store
//!
//! Id-keyed configuration overlay with a global default.
//!
//! Responsibilities:
//! - Resolve per-item configuration: override if present, else the default
//! - Replace the baseline for everyone via a keyless `set`
//! - Drop all per-item overrides on `reset`
//!
//! # Example
//!
//! ```
//! use override_store::EndpointStore;
//!
//! let mut store = EndpointStore::new("/upload".to_string());
//! store.set("/priority".to_string(), Some("item-1".into()));
//!
//! assert_eq!(store.get(Some(&"item-1".into())), "/priority");
//! assert_eq!(store.get(Some(&"item-2".into())), "/upload");
//!
//! store.reset();
//! assert_eq!(store.get(Some(&"item-1".into())), "/upload");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::debug;

use contracts::{ItemId, RequestParams};

/// Per-item request parameters with a global default.
pub type ParamsStore = OverrideStore<ItemId, RequestParams>;

/// Per-item upload endpoint with a global default.
pub type EndpointStore = OverrideStore<ItemId, String>;

/// Key-to-value map with a global default and reset-to-default semantics.
///
/// `get` hands out owned clones: callers never receive an alias into the
/// store, so successive reads are independent of each other and of later
/// mutations.
#[derive(Debug, Clone)]
pub struct OverrideStore<K, V> {
    defaults: V,
    overrides: HashMap<K, V>,
}

impl<K, V> OverrideStore<K, V>
where
    K: Eq + Hash + fmt::Debug,
    V: Clone,
{
    /// Create a store whose baseline is `defaults`.
    pub fn new(defaults: V) -> Self {
        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    /// Resolve the value for `key`.
    ///
    /// `Some(key)` returns the override for that key if one is installed,
    /// else the current default. `None` returns the current default. A
    /// missing key is expected, not exceptional.
    pub fn get(&self, key: Option<&K>) -> V {
        key.and_then(|k| self.overrides.get(k))
            .unwrap_or(&self.defaults)
            .clone()
    }

    /// Install an override for `key`, or replace the default outright.
    ///
    /// `set(v, None)` changes the baseline for every key that has no
    /// explicit override; installed overrides are untouched.
    pub fn set(&mut self, value: V, key: Option<K>) {
        match key {
            Some(k) => {
                debug!(key = ?k, "Installing per-key override");
                self.overrides.insert(k, value);
            }
            None => {
                debug!("Replacing store default");
                self.defaults = value;
            }
        }
    }

    /// Drop all per-key overrides.
    ///
    /// The default line is untouched: a default replaced via a keyless
    /// `set` stays replaced. Reset restores "use the current default",
    /// not the construction-time value.
    pub fn reset(&mut self) {
        let dropped = self.overrides.len();
        self.overrides.clear();
        debug!(dropped, "Cleared per-key overrides");
    }

    /// Number of installed per-key overrides.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Whether `key` has an explicit override.
    pub fn has_override(&self, key: &K) -> bool {
        self.overrides.contains_key(key)
    }
}
