//! Shared item status registry.
//!
//! Submission checks may settle asynchronously, so status updates arrive
//! from settlement continuations as well as from the synchronous path. The
//! registry is the single place both agree on an item's state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use contracts::{ItemId, ItemStatus, UploadItem};

struct ItemEntry {
    item: UploadItem,
    status: ItemStatus,
}

/// Clonable handle to the shared item table.
#[derive(Clone, Default)]
pub struct ItemRegistry {
    inner: Arc<Mutex<HashMap<ItemId, ItemEntry>>>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, item: UploadItem, status: ItemStatus) {
        let id = item.id.clone();
        self.lock().insert(id, ItemEntry { item, status });
    }

    pub(crate) fn set_status(&self, id: &ItemId, status: ItemStatus) {
        if let Some(entry) = self.lock().get_mut(id) {
            entry.status = status;
        }
    }

    /// Status of a submitted item; `None` if the id was never submitted.
    pub fn status(&self, id: &ItemId) -> Option<ItemStatus> {
        self.lock().get(id).map(|entry| entry.status)
    }

    /// Descriptor of a submitted item.
    pub fn item(&self, id: &ItemId) -> Option<UploadItem> {
        self.lock().get(id).map(|entry| entry.item.clone())
    }

    /// Ids currently queued, sorted for deterministic iteration.
    pub fn queued(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self
            .lock()
            .iter()
            .filter(|(_, entry)| entry.status == ItemStatus::Queued)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    /// Items admitted so far: everything not rejected.
    pub fn admitted(&self) -> usize {
        self.lock()
            .values()
            .filter(|entry| entry.status != ItemStatus::Rejected)
            .count()
    }

    pub fn count_with(&self, status: ItemStatus) -> usize {
        self.lock()
            .values()
            .filter(|entry| entry.status == status)
            .count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ItemId, ItemEntry>> {
        self.inner.lock().expect("item registry lock poisoned")
    }
}
