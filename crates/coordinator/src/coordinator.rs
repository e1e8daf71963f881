//! UploadCoordinator - stores, gate, and item lifecycle in one owner.

use serde_json::Value;
use tracing::{debug, info, warn};

use contracts::{
    ItemId, ItemStatus, OutboundRequest, RequestParams, UploadError, UploadItem,
    UploaderBlueprint,
};
use dispatcher::{CallbackOutcome, CheckGate, CheckedCallback, DeferredResult, GateDecision,
    GateSnapshot};
use override_store::{EndpointStore, ParamsStore};

use crate::registry::ItemRegistry;

/// Outcome of [`UploadCoordinator::submit`].
#[derive(Debug)]
pub enum SubmitDecision {
    /// Admitted synchronously
    Queued,
    /// Refused synchronously (check refusal or item limit)
    Rejected,
    /// Check deferred; the registry updates when it settles
    Pending(DeferredResult<Value>),
}

/// The owning level of the decision core.
///
/// Holds the two override stores, the check gate, and the item registry.
/// A single owner mutates configuration; settlement continuations only
/// touch the shared registry.
pub struct UploadCoordinator {
    params: ParamsStore,
    endpoints: EndpointStore,
    registry: ItemRegistry,
    gate: CheckGate,
    item_limit: usize,
}

impl UploadCoordinator {
    /// Build a coordinator seeded from a validated blueprint.
    pub fn new(blueprint: &UploaderBlueprint) -> Self {
        info!(
            endpoint = %blueprint.request.endpoint,
            default_params = blueprint.request.params.len(),
            item_limit = blueprint.limits.item_limit,
            "Upload coordinator ready"
        );

        Self {
            params: ParamsStore::new(blueprint.request_params()),
            endpoints: EndpointStore::new(blueprint.request.endpoint.clone()),
            registry: ItemRegistry::new(),
            gate: CheckGate::new(),
            item_limit: blueprint.limits.item_limit,
        }
    }

    // ===== Configuration surface =====

    /// Set request parameters for one item, or the baseline for all.
    pub fn set_params(&mut self, params: RequestParams, id: Option<ItemId>) {
        debug!(id = ?id, count = params.len(), "Setting request parameters");
        self.params.set(params, id);
    }

    /// Set the endpoint for one item, or the baseline for all.
    pub fn set_endpoint(&mut self, endpoint: impl Into<String>, id: Option<ItemId>) {
        let endpoint = endpoint.into();
        debug!(id = ?id, endpoint = %endpoint, "Setting endpoint");
        self.endpoints.set(endpoint, id);
    }

    /// Drop all per-item parameter overrides.
    pub fn reset_params(&mut self) {
        self.params.reset();
    }

    /// Drop all per-item endpoint overrides.
    pub fn reset_endpoint(&mut self) {
        self.endpoints.reset();
    }

    /// Parameters that currently apply to `id` (default if unset).
    pub fn params_for(&self, id: Option<&ItemId>) -> RequestParams {
        self.params.get(id)
    }

    /// Endpoint that currently applies to `id` (default if unset).
    pub fn endpoint_for(&self, id: Option<&ItemId>) -> String {
        self.endpoints.get(id)
    }

    // ===== Submission gate =====

    /// Submit an item through a checked callback.
    ///
    /// The item limit is enforced first; a full queue is a refusal like any
    /// other, not an error. Otherwise the check decides: permit queues the
    /// item, refusal rejects it, and a deferred check parks it as
    /// `AwaitingCheck` until the producer settles.
    pub fn submit<F>(&mut self, item: UploadItem, check: F) -> SubmitDecision
    where
        F: FnOnce() -> CallbackOutcome<Value> + Send + 'static,
    {
        if self.item_limit > 0 && self.registry.admitted() >= self.item_limit {
            warn!(
                item_id = %item.id,
                limit = self.item_limit,
                "Item limit reached, refusing item"
            );
            self.registry.insert(item, ItemStatus::Rejected);
            return SubmitDecision::Rejected;
        }

        let id = item.id.clone();
        debug!(item_id = %id, name = %item.name, size_bytes = item.size_bytes, "Submitting item");
        self.registry.insert(item, ItemStatus::AwaitingCheck);

        let registry = self.registry.clone();
        let ok_id = id.clone();
        let spec = CheckedCallback::new(check, move |value: Value| {
            debug!(item_id = %ok_id, value = %value, "Submission check passed");
            registry.set_status(&ok_id, ItemStatus::Queued);
        });

        let registry = self.registry.clone();
        let fail_id = id.clone();
        let spec = spec.on_failure(move || {
            debug!(item_id = %fail_id, "Submission check refused");
            registry.set_status(&fail_id, ItemStatus::Rejected);
        });

        match self.gate.dispatch(id.as_str(), spec) {
            GateDecision::Permitted(_) => SubmitDecision::Queued,
            GateDecision::Refused => SubmitDecision::Rejected,
            GateDecision::Pending(deferred) => SubmitDecision::Pending(deferred),
        }
    }

    // ===== Send-time resolution =====

    /// Resolve the outbound request for a queued item.
    ///
    /// This is the send-time step: endpoint and parameters are read from
    /// the stores and lazy parameters are evaluated here, never earlier.
    /// Asking for an unknown or non-queued item is caller misuse.
    pub fn resolve_request(&self, id: &ItemId) -> Result<OutboundRequest, UploadError> {
        match self.registry.status(id) {
            None => Err(UploadError::unknown_item(id.as_str())),
            Some(ItemStatus::Queued) => {
                let endpoint = self.endpoints.get(Some(id));
                let params = self.params.get(Some(id)).materialize();
                debug!(item_id = %id, endpoint = %endpoint, "Outbound request resolved");
                Ok(OutboundRequest { endpoint, params })
            }
            Some(status) => Err(UploadError::item_not_queued(id.as_str(), status.to_string())),
        }
    }

    // ===== Observers =====

    pub fn status(&self, id: &ItemId) -> Option<ItemStatus> {
        self.registry.status(id)
    }

    pub fn queued_items(&self) -> Vec<ItemId> {
        self.registry.queued()
    }

    pub fn item_count(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    pub fn gate_snapshot(&self) -> GateSnapshot {
        self.gate.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ParamValue;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn blueprint() -> UploaderBlueprint {
        let mut bp = UploaderBlueprint::default();
        bp.request.endpoint = "/upload".to_string();
        bp.request.params.insert("source".into(), json!("test"));
        bp
    }

    fn item(id: &str) -> UploadItem {
        UploadItem::new(id, format!("{id}.bin"), 1024)
    }

    #[test]
    fn test_sync_permit_queues_item() {
        let mut coord = UploadCoordinator::new(&blueprint());
        let decision = coord.submit(item("a"), || CallbackOutcome::Permit(Value::Null));

        assert!(matches!(decision, SubmitDecision::Queued));
        assert_eq!(coord.status(&"a".into()), Some(ItemStatus::Queued));
        assert_eq!(coord.gate_snapshot().permitted, 1);
    }

    #[test]
    fn test_sync_refuse_rejects_item() {
        let mut coord = UploadCoordinator::new(&blueprint());
        let decision = coord.submit(item("a"), || CallbackOutcome::Refuse);

        assert!(matches!(decision, SubmitDecision::Rejected));
        assert_eq!(coord.status(&"a".into()), Some(ItemStatus::Rejected));
        assert!(coord.queued_items().is_empty());
    }

    #[test]
    fn test_item_limit_refuses_before_check_runs() {
        let mut bp = blueprint();
        bp.limits.item_limit = 1;
        let mut coord = UploadCoordinator::new(&bp);

        assert!(matches!(
            coord.submit(item("a"), || CallbackOutcome::Permit(Value::Null)),
            SubmitDecision::Queued
        ));

        let check_ran = Arc::new(AtomicU64::new(0));
        let probe = Arc::clone(&check_ran);
        let decision = coord.submit(item("b"), move || {
            probe.fetch_add(1, Ordering::SeqCst);
            CallbackOutcome::Permit(Value::Null)
        });

        assert!(matches!(decision, SubmitDecision::Rejected));
        assert_eq!(check_ran.load(Ordering::SeqCst), 0);
        assert_eq!(coord.status(&"b".into()), Some(ItemStatus::Rejected));
    }

    #[tokio::test]
    async fn test_deferred_check_updates_registry_on_settlement() {
        let mut coord = UploadCoordinator::new(&blueprint());

        let deferred: DeferredResult<Value> = DeferredResult::new();
        let inner = deferred.clone();
        let decision = coord.submit(item("a"), move || CallbackOutcome::Pending(inner));

        let returned = match decision {
            SubmitDecision::Pending(d) => d,
            other => panic!("expected Pending, got {other:?}"),
        };
        assert!(returned.ptr_eq(&deferred));
        assert_eq!(coord.status(&"a".into()), Some(ItemStatus::AwaitingCheck));

        let producer = deferred.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            producer.succeed(json!("quota ok")).unwrap();
        })
        .await
        .unwrap();

        assert_eq!(coord.status(&"a".into()), Some(ItemStatus::Queued));
        assert_eq!(coord.gate_snapshot().deferred_permitted, 1);
    }

    #[tokio::test]
    async fn test_deferred_failure_rejects_item() {
        let mut coord = UploadCoordinator::new(&blueprint());

        let deferred: DeferredResult<Value> = DeferredResult::new();
        let inner = deferred.clone();
        coord.submit(item("a"), move || CallbackOutcome::Pending(inner));

        deferred.fail().unwrap();
        assert_eq!(coord.status(&"a".into()), Some(ItemStatus::Rejected));
        assert!(coord.resolve_request(&"a".into()).is_err());
    }

    #[test]
    fn test_resolve_request_uses_defaults_then_overrides() {
        let mut coord = UploadCoordinator::new(&blueprint());
        coord.submit(item("a"), || CallbackOutcome::Permit(Value::Null));
        coord.submit(item("b"), || CallbackOutcome::Permit(Value::Null));

        // Defaults apply where no override exists
        let request = coord.resolve_request(&"a".into()).unwrap();
        assert_eq!(request.endpoint, "/upload");
        assert_eq!(request.params, json!({"source": "test"}));

        // Per-item overrides replace the defaults for that item only
        let mut params = RequestParams::new();
        params.insert("hello", ParamValue::text("world"));
        coord.set_params(params, Some("b".into()));
        coord.set_endpoint("/priority", Some("b".into()));

        let request = coord.resolve_request(&"b".into()).unwrap();
        assert_eq!(request.endpoint, "/priority");
        assert_eq!(request.params, json!({"hello": "world"}));

        let request = coord.resolve_request(&"a".into()).unwrap();
        assert_eq!(request.endpoint, "/upload");

        // Reset drops the overrides; both items see the baseline again
        coord.reset_params();
        coord.reset_endpoint();
        let request = coord.resolve_request(&"b".into()).unwrap();
        assert_eq!(request.endpoint, "/upload");
        assert_eq!(request.params, json!({"source": "test"}));
    }

    #[test]
    fn test_lazy_params_evaluated_at_resolve_time_only() {
        let mut coord = UploadCoordinator::new(&blueprint());
        coord.submit(item("a"), || CallbackOutcome::Permit(Value::Null));

        let calls = Arc::new(AtomicU64::new(0));
        let probe = Arc::clone(&calls);
        let mut params = RequestParams::new();
        params.insert(
            "signature",
            ParamValue::lazy(move || {
                probe.fetch_add(1, Ordering::SeqCst);
                ParamValue::Literal(json!("sig-v1"))
            }),
        );
        coord.set_params(params, Some("a".into()));

        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let request = coord.resolve_request(&"a".into()).unwrap();
        assert_eq!(request.params, json!({"signature": "sig-v1"}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Every send re-evaluates
        coord.resolve_request(&"a".into()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_resolve_unknown_item_is_misuse() {
        let coord = UploadCoordinator::new(&blueprint());
        let err = coord.resolve_request(&"ghost".into()).unwrap_err();
        assert!(matches!(err, UploadError::UnknownItem { .. }));
    }

    #[test]
    fn test_resolve_rejected_item_is_misuse() {
        let mut coord = UploadCoordinator::new(&blueprint());
        coord.submit(item("a"), || CallbackOutcome::Refuse);

        let err = coord.resolve_request(&"a".into()).unwrap_err();
        assert!(matches!(err, UploadError::ItemNotQueued { .. }));
    }
}
