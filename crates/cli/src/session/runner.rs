//! Session runner - drives the decision core with synthetic items.
//!
//! Transport stays a stand-in: resolved requests are logged, not sent.
//! The point of the session is to exercise the gate (sync and deferred),
//! the override stores, and send-time request resolution end to end.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use contracts::{ItemStatus, ParamValue, RequestParams, UploadItem, UploaderBlueprint};
use coordinator::{SubmitDecision, UploadCoordinator};
use dispatcher::{CallbackOutcome, DeferredResult};
use observability::{
    record_check_decision, record_deferred_settled, record_gate_snapshot, record_item_queued,
    record_item_rejected, record_queue_depth,
};

use super::SessionStats;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The uploader blueprint configuration
    pub blueprint: UploaderBlueprint,

    /// Number of synthetic items to submit
    pub items: u64,

    /// Size-check threshold in KiB
    pub max_size_kb: u64,

    /// Deferred quota-check delay (None = synchronous checks)
    pub quota_delay: Option<Duration>,

    /// Baseline endpoint override from the CLI
    pub endpoint_override: Option<String>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Synthetic item sizes cycle through these, so a default threshold of
/// 1024 KiB refuses every fourth item.
const SIZE_CYCLE_KB: [u64; 4] = [64, 256, 512, 2048];

/// Mock upload session orchestrator
pub struct Session {
    config: SessionConfig,
}

impl Session {
    /// Create a new session with the given configuration
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run the session to completion
    pub async fn run(self) -> Result<SessionStats> {
        let start_time = Instant::now();

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let mut coordinator = UploadCoordinator::new(&self.config.blueprint);

        // Apply runtime configuration on top of the blueprint
        if let Some(ref endpoint) = self.config.endpoint_override {
            config_loader::validate_endpoint(endpoint, "cli.endpoint")
                .context("Invalid --endpoint override")?;
            coordinator.set_endpoint(endpoint.clone(), None);
        }

        // A lazy session parameter: evaluated per request at send time
        let session_started = start_time;
        let mut params = coordinator.params_for(None);
        merge_session_params(&mut params, session_started);
        coordinator.set_params(params, None);

        let mut stats = SessionStats {
            items_submitted: self.config.items,
            ..Default::default()
        };

        // Submission phase
        let mut settlements: Vec<JoinHandle<()>> = Vec::new();
        let max_bytes = self.config.max_size_kb * 1024;

        info!(
            items = self.config.items,
            max_size_kb = self.config.max_size_kb,
            mode = if self.config.quota_delay.is_some() { "deferred" } else { "sync" },
            "Submitting items"
        );

        for index in 0..self.config.items {
            let item = synthetic_item(index);
            let size = item.size_bytes;

            match self.config.quota_delay {
                None => {
                    let decision =
                        coordinator.submit(item, move || size_check(size, max_bytes));
                    match decision {
                        SubmitDecision::Queued => {
                            record_check_decision("sync_permit");
                            record_item_queued();
                        }
                        SubmitDecision::Rejected => {
                            record_check_decision("sync_refuse");
                            record_item_rejected();
                        }
                        SubmitDecision::Pending(_) => {
                            warn!(index, "Synchronous check came back pending");
                        }
                    }
                }
                Some(delay) => {
                    // The quota decision arrives later, from a timer task
                    let deferred: DeferredResult<Value> = DeferredResult::new();
                    let producer = deferred.clone();
                    settlements.push(tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let permitted = size <= max_bytes;
                        record_deferred_settled(permitted);
                        let settled = if permitted {
                            producer.succeed(json!({ "quota": "ok", "size_bytes": size }))
                        } else {
                            producer.fail()
                        };
                        if settled.is_err() {
                            warn!("Quota deferred was already settled");
                        }
                    }));

                    let inner = deferred.clone();
                    let decision =
                        coordinator.submit(item, move || CallbackOutcome::Pending(inner));
                    if matches!(decision, SubmitDecision::Pending(_)) {
                        record_check_decision("deferred_open");
                        stats.deferred_opened += 1;
                    }
                }
            }
        }

        // Wait for all deferred settlements to land
        for handle in settlements {
            handle.await.context("Quota settlement task panicked")?;
        }

        stats.queued = coordinator.registry().count_with(ItemStatus::Queued) as u64;
        stats.rejected = coordinator.registry().count_with(ItemStatus::Rejected) as u64;
        stats.awaiting = coordinator.registry().count_with(ItemStatus::AwaitingCheck) as u64;
        record_queue_depth(stats.queued as usize);

        // Send phase: resolve each queued item and hand off (transport stub)
        for id in coordinator.queued_items() {
            match coordinator.resolve_request(&id) {
                Ok(request) => {
                    info!(
                        item_id = %id,
                        endpoint = %request.endpoint,
                        params = %request.params,
                        "Dispatching upload request (transport stub)"
                    );
                    stats.requests_sent += 1;
                }
                Err(e) => {
                    warn!(item_id = %id, error = %e, "Request resolution failed");
                }
            }
        }

        let snapshot = coordinator.gate_snapshot();
        record_gate_snapshot(&snapshot);
        stats.gate.update(&snapshot);
        stats.duration = start_time.elapsed();

        info!(
            queued = stats.queued,
            rejected = stats.rejected,
            sent = stats.requests_sent,
            duration_secs = stats.duration.as_secs_f64(),
            "Session complete"
        );

        Ok(stats)
    }
}

/// Build the synthetic item for `index`
fn synthetic_item(index: u64) -> UploadItem {
    let size_kb = SIZE_CYCLE_KB[(index as usize) % SIZE_CYCLE_KB.len()];
    UploadItem::new(
        format!("item-{index:03}"),
        format!("file_{index:03}.bin"),
        size_kb * 1024,
    )
}

/// Synchronous size check: permit with the observed size, refuse oversize
fn size_check(size_bytes: u64, max_bytes: u64) -> CallbackOutcome<Value> {
    if size_bytes <= max_bytes {
        CallbackOutcome::Permit(json!({ "size_bytes": size_bytes }))
    } else {
        debug!(size_bytes, max_bytes, "Size check refused item");
        CallbackOutcome::Refuse
    }
}

/// Add session-scoped parameters on top of the configured defaults
fn merge_session_params(params: &mut RequestParams, session_started: Instant) {
    params.insert("session", ParamValue::text("mock"));
    // Lazy: each request reports its own age at send time
    params.insert(
        "session_age_ms",
        ParamValue::lazy(move || {
            ParamValue::Literal(json!(session_started.elapsed().as_millis() as u64))
        }),
    );
}
