//! Mock Session Example
//!
//! Demonstrates the full decision flow without a config file or transport:
//! submit items through sync and deferred checks, override per-item
//! configuration, and resolve outbound requests.
//!
//! Run with: cargo run --bin mock_session

use std::collections::HashMap;
use std::time::Duration;

use contracts::{ParamValue, UploadItem, UploaderBlueprint};
use coordinator::{SubmitDecision, UploadCoordinator};
use dispatcher::{CallbackOutcome, DeferredResult};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Mock Session Demo");

    // ==== Stage 1: Use default config or load from file ====
    let blueprint = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading uploader config");
        config_loader::ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        // Create a minimal test blueprint
        create_test_blueprint()
    };

    let mut coordinator = UploadCoordinator::new(&blueprint);

    // ==== Stage 2: Submit through a synchronous check ====
    let small = UploadItem::new("small", "notes.txt", 16 * 1024);
    let size = small.size_bytes;
    let decision = coordinator.submit(small, move || {
        if size <= 1024 * 1024 {
            CallbackOutcome::Permit(json!({"size_bytes": size}))
        } else {
            CallbackOutcome::Refuse
        }
    });
    tracing::info!(decision = ?decision, "Synchronous check decided");

    // ==== Stage 3: Submit through a deferred quota check ====
    let deferred: DeferredResult<Value> = DeferredResult::new();
    let inner = deferred.clone();
    let slow = UploadItem::new("slow", "archive.tar", 300 * 1024);
    let decision = coordinator.submit(slow, move || CallbackOutcome::Pending(inner));
    assert!(matches!(decision, SubmitDecision::Pending(_)));
    tracing::info!("Deferred check opened, settling in 100ms...");

    let producer = deferred.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        producer.succeed(json!({"quota": "ok"})).unwrap();
    })
    .await?;

    // ==== Stage 4: Per-item override, then resolve both requests ====
    let mut params = coordinator.params_for(None);
    params.insert("priority", ParamValue::text("high"));
    coordinator.set_params(params, Some("slow".into()));
    coordinator.set_endpoint("/priority", Some("slow".into()));

    for id in coordinator.queued_items() {
        let request = coordinator.resolve_request(&id)?;
        tracing::info!(
            item_id = %id,
            endpoint = %request.endpoint,
            params = %request.params,
            "Resolved outbound request"
        );
    }

    let snapshot = coordinator.gate_snapshot();
    tracing::info!(
        permitted = snapshot.permitted,
        pending_opened = snapshot.pending_opened,
        deferred_permitted = snapshot.deferred_permitted,
        "Demo finished"
    );

    Ok(())
}

/// Create a minimal test blueprint without a config file
fn create_test_blueprint() -> UploaderBlueprint {
    let mut blueprint = UploaderBlueprint::default();
    blueprint.request.endpoint = "/upload".to_string();
    blueprint.request.params = HashMap::from([
        ("source".to_string(), json!("demo")),
        ("tier".to_string(), json!("free")),
    ]);
    blueprint.limits.item_limit = 16;
    blueprint
}
