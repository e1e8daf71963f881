//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟 e2e 测试（无需真实传输层）
//! - 配置到发送全链路验证

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_status_vocabulary_is_stable() {
        use contracts::ItemStatus;

        // 状态字符串被日志与错误消息依赖
        assert_eq!(ItemStatus::Queued.to_string(), "queued");
        assert_eq!(ItemStatus::Rejected.to_string(), "rejected");
        assert_eq!(ItemStatus::AwaitingCheck.to_string(), "awaiting_check");
    }
}

#[cfg(test)]
mod store_tests {
    use contracts::{ParamValue, RequestParams};
    use override_store::{EndpointStore, ParamsStore};
    use serde_json::json;

    /// The classic params-store surface: set for one item, reset to defaults
    #[test]
    fn test_params_store_set_and_reset() {
        let mut store = ParamsStore::new(RequestParams::new());

        let mut params = RequestParams::new();
        params.insert("hello", ParamValue::text("world"));
        store.set(params.clone(), Some("foo".into()));
        assert_eq!(store.get(Some(&"foo".into())), params);

        store.reset();
        assert_eq!(store.get(Some(&"foo".into())), RequestParams::new());
    }

    /// Keyless set replaces the baseline for all items
    #[test]
    fn test_params_store_keyless_set() {
        let mut store = ParamsStore::new(RequestParams::new());

        let mut params = RequestParams::new();
        params.insert("hello", ParamValue::Literal(json!({"confusing": "world"})));
        store.set(params.clone(), None);

        assert_eq!(store.get(None), params);
        assert_eq!(store.get(Some(&"any".into())), params);
    }

    /// Endpoint store mirrors the same semantics with plain strings
    #[test]
    fn test_endpoint_store_set_and_reset() {
        let mut store = EndpointStore::new("/upload".to_string());

        store.set("/endpoint".to_string(), Some("foo".into()));
        assert_eq!(store.get(Some(&"foo".into())), "/endpoint");

        store.reset();
        assert_eq!(store.get(Some(&"foo".into())), "/upload");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ItemStatus, ParamValue, RequestParams, UploadItem};
    use coordinator::{SubmitDecision, UploadCoordinator};
    use dispatcher::{CallbackOutcome, DeferredResult};
    use observability::GateStatsAggregator;
    use serde_json::{json, Value};

    const SESSION_TOML: &str = r#"
[request]
endpoint = "/upload"

[request.params]
source = "e2e"

[limits]
item_limit = 8
"#;

    fn coordinator_from_config() -> UploadCoordinator {
        let blueprint = ConfigLoader::load_from_str(SESSION_TOML, ConfigFormat::Toml).unwrap();
        UploadCoordinator::new(&blueprint)
    }

    fn item(id: &str, size_bytes: u64) -> UploadItem {
        UploadItem::new(id, format!("{id}.bin"), size_bytes)
    }

    /// End-to-end: config -> coordinator -> mixed checks -> settlement -> resolution
    ///
    /// 验证完整的决策流：
    /// 1. 配置给出默认 endpoint 和参数
    /// 2. 同步与 deferred 校验混合提交
    /// 3. settle 后按覆盖/默认解析出站请求
    #[tokio::test]
    async fn test_e2e_mixed_session() {
        let mut coordinator = coordinator_from_config();

        // Synchronous permit and refusal
        assert!(matches!(
            coordinator.submit(item("small", 100), || CallbackOutcome::Permit(Value::Null)),
            SubmitDecision::Queued
        ));
        assert!(matches!(
            coordinator.submit(item("huge", 10_000_000), || CallbackOutcome::Refuse),
            SubmitDecision::Rejected
        ));

        // Two deferred checks: one will pass, one will fail
        let pass: DeferredResult<Value> = DeferredResult::new();
        let inner = pass.clone();
        coordinator.submit(item("slow-ok", 200), move || CallbackOutcome::Pending(inner));

        let fail: DeferredResult<Value> = DeferredResult::new();
        let inner = fail.clone();
        coordinator.submit(item("slow-no", 300), move || CallbackOutcome::Pending(inner));

        // Nothing settles before the producers do
        assert_eq!(
            coordinator.status(&"slow-ok".into()),
            Some(ItemStatus::AwaitingCheck)
        );

        let settle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            pass.succeed(json!({"quota": "ok"})).unwrap();
            fail.fail().unwrap();
        });
        settle.await.unwrap();

        assert_eq!(coordinator.status(&"slow-ok".into()), Some(ItemStatus::Queued));
        assert_eq!(coordinator.status(&"slow-no".into()), Some(ItemStatus::Rejected));

        // Per-item override for one queued item only
        let mut params = RequestParams::new();
        params.insert("hello", ParamValue::text("world"));
        coordinator.set_params(params, Some("slow-ok".into()));
        coordinator.set_endpoint("/priority", Some("slow-ok".into()));

        let request = coordinator.resolve_request(&"slow-ok".into()).unwrap();
        assert_eq!(request.endpoint, "/priority");
        assert_eq!(request.params, json!({"hello": "world"}));

        let request = coordinator.resolve_request(&"small".into()).unwrap();
        assert_eq!(request.endpoint, "/upload");
        assert_eq!(request.params, json!({"source": "e2e"}));

        // Reset drops the override; config defaults apply again
        coordinator.reset_params();
        coordinator.reset_endpoint();
        let request = coordinator.resolve_request(&"slow-ok".into()).unwrap();
        assert_eq!(request.endpoint, "/upload");
        assert_eq!(request.params, json!({"source": "e2e"}));

        // Gate counters line up with what happened
        let snapshot = coordinator.gate_snapshot();
        assert_eq!(snapshot.permitted, 1);
        assert_eq!(snapshot.refused, 1);
        assert_eq!(snapshot.pending_opened, 2);
        assert_eq!(snapshot.deferred_permitted, 1);
        assert_eq!(snapshot.deferred_refused, 1);
        assert_eq!(snapshot.pending_open(), 0);

        let mut aggregator = GateStatsAggregator::new();
        aggregator.update(&snapshot);
        let summary = aggregator.summary();
        assert_eq!(summary.total_checks, 4);
        assert!((summary.refusal_rate - 50.0).abs() < f64::EPSILON);
    }

    /// Lazy parameters from a runtime override are evaluated per send
    #[tokio::test]
    async fn test_e2e_lazy_params_evaluated_per_send() {
        let mut coordinator = coordinator_from_config();
        coordinator.submit(item("a", 100), || CallbackOutcome::Permit(Value::Null));

        let calls = Arc::new(AtomicU64::new(0));
        let probe = Arc::clone(&calls);
        let mut params = RequestParams::new();
        params.insert("source", ParamValue::text("e2e"));
        params.insert(
            "attempt",
            ParamValue::lazy(move || {
                let n = probe.fetch_add(1, Ordering::SeqCst) + 1;
                ParamValue::Literal(json!(n))
            }),
        );
        coordinator.set_params(params, None);

        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let first = coordinator.resolve_request(&"a".into()).unwrap();
        let second = coordinator.resolve_request(&"a".into()).unwrap();
        assert_eq!(first.params, json!({"source": "e2e", "attempt": 1}));
        assert_eq!(second.params, json!({"source": "e2e", "attempt": 2}));
    }

    /// The configured item limit admits exactly `limit` items
    #[tokio::test]
    async fn test_e2e_item_limit_enforced() {
        let mut coordinator = coordinator_from_config();

        for i in 0..10 {
            let id = format!("item-{i}");
            coordinator.submit(item(&id, 100), || CallbackOutcome::Permit(Value::Null));
        }

        assert_eq!(coordinator.queued_items().len(), 8);
        assert_eq!(coordinator.item_count(), 10);
        assert_eq!(
            coordinator.status(&"item-9".into()),
            Some(ItemStatus::Rejected)
        );
    }

    /// A deferred that the producer never settles stays parked
    #[tokio::test]
    async fn test_e2e_unsettled_deferred_stays_awaiting() {
        let mut coordinator = coordinator_from_config();

        let never: DeferredResult<Value> = DeferredResult::new();
        let inner = never.clone();
        coordinator.submit(item("stuck", 100), move || CallbackOutcome::Pending(inner));

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(
            coordinator.status(&"stuck".into()),
            Some(ItemStatus::AwaitingCheck)
        );
        assert!(coordinator.resolve_request(&"stuck".into()).is_err());
        assert_eq!(coordinator.gate_snapshot().pending_open(), 1);
    }
}
