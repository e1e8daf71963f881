//! 决策门指标收集模块
//!
//! 基于 GateSnapshot 收集和统计校验门的运行指标。

use dispatcher::GateSnapshot;
use metrics::{counter, gauge};

/// 记录一次校验决策
///
/// `decision` 取值: `sync_permit` / `sync_refuse` / `deferred_open` /
/// `deferred_permit` / `deferred_refuse`。
pub fn record_check_decision(decision: &str) {
    counter!(
        "upload_gate_checks_total",
        "decision" => decision.to_string()
    )
    .increment(1);
}

/// 记录条目入队
pub fn record_item_queued() {
    counter!("upload_gate_items_queued_total").increment(1);
}

/// 记录条目被拒绝
pub fn record_item_rejected() {
    counter!("upload_gate_items_rejected_total").increment(1);
}

/// 记录 deferred 决策 settle
pub fn record_deferred_settled(permitted: bool) {
    let outcome = if permitted { "permit" } else { "refuse" };
    counter!(
        "upload_gate_deferred_settled_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// 记录当前队列深度
pub fn record_queue_depth(depth: usize) {
    gauge!("upload_gate_queue_depth").set(depth as f64);
}

/// 从 GateSnapshot 记录当前累计指标
///
/// 在会话结束或定期巡检时调用。
pub fn record_gate_snapshot(snapshot: &GateSnapshot) {
    gauge!("upload_gate_checks_permitted").set(snapshot.permitted as f64);
    gauge!("upload_gate_checks_refused").set(snapshot.refused as f64);
    gauge!("upload_gate_checks_pending_opened").set(snapshot.pending_opened as f64);
    gauge!("upload_gate_deferred_permitted").set(snapshot.deferred_permitted as f64);
    gauge!("upload_gate_deferred_refused").set(snapshot.deferred_refused as f64);
    gauge!("upload_gate_pending_open").set(snapshot.pending_open() as f64);
}

/// Accumulates gate snapshots into a printable summary.
///
/// Snapshots are cumulative, so `update` replaces rather than adds.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateStatsAggregator {
    last: GateSnapshot,
}

impl GateStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb the latest snapshot.
    pub fn update(&mut self, snapshot: &GateSnapshot) {
        self.last = *snapshot;
    }

    /// Produce the derived summary.
    pub fn summary(&self) -> GateSummary {
        let snap = self.last;
        let total = snap.total_checks();
        let refusals = snap.refused + snap.deferred_refused;

        let pct = |part: u64, whole: u64| {
            if whole > 0 {
                (part as f64 / whole as f64) * 100.0
            } else {
                0.0
            }
        };

        GateSummary {
            total_checks: total,
            permitted: snap.permitted,
            refused: snap.refused,
            pending_opened: snap.pending_opened,
            deferred_permitted: snap.deferred_permitted,
            deferred_refused: snap.deferred_refused,
            pending_open: snap.pending_open(),
            refusal_rate: pct(refusals, total),
            deferred_share: pct(snap.pending_opened, total),
        }
    }
}

/// Derived gate statistics (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct GateSummary {
    pub total_checks: u64,
    pub permitted: u64,
    pub refused: u64,
    pub pending_opened: u64,
    pub deferred_permitted: u64,
    pub deferred_refused: u64,
    pub pending_open: u64,
    /// Share of all checks that ended in refusal (sync or deferred), percent
    pub refusal_rate: f64,
    /// Share of all checks that went through a deferred, percent
    pub deferred_share: f64,
}
