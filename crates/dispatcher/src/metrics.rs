//! Gate metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Decision counters for a check gate
#[derive(Debug, Default)]
pub struct GateMetrics {
    /// Synchronous permits
    permitted: AtomicU64,
    /// Synchronous refusals
    refused: AtomicU64,
    /// Deferred decisions opened
    pending_opened: AtomicU64,
    /// Deferred decisions settled as permit
    deferred_permitted: AtomicU64,
    /// Deferred decisions settled as refusal
    deferred_refused: AtomicU64,
}

impl GateMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn permitted(&self) -> u64 {
        self.permitted.load(Ordering::Relaxed)
    }

    pub fn inc_permitted(&self) {
        self.permitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn refused(&self) -> u64 {
        self.refused.load(Ordering::Relaxed)
    }

    pub fn inc_refused(&self) {
        self.refused.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pending_opened(&self) -> u64 {
        self.pending_opened.load(Ordering::Relaxed)
    }

    pub fn inc_pending_opened(&self) {
        self.pending_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn deferred_permitted(&self) -> u64 {
        self.deferred_permitted.load(Ordering::Relaxed)
    }

    pub fn inc_deferred_permitted(&self) {
        self.deferred_permitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn deferred_refused(&self) -> u64 {
        self.deferred_refused.load(Ordering::Relaxed)
    }

    pub fn inc_deferred_refused(&self) {
        self.deferred_refused.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> GateSnapshot {
        GateSnapshot {
            permitted: self.permitted(),
            refused: self.refused(),
            pending_opened: self.pending_opened(),
            deferred_permitted: self.deferred_permitted(),
            deferred_refused: self.deferred_refused(),
        }
    }
}

/// Snapshot of gate metrics (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct GateSnapshot {
    pub permitted: u64,
    pub refused: u64,
    pub pending_opened: u64,
    pub deferred_permitted: u64,
    pub deferred_refused: u64,
}

impl GateSnapshot {
    /// Total decisions requested (sync + deferred openings)
    pub fn total_checks(&self) -> u64 {
        self.permitted + self.refused + self.pending_opened
    }

    /// Deferred decisions still unsettled at snapshot time
    pub fn pending_open(&self) -> u64 {
        self.pending_opened
            .saturating_sub(self.deferred_permitted + self.deferred_refused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_totals() {
        let metrics = GateMetrics::new();
        metrics.inc_permitted();
        metrics.inc_permitted();
        metrics.inc_refused();
        metrics.inc_pending_opened();
        metrics.inc_deferred_refused();

        let snap = metrics.snapshot();
        assert_eq!(snap.permitted, 2);
        assert_eq!(snap.refused, 1);
        assert_eq!(snap.total_checks(), 4);
        assert_eq!(snap.pending_open(), 0);
    }
}
