//! Session statistics and reporting.

use std::time::Duration;

use observability::GateStatsAggregator;

/// Statistics from a session run
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Total items submitted to the coordinator
    pub items_submitted: u64,

    /// Items admitted to the queue
    pub queued: u64,

    /// Items refused by a check or the item limit
    pub rejected: u64,

    /// Items whose deferred check never settled
    pub awaiting: u64,

    /// Checks that went through a deferred decision
    pub deferred_opened: u64,

    /// Requests resolved and handed to the transport stub
    pub requests_sent: u64,

    /// Total duration of the session
    pub duration: Duration,

    /// Gate metrics aggregator
    pub gate: GateStatsAggregator,
}

impl SessionStats {
    /// Calculate items per second throughput
    pub fn items_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.items_submitted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate rejection rate as percentage
    pub fn rejection_rate(&self) -> f64 {
        if self.items_submitted > 0 {
            (self.rejected as f64 / self.items_submitted as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Session Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Items submitted: {}", self.items_submitted);
        println!("   ├─ Queued: {}", self.queued);
        println!("   ├─ Rejected: {} ({:.2}%)", self.rejected, self.rejection_rate());
        println!("   ├─ Requests sent: {}", self.requests_sent);
        println!("   └─ Items/s: {:.2}", self.items_per_sec());

        let summary = self.gate.summary();

        println!("\n📈 Gate Metrics");
        println!("   ├─ Total checks: {}", summary.total_checks);
        println!("   ├─ Sync permits: {}", summary.permitted);
        println!("   ├─ Sync refusals: {}", summary.refused);
        println!(
            "   ├─ Deferred: {} opened / {} permitted / {} refused",
            summary.pending_opened, summary.deferred_permitted, summary.deferred_refused
        );
        println!("   ├─ Refusal rate: {:.2}%", summary.refusal_rate);
        println!("   └─ Deferred share: {:.2}%", summary.deferred_share);

        if self.awaiting > 0 {
            println!("\n⚠️  Unsettled Checks");
            println!("   └─ {} items still awaiting a decision", self.awaiting);
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_rate() {
        let stats = SessionStats {
            items_submitted: 8,
            rejected: 2,
            ..Default::default()
        };
        assert!((stats.rejection_rate() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_items_has_no_rates() {
        let stats = SessionStats::default();
        assert_eq!(stats.rejection_rate(), 0.0);
        assert_eq!(stats.items_per_sec(), 0.0);
    }
}
