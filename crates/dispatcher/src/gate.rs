//! CheckGate - normalizes checked-callback outcomes into continuations.
//!
//! One invocation walks `Start -> {Permit, Refuse, Awaiting}`; an awaiting
//! decision reaches `Permit` or `Refuse` when its deferred settles. There is
//! no path back from a terminal state and no retry.

use std::sync::Arc;

use tracing::debug;

use crate::checked::{CallbackOutcome, CheckedCallback};
use crate::deferred::DeferredResult;
use crate::metrics::{GateMetrics, GateSnapshot};

/// Dispatch result as seen by the caller.
///
/// A synchronous permit carries the same value that was handed to the
/// success continuation; a pending decision carries the very deferred the
/// callback produced, so the caller can tell "decision made" from "decision
/// pending" by the variant alone.
pub enum GateDecision<V> {
    Permitted(V),
    Refused,
    Pending(DeferredResult<V>),
}

impl<V> GateDecision<V> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for GateDecision<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permitted(v) => f.debug_tuple("Permitted").field(v).finish(),
            Self::Refused => f.write_str("Refused"),
            Self::Pending(d) => f.debug_tuple("Pending").field(d).finish(),
        }
    }
}

/// The checked-callback dispatcher.
///
/// Pure control flow: invokes the hook exactly once, interprets its
/// [`CallbackOutcome`], and routes to the continuations. Holds nothing but
/// decision counters; every caller-visible effect happens through the spec's
/// continuations.
///
/// Panics raised inside the hook are not caught here; they propagate to the
/// caller of [`dispatch`](Self::dispatch).
#[derive(Debug, Default)]
pub struct CheckGate {
    metrics: Arc<GateMetrics>,
}

impl CheckGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the gate's counters.
    pub fn metrics(&self) -> &Arc<GateMetrics> {
        &self.metrics
    }

    /// Current counter snapshot.
    pub fn snapshot(&self) -> GateSnapshot {
        self.metrics.snapshot()
    }

    /// Run one checked callback.
    ///
    /// - `Permit(v)`: the success continuation fires with `v` before this
    ///   call returns, which also returns `Permitted(v)`.
    /// - `Refuse`: the failure continuation (if any) fires before this call
    ///   returns `Refused`. A refusal is an expected outcome, never an error.
    /// - `Pending(d)`: both continuations are parked on `d`; whichever way
    ///   the producer settles it fires the matching continuation exactly
    ///   once. Returns `Pending(d)` with the callback's own deferred.
    ///
    /// `context` is a caller-supplied label (typically the item id) used
    /// only for logging.
    pub fn dispatch<V>(&self, context: &str, spec: CheckedCallback<V>) -> GateDecision<V>
    where
        V: Clone + Send + 'static,
    {
        let CheckedCallback {
            callback,
            on_success,
            on_failure,
        } = spec;

        match callback() {
            CallbackOutcome::Permit(value) => {
                self.metrics.inc_permitted();
                debug!(context, "Check permitted");
                on_success(value.clone());
                GateDecision::Permitted(value)
            }
            CallbackOutcome::Refuse => {
                self.metrics.inc_refused();
                debug!(context, "Check refused");
                if let Some(f) = on_failure {
                    f();
                }
                GateDecision::Refused
            }
            CallbackOutcome::Pending(deferred) => {
                self.metrics.inc_pending_opened();
                debug!(context, "Check deferred, awaiting settlement");

                let metrics = Arc::clone(&self.metrics);
                let ctx = context.to_string();
                deferred.on_success(move |value| {
                    metrics.inc_deferred_permitted();
                    debug!(context = %ctx, "Deferred check permitted");
                    on_success(value);
                });

                let metrics = Arc::clone(&self.metrics);
                let ctx = context.to_string();
                deferred.on_failure(move || {
                    metrics.inc_deferred_refused();
                    debug!(context = %ctx, "Deferred check refused");
                    if let Some(f) = on_failure {
                        f();
                    }
                });

                GateDecision::Pending(deferred)
            }
        }
    }
}
