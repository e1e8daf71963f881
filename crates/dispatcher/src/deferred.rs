//! DeferredResult - settle-once decision cell
//!
//! A minimal single-producer future with exactly two outcomes: success with
//! a value, or failure. Not a general promise chain; one continuation slot
//! per outcome, each delivered at most once.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::SettleError;

type SuccessFn<V> = Box<dyn FnOnce(V) + Send>;
type FailureFn = Box<dyn FnOnce() + Send>;

/// Observable lifecycle state of a deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredState {
    Pending,
    Succeeded,
    Failed,
}

enum Phase<V> {
    /// Not settled; continuations parked until the producer decides.
    Pending {
        on_success: Option<SuccessFn<V>>,
        on_failure: Option<FailureFn>,
    },
    /// Settled successfully; the value waits here until a success
    /// continuation consumes it.
    Succeeded { value: Option<V> },
    /// Settled as failure; `notified` is set once a failure continuation ran.
    Failed { notified: bool },
}

/// A decision not yet known at call time.
///
/// The handle is shared: the producer keeps one clone and settles it exactly
/// once (`succeed` / `fail`); observers register continuations on another.
/// Settlement and registration may happen on different threads. A second
/// settlement returns [`SettleError::AlreadySettled`] and never re-invokes a
/// continuation that has already fired.
///
/// Registering a continuation after settlement fires it immediately, so a
/// producer that settles before handing the deferred back loses nothing.
///
/// There is no cancellation: a deferred the producer never settles simply
/// never fires; owning its eventual settlement is the producer's job.
pub struct DeferredResult<V> {
    cell: Arc<Mutex<Phase<V>>>,
}

impl<V> Clone for DeferredResult<V> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<V> Default for DeferredResult<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> DeferredResult<V> {
    /// Create a pending deferred.
    pub fn new() -> Self {
        Self {
            cell: Arc::new(Mutex::new(Phase::Pending {
                on_success: None,
                on_failure: None,
            })),
        }
    }

    /// Whether `self` and `other` are handles to the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    /// Current state, for diagnostics and tests.
    pub fn state(&self) -> DeferredState {
        match *self.lock() {
            Phase::Pending { .. } => DeferredState::Pending,
            Phase::Succeeded { .. } => DeferredState::Succeeded,
            Phase::Failed { .. } => DeferredState::Failed,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.state() != DeferredState::Pending
    }

    /// Settle with a success value. First settlement wins.
    ///
    /// If a success continuation is registered it fires here, on the
    /// producer's thread, outside the internal lock.
    pub fn succeed(&self, value: V) -> Result<(), SettleError> {
        let fire = {
            let mut phase = self.lock();
            let parked = match &mut *phase {
                Phase::Pending { on_success, .. } => on_success.take(),
                _ => return Err(SettleError::AlreadySettled),
            };
            match parked {
                Some(f) => {
                    *phase = Phase::Succeeded { value: None };
                    Some((f, value))
                }
                None => {
                    *phase = Phase::Succeeded { value: Some(value) };
                    None
                }
            }
        };
        if let Some((f, value)) = fire {
            f(value);
        }
        Ok(())
    }

    /// Settle as failure. First settlement wins.
    pub fn fail(&self) -> Result<(), SettleError> {
        let fire = {
            let mut phase = self.lock();
            let parked = match &mut *phase {
                Phase::Pending { on_failure, .. } => on_failure.take(),
                _ => return Err(SettleError::AlreadySettled),
            };
            *phase = Phase::Failed {
                notified: parked.is_some(),
            };
            parked
        };
        if let Some(f) = fire {
            f();
        }
        Ok(())
    }

    /// Register the success continuation.
    ///
    /// Fires immediately if the deferred already succeeded and the value has
    /// not been delivered yet; is dropped if the deferred failed. At most
    /// one continuation ever receives the value.
    pub fn on_success(&self, f: impl FnOnce(V) + Send + 'static) {
        let fire = {
            let mut phase = self.lock();
            match &mut *phase {
                Phase::Pending { on_success, .. } => {
                    *on_success = Some(Box::new(f));
                    None
                }
                Phase::Succeeded { value } => value.take().map(|v| (f, v)),
                Phase::Failed { .. } => None,
            }
        };
        if let Some((f, value)) = fire {
            f(value);
        }
    }

    /// Register the failure continuation.
    ///
    /// Fires immediately if the deferred already failed and no failure
    /// continuation has run; is dropped if the deferred succeeded.
    pub fn on_failure(&self, f: impl FnOnce() + Send + 'static) {
        let fire = {
            let mut phase = self.lock();
            match &mut *phase {
                Phase::Pending { on_failure, .. } => {
                    *on_failure = Some(Box::new(f));
                    None
                }
                Phase::Failed { notified } if !*notified => {
                    *notified = true;
                    Some(f)
                }
                _ => None,
            }
        };
        if let Some(f) = fire {
            f();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Phase<V>> {
        self.cell.lock().expect("deferred state lock poisoned")
    }
}

impl<V> fmt::Debug for DeferredResult<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeferredResult({:?})", self.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    #[test]
    fn test_starts_pending() {
        let deferred: DeferredResult<u32> = DeferredResult::new();
        assert_eq!(deferred.state(), DeferredState::Pending);
        assert!(!deferred.is_settled());
    }

    #[test]
    fn test_succeed_fires_registered_continuation_once() {
        let fired = Arc::new(AtomicU64::new(0));
        let probe = Arc::clone(&fired);

        let deferred = DeferredResult::new();
        deferred.on_success(move |v: u32| {
            assert_eq!(v, 7);
            probe.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        deferred.succeed(7).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(deferred.state(), DeferredState::Succeeded);
    }

    #[test]
    fn test_registration_after_settlement_fires_immediately() {
        let deferred = DeferredResult::new();
        deferred.succeed("late").unwrap();

        let fired = Arc::new(AtomicU64::new(0));
        let probe = Arc::clone(&fired);
        deferred.on_success(move |v: &str| {
            assert_eq!(v, "late");
            probe.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Value delivered at most once: a second registration stays silent
        let again = Arc::new(AtomicU64::new(0));
        let probe = Arc::clone(&again);
        deferred.on_success(move |_| {
            probe.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(again.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fail_fires_failure_continuation_only() {
        let success = Arc::new(AtomicU64::new(0));
        let failure = Arc::new(AtomicU64::new(0));

        let deferred: DeferredResult<u32> = DeferredResult::new();
        let probe = Arc::clone(&success);
        deferred.on_success(move |_| {
            probe.fetch_add(1, Ordering::SeqCst);
        });
        let probe = Arc::clone(&failure);
        deferred.on_failure(move || {
            probe.fetch_add(1, Ordering::SeqCst);
        });

        deferred.fail().unwrap();
        assert_eq!(success.load(Ordering::SeqCst), 0);
        assert_eq!(failure.load(Ordering::SeqCst), 1);
        assert_eq!(deferred.state(), DeferredState::Failed);
    }

    #[test]
    fn test_second_settlement_is_an_error_and_never_refires() {
        let fired = Arc::new(AtomicU64::new(0));
        let probe = Arc::clone(&fired);

        let deferred = DeferredResult::new();
        deferred.on_success(move |_: u32| {
            probe.fetch_add(1, Ordering::SeqCst);
        });

        deferred.succeed(1).unwrap();
        assert_eq!(deferred.succeed(2), Err(SettleError::AlreadySettled));
        assert_eq!(deferred.fail(), Err(SettleError::AlreadySettled));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clone_shares_the_cell() {
        let producer: DeferredResult<u32> = DeferredResult::new();
        let observer = producer.clone();
        assert!(producer.ptr_eq(&observer));

        producer.succeed(3).unwrap();
        assert_eq!(observer.state(), DeferredState::Succeeded);
    }

    #[tokio::test]
    async fn test_settlement_from_another_task() {
        let fired = Arc::new(AtomicU64::new(0));
        let probe = Arc::clone(&fired);

        let deferred: DeferredResult<u32> = DeferredResult::new();
        deferred.on_success(move |v| {
            assert_eq!(v, 42);
            probe.fetch_add(1, Ordering::SeqCst);
        });

        let producer = deferred.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            producer.succeed(42).unwrap();
        });

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        handle.await.unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
