//! Checked callback spec - the hook under test plus its continuations.

use std::fmt;

use crate::deferred::DeferredResult;

/// What a checked hook decided.
///
/// A closed sum: hooks state their decision explicitly instead of the gate
/// sniffing return shapes. A hook with nothing to forward permits with
/// whatever unit-like value its `V` offers (`()`, `Value::Null`, ...).
pub enum CallbackOutcome<V> {
    /// Proceed; the value is forwarded verbatim to the success continuation.
    Permit(V),
    /// Refuse the pending operation.
    Refuse,
    /// Decision not known yet; the returned deferred settles it later.
    Pending(DeferredResult<V>),
}

impl<V: fmt::Debug> fmt::Debug for CallbackOutcome<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permit(v) => f.debug_tuple("Permit").field(v).finish(),
            Self::Refuse => f.write_str("Refuse"),
            Self::Pending(d) => f.debug_tuple("Pending").field(d).finish(),
        }
    }
}

pub(crate) type CheckFn<V> = Box<dyn FnOnce() -> CallbackOutcome<V> + Send>;
pub(crate) type SuccessFn<V> = Box<dyn FnOnce(V) + Send>;
pub(crate) type FailureFn = Box<dyn FnOnce() + Send>;

/// A hook invocation spec for [`CheckGate::dispatch`].
///
/// The callback is mandatory and invoked exactly once; the success
/// continuation is mandatory; the failure continuation is optional and a
/// missing one makes refusal silent.
///
/// [`CheckGate::dispatch`]: crate::gate::CheckGate::dispatch
pub struct CheckedCallback<V> {
    pub(crate) callback: CheckFn<V>,
    pub(crate) on_success: SuccessFn<V>,
    pub(crate) on_failure: Option<FailureFn>,
}

impl<V> CheckedCallback<V> {
    pub fn new(
        callback: impl FnOnce() -> CallbackOutcome<V> + Send + 'static,
        on_success: impl FnOnce(V) + Send + 'static,
    ) -> Self {
        Self {
            callback: Box::new(callback),
            on_success: Box::new(on_success),
            on_failure: None,
        }
    }

    /// Attach a failure continuation.
    pub fn on_failure(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_failure = Some(Box::new(f));
        self
    }
}

impl<V> fmt::Debug for CheckedCallback<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckedCallback")
            .field("on_failure", &self.on_failure.is_some())
            .finish_non_exhaustive()
    }
}
