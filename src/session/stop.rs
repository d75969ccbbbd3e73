//! Stop-signal hub with explicit, idempotent subscriptions.
//!
//! A single external stop signal must release every active session exactly
//! once, even though sessions also release themselves through other paths.
//! Subscribing returns a [`StopToken`]; firing the hub drains all pending
//! subscriptions and invokes each exactly once, and a token cancelled
//! afterwards (for instance from a session's own release path) is a no-op.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

type StopFn = Box<dyn FnOnce() + Send>;

struct HubInner {
    next_id: u64,
    subs: Vec<(u64, StopFn)>,
}

/// Process-wide stop signal dispatcher
pub struct StopHub {
    inner: Mutex<HubInner>,
}

impl StopHub {
    /// Create an empty hub
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(HubInner {
                next_id: 0,
                subs: Vec::new(),
            }),
        })
    }

    /// Register a callback to run when the stop signal fires
    pub fn subscribe(self: &Arc<Self>, f: impl FnOnce() + Send + 'static) -> StopToken {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subs.push((id, Box::new(f)));
        StopToken {
            hub: Arc::downgrade(self),
            id,
            cancelled: false,
        }
    }

    /// Fire the stop signal: drain and invoke every pending subscription
    ///
    /// Subscriptions are taken out under the lock and invoked outside it,
    /// so a callback may cancel its own token without deadlocking.
    pub fn fire(&self) {
        let subs = std::mem::take(&mut self.inner.lock().subs);
        for (_, f) in subs {
            f();
        }
    }

    /// Number of pending subscriptions
    pub fn pending(&self) -> usize {
        self.inner.lock().subs.len()
    }

    fn cancel(&self, id: u64) {
        self.inner.lock().subs.retain(|(sid, _)| *sid != id);
    }
}

/// Cancellation handle for one stop subscription
pub struct StopToken {
    hub: Weak<StopHub>,
    id: u64,
    cancelled: bool,
}

impl StopToken {
    /// Cancel the subscription; safe to call more than once and after the
    /// hub has fired
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        if let Some(hub) = self.hub.upgrade() {
            hub.cancel(self.id);
        }
    }
}

impl Drop for StopToken {
    fn drop(&mut self) {
        self.cancel();
    }
}
