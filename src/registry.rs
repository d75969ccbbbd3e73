//! Process-wide streaming port ownership.
//!
//! Every active camera session owns exactly one port. Reservation and
//! release may be invoked from session-creation and shutdown-signal
//! contexts that the host does not serialize, so all mutations go through
//! a single registry lock.

use parking_lot::Mutex;
use std::collections::HashSet;

/// Registry of streaming ports currently bound to an active session
#[derive(Default)]
pub struct PortRegistry {
    ports: Mutex<HashSet<u16>>,
}

impl PortRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a port for a session
    ///
    /// Returns `false` and leaves the registry unchanged if the port is
    /// already reserved.
    pub fn reserve(&self, port: u16) -> bool {
        self.ports.lock().insert(port)
    }

    /// Release a port reservation
    ///
    /// Freeing a port that is not reserved is a no-op.
    pub fn free(&self, port: u16) {
        self.ports.lock().remove(&port);
    }

    /// Check whether a port is currently reserved
    pub fn is_reserved(&self, port: u16) -> bool {
        self.ports.lock().contains(&port)
    }

    /// Number of currently reserved ports
    pub fn len(&self) -> usize {
        self.ports.lock().len()
    }

    /// Whether no ports are reserved
    pub fn is_empty(&self) -> bool {
        self.ports.lock().is_empty()
    }
}
