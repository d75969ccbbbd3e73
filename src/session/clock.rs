//! Outgoing timestamp derivation.
//!
//! Sinks expect nanosecond timestamps on a wall-clock epoch. In
//! simulation-time mode the policy anchors simulation-time zero to the
//! wall clock and re-anchors whenever simulation time regresses (scene
//! restart); in wall-clock mode it streams the current instant directly.

use log::debug;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock instant in nanoseconds since the Unix epoch
pub fn wall_clock_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Timestamp mode, selected at session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    /// `epoch_anchor + sim_time`, re-anchored on regression
    SimulationTime,
    /// Current wall-clock instant, simulation time ignored
    WallClock,
}

/// Derives outgoing timestamps for one session
#[derive(Debug)]
pub struct TimestampPolicy {
    mode: ClockMode,
    /// Wall-clock instant corresponding to simulation-time zero
    epoch_anchor_ns: Option<u64>,
    last_sim_time: f64,
}

impl TimestampPolicy {
    /// Create a policy in the given mode
    pub fn new(mode: ClockMode) -> Self {
        Self {
            mode,
            epoch_anchor_ns: None,
            last_sim_time: 0.0,
        }
    }

    /// Derive the outgoing timestamp for the current tick
    ///
    /// The epoch anchor is (re)captured on the first call and whenever
    /// simulation time is observed to decrease. `last_sim_time` is updated
    /// on every call regardless of mode.
    pub fn derive(&mut self, sim_time: f64) -> u64 {
        let sim_ns = (sim_time * 1_000_000_000.0) as u64;
        if self.epoch_anchor_ns.is_none() || sim_time < self.last_sim_time {
            let anchor = wall_clock_ns().saturating_sub(sim_ns);
            debug!(
                "TimestampPolicy: anchoring stream epoch at {} (sim_time {:.6})",
                anchor, sim_time
            );
            self.epoch_anchor_ns = Some(anchor);
        }
        self.last_sim_time = sim_time;

        match self.mode {
            ClockMode::WallClock => wall_clock_ns(),
            ClockMode::SimulationTime => self
                .epoch_anchor_ns
                .map(|anchor| anchor + sim_ns)
                .unwrap_or_else(wall_clock_ns),
        }
    }

    /// Mode this policy was configured with
    pub fn mode(&self) -> ClockMode {
        self.mode
    }
}
