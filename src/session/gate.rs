//! Frame-rate admission gate.

/// Decides, from elapsed simulation time, whether the current tick should
/// produce a frame.
///
/// The baseline advances only through [`FrameRateGate::commit`], which the
/// session calls after a fully successful capture+push. A tick that is
/// admitted but fails downstream leaves the baseline untouched, so the
/// gate admits again at the next eligible tick.
#[derive(Debug)]
pub struct FrameRateGate {
    /// Minimum simulation-time spacing between emitted frames
    interval: f64,
    /// Simulation time of the last committed frame
    last_emitted: Option<f64>,
}

impl FrameRateGate {
    /// Create a gate for a target frame rate
    pub fn new(target_fps: u32) -> Self {
        Self {
            interval: 1.0 / f64::from(target_fps.max(1)),
            last_emitted: None,
        }
    }

    /// Whether this tick should produce a frame
    ///
    /// A simulation-clock regression (scene rewound or restarted) resets
    /// the baseline to the observed time and denies the current tick.
    pub fn admit(&mut self, sim_time: f64) -> bool {
        match self.last_emitted {
            None => true,
            Some(last) if sim_time < last => {
                self.last_emitted = Some(sim_time);
                false
            }
            Some(last) => sim_time - last >= self.interval,
        }
    }

    /// Record a fully successful capture+push at `sim_time`
    pub fn commit(&mut self, sim_time: f64) {
        self.last_emitted = Some(sim_time);
    }

    /// Baseline of the last committed frame, if any
    pub fn last_emitted(&self) -> Option<f64> {
        self.last_emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_admitted() {
        let mut gate = FrameRateGate::new(30);
        assert!(gate.admit(0.0));
    }

    #[test]
    fn test_30fps_spacing() {
        let mut gate = FrameRateGate::new(30);
        assert!(gate.admit(0.0));
        gate.commit(0.0);
        assert!(!gate.admit(0.02));
        assert!(gate.admit(0.0334));
    }

    #[test]
    fn test_regression_resets_baseline_and_denies() {
        let mut gate = FrameRateGate::new(30);
        assert!(gate.admit(5.0));
        gate.commit(5.0);
        assert!(!gate.admit(0.1));
        assert_eq!(gate.last_emitted(), Some(0.1));
        // Next eligible tick measures from the new baseline
        assert!(gate.admit(0.14));
    }

    #[test]
    fn test_uncommitted_admission_does_not_advance() {
        let mut gate = FrameRateGate::new(30);
        assert!(gate.admit(0.0));
        // No commit: downstream failed, so the same tick time is admitted again
        assert!(gate.admit(0.0));
        gate.commit(0.0);
        assert!(!gate.admit(0.0));
    }
}
