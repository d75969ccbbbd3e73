//! Inertial pose sampling and axis remapping.
//!
//! Orientation comes from the rig's inertial sensor in the simulation
//! body frame and must be remapped into the sink's coordinate convention
//! before streaming.

use std::sync::Arc;

/// One pose sample, produced fresh each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSample {
    /// Orientation quaternion (w, x, y, z), already in sink convention
    pub orientation: [f64; 4],
    /// Linear acceleration (m/s²)
    pub lin_acc: [f64; 3],
}

impl PoseSample {
    /// Zero-filled pose for image-only streams
    pub fn zero() -> Self {
        Self {
            orientation: [0.0; 4],
            lin_acc: [0.0; 3],
        }
    }
}

/// Remap a body-frame quaternion (w, x, y, z) into the sink convention.
///
/// The component permutation and sign pattern encode the handedness and
/// forward-axis difference between the simulation frame and the sink
/// frame. Sinks reject streams remapped any other way, so this exact
/// transform must not change.
pub fn remap_orientation(q: [f64; 4]) -> [f64; 4] {
    [q[0], -q[1], -q[3], -q[2]]
}

/// Raw reading from the inertial sensor interface
#[derive(Debug, Clone, Copy)]
pub struct ImuReading {
    /// Body-frame orientation quaternion (w, x, y, z)
    pub orientation: [f64; 4],
    /// Linear acceleration (m/s²)
    pub lin_acc: [f64; 3],
    /// Whether the underlying sensor marked this reading valid
    pub is_valid: bool,
}

/// External inertial sensor interface
pub trait InertialInterface: Send + Sync {
    /// Whether the sensor at `prim_path` still exists
    fn is_sensor_present(&self, prim_path: &str) -> bool;

    /// Latest reading from the sensor at `prim_path`
    fn sensor_reading(&self, prim_path: &str) -> Option<ImuReading>;
}

/// Source of pose samples for one session
pub trait PoseSource: Send {
    /// Sample the current pose, or `None` when unavailable
    ///
    /// Unavailable covers a missing sensor, a reading the sensor interface
    /// marks invalid, and a degenerate (all-zero) remapped orientation.
    fn sample(&mut self) -> Option<PoseSample>;
}

/// Pose source backed by an inertial sensor on the rig
pub struct ImuPoseSource {
    imu: Arc<dyn InertialInterface>,
    prim_path: String,
}

impl ImuPoseSource {
    /// Create a pose source for the sensor at `prim_path`
    pub fn new(imu: Arc<dyn InertialInterface>, prim_path: String) -> Self {
        Self { imu, prim_path }
    }

    /// Rig path of the backing sensor
    pub fn prim_path(&self) -> &str {
        &self.prim_path
    }
}

impl PoseSource for ImuPoseSource {
    fn sample(&mut self) -> Option<PoseSample> {
        // The sensor may be deleted mid-run; that degrades to "no pose this
        // tick", never a crash.
        if !self.imu.is_sensor_present(&self.prim_path) {
            return None;
        }
        let reading = self.imu.sensor_reading(&self.prim_path)?;
        if !reading.is_valid {
            return None;
        }
        let orientation = remap_orientation(reading.orientation);
        if orientation == [0.0; 4] {
            return None;
        }
        Some(PoseSample {
            orientation,
            lin_acc: reading.lin_acc,
        })
    }
}
