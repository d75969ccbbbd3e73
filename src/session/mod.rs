//! Camera streaming session lifecycle and per-tick capture loop.
//!
//! A [`CameraSession`] owns one or two image sources, an optional pose
//! source, a frame-rate gate, a timestamp policy, and a sink handle. The
//! host's simulation scheduler calls [`CameraSession::tick`] once per
//! simulation step on the thread that owns the simulation loop; nothing in
//! the tick path blocks or suspends. Release is idempotent and reachable
//! from every state, from the owner's own code path or from the process
//! stop signal.

mod clock;
mod gate;
mod stop;

pub use clock::{wall_clock_ns, ClockMode, TimestampPolicy};
pub use gate::FrameRateGate;
pub use stop::{StopHub, StopToken};

use crate::error::{Error, Result};
use crate::graph::RenderGraph;
use crate::model::{CameraModel, Resolution};
use crate::pose::{ImuPoseSource, InertialInterface, PoseSample, PoseSource};
use crate::registry::PortRegistry;
use crate::sink::{Sink, StreamParams, TransportMode};
use crate::source::{AnnotatorSource, Fetch, ImageFrame, ImageSource};
use log::{debug, info, trace, warn};
use std::sync::Arc;

/// Consecutive failures of one kind before a diagnostic is emitted
pub const FAILURE_WARN_THRESHOLD: u32 = 10;

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created but not yet streaming
    Uninitialized,
    /// Streaming; ticked by the host scheduler
    Active,
    /// Terminal; a released session is never reused
    Released,
}

/// Stereo/mono topology, decided exactly once at activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Single camera from a mono model
    Mono,
    /// Left/right pair declared by a stereo camera model
    ModelStereo,
    /// Two independently supplied camera rigs forming a stereo pair
    CustomDual,
}

/// Resolved configuration for one session
///
/// Produced by the configuration layer after validation and fallback; all
/// values here are already usable.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Display name for diagnostics
    pub name: String,
    /// Rig path of the (primary) camera assembly
    pub rig_path: String,
    /// Second rig path; presence makes the session a custom stereo pair
    pub second_rig_path: Option<String>,
    pub port: u16,
    pub model: CameraModel,
    pub resolution: Resolution,
    pub fps: u32,
    pub transport: TransportMode,
    pub serial_number: u32,
    /// Stream wall-clock timestamps instead of anchored simulation time
    pub use_system_time: bool,
}

/// Counters and state snapshot for diagnostics
#[derive(Debug, Clone, Copy)]
pub struct SessionStats {
    pub state: SessionState,
    pub topology: Option<Topology>,
    pub frames_pushed: u64,
    pub left_failures: u32,
    pub right_failures: u32,
    pub pose_failures: u32,
    pub push_failures: u32,
}

/// One camera streaming session
pub struct CameraSession {
    cfg: SessionConfig,
    state: SessionState,
    topology: Option<Topology>,

    graph: Arc<dyn RenderGraph>,
    imu: Arc<dyn InertialInterface>,
    registry: Arc<PortRegistry>,

    left: Option<Box<dyn ImageSource>>,
    right: Option<Box<dyn ImageSource>>,
    pose: Option<Box<dyn PoseSource>>,

    gate: FrameRateGate,
    clock: TimestampPolicy,

    sink: Box<dyn Sink>,
    sink_open: bool,
    port_reserved: bool,
    stop_token: Option<StopToken>,

    left_failures: u32,
    right_failures: u32,
    pose_failures: u32,
    push_failures: u32,
    frames_pushed: u64,
}

impl CameraSession {
    /// Create a session in the uninitialized state
    pub fn new(
        cfg: SessionConfig,
        graph: Arc<dyn RenderGraph>,
        imu: Arc<dyn InertialInterface>,
        sink: Box<dyn Sink>,
        registry: Arc<PortRegistry>,
    ) -> Self {
        let gate = FrameRateGate::new(cfg.fps);
        let clock = TimestampPolicy::new(if cfg.use_system_time {
            ClockMode::WallClock
        } else {
            ClockMode::SimulationTime
        });
        Self {
            cfg,
            state: SessionState::Uninitialized,
            topology: None,
            graph,
            imu,
            registry,
            left: None,
            right: None,
            pose: None,
            gate,
            clock,
            sink,
            sink_open: false,
            port_reserved: false,
            stop_token: None,
            left_failures: 0,
            right_failures: 0,
            pose_failures: 0,
            push_failures: 0,
            frames_pushed: 0,
        }
    }

    /// Transition Uninitialized → Active
    ///
    /// Reserves the streaming port, decides the stereo/mono topology,
    /// attaches image sources and the pose source, and opens the sink. A
    /// failed activation leaves the session in the terminal Released state
    /// with every partially acquired resource freed; other sessions in the
    /// process are unaffected.
    pub fn activate(&mut self) -> Result<()> {
        match self.state {
            SessionState::Uninitialized => {}
            SessionState::Active => {
                return Err(Error::ActivationFailed(format!(
                    "{}: session is already active",
                    self.cfg.name
                )))
            }
            SessionState::Released => {
                return Err(Error::ActivationFailed(format!(
                    "{}: released sessions cannot be reused",
                    self.cfg.name
                )))
            }
        }

        if !self.registry.reserve(self.cfg.port) {
            self.state = SessionState::Released;
            return Err(Error::PortConflict(self.cfg.port));
        }
        self.port_reserved = true;

        // Topology is decided exactly once and never re-inferred: two
        // camera references always mean a custom stereo pair, one means the
        // model's declared capability.
        let topology = if self.cfg.second_rig_path.is_some() {
            Topology::CustomDual
        } else if self.cfg.model.is_stereo() {
            Topology::ModelStereo
        } else {
            Topology::Mono
        };
        self.topology = Some(topology);

        if self.cfg.use_system_time {
            warn!(
                "{}: overriding simulation time with system time",
                self.cfg.name
            );
        }

        let (left_path, right_path) = self.camera_paths(topology);

        self.left = self.attach_source(&left_path, side_label(topology, true));
        self.right = match &right_path {
            Some(path) => self.attach_source(path, side_label(topology, false)),
            None => None,
        };

        if self.left.is_none() && self.right.is_none() {
            warn!(
                "{}: no camera resolved under {}, try re-importing the rig",
                self.cfg.name, self.cfg.rig_path
            );
            self.release();
            return Err(Error::ActivationFailed(format!(
                "{}: no image source could be initialized",
                self.cfg.name
            )));
        }

        if right_path.is_some() && (self.left.is_none() || self.right.is_none()) {
            warn!(
                "{}: only one side of the stereo pair initialized, continuing in degraded mono mode",
                self.cfg.name
            );
            // Keep whichever side survived as the primary source
            if self.left.is_none() {
                self.left = self.right.take();
            }
        }

        // Stereo topologies carry the rig's inertial sensor; mono streams
        // are image-only and push a zero-filled pose.
        if topology != Topology::Mono {
            let imu_path = self.cfg.model.imu_path(&self.cfg.rig_path);
            self.pose = Some(Box::new(ImuPoseSource::new(
                Arc::clone(&self.imu),
                imu_path,
            )));
        }

        let (width, height) = self.cfg.resolution.dims();
        let params = StreamParams {
            port: self.cfg.port,
            serial_number: self.cfg.serial_number,
            image_width: width,
            image_height: height,
            fps: self.cfg.fps,
            transport: self.cfg.transport,
            alpha_channel_included: false,
            rgb_encoded: true,
            codec_type: 1,
        };
        if let Err(e) = self.sink.open(&params) {
            warn!("{}: failed to initialize the fusion sink: {}", self.cfg.name, e);
            self.release();
            return Err(Error::ActivationFailed(format!(
                "{}: sink initialization failed: {}",
                self.cfg.name, e
            )));
        }
        self.sink_open = true;

        self.state = SessionState::Active;
        info!(
            "{}: streaming camera on port {} with serial number {} ({:?}, {} @ {}fps)",
            self.cfg.name,
            self.cfg.port,
            self.cfg.serial_number,
            topology,
            self.cfg.resolution.label(),
            self.cfg.fps
        );
        Ok(())
    }

    /// Run one capture cycle; returns true when a frame was pushed
    pub fn tick(&mut self, sim_time: f64) -> bool {
        if self.state != SessionState::Active {
            return false;
        }
        if !self.gate.admit(sim_time) {
            return false;
        }

        // Fetch sequentially so a failed left side skips the right fetch
        let left_frame = match Self::fetch_side(
            self.left.as_mut(),
            &mut self.left_failures,
            &self.cfg.name,
        ) {
            Some(frame) => frame,
            None => return false,
        };
        let right_frame = if self.right.is_some() {
            match Self::fetch_side(
                self.right.as_mut(),
                &mut self.right_failures,
                &self.cfg.name,
            ) {
                Some(frame) => Some(frame),
                None => return false,
            }
        } else {
            None
        };

        let timestamp_ns = self.clock.derive(sim_time);

        let pose = match self.pose.as_mut() {
            Some(source) => match source.sample() {
                Some(sample) => {
                    self.pose_failures = 0;
                    sample
                }
                None => {
                    self.pose_failures += 1;
                    if self.pose_failures >= FAILURE_WARN_THRESHOLD {
                        warn!(
                            "{}: received no valid orientation, skipped frame",
                            self.cfg.name
                        );
                    }
                    return false;
                }
            },
            None => PoseSample::zero(),
        };

        let right_bytes: &[u8] = right_frame
            .as_ref()
            .map(|frame| frame.data.as_slice())
            .unwrap_or(&[]);
        let status = self
            .sink
            .push(&left_frame.data, right_bytes, timestamp_ns, &pose);
        if status != 0 {
            self.push_failures += 1;
            if self.push_failures >= FAILURE_WARN_THRESHOLD {
                warn!(
                    "{}: streaming failed at timestamp {} with error code {}",
                    self.cfg.name, timestamp_ns, status
                );
            }
            return false;
        }

        if self.frames_pushed == 0 {
            info!("{}: starting stream to the fusion sink", self.cfg.name);
        }
        self.push_failures = 0;
        self.frames_pushed += 1;
        self.gate.commit(sim_time);
        trace!(
            "{}: streamed frame at {} with orientation {:?}",
            self.cfg.name,
            timestamp_ns,
            pose.orientation
        );
        true
    }

    /// Transition to the terminal Released state
    ///
    /// Safe to call more than once and from any state. Each teardown
    /// sub-step is best-effort: a failing step is logged and the remaining
    /// steps still run, and the port is freed exactly once.
    pub fn release(&mut self) {
        if self.state == SessionState::Released {
            debug!("{}: already released", self.cfg.name);
            return;
        }
        debug!("{}: releasing session resources", self.cfg.name);

        if let Some(mut left) = self.left.take() {
            left.release();
        }
        if let Some(mut right) = self.right.take() {
            right.release();
        }
        self.pose = None;

        if self.sink_open {
            self.sink.close();
            self.sink_open = false;
        }

        if self.port_reserved {
            self.registry.free(self.cfg.port);
            self.port_reserved = false;
        }

        if let Some(mut token) = self.stop_token.take() {
            token.cancel();
        }

        self.state = SessionState::Released;
        info!("{}: session on port {} released", self.cfg.name, self.cfg.port);
    }

    /// Attach the process stop signal to this session
    ///
    /// The token is cancelled by release, so the stop signal can never
    /// reach a session twice.
    pub fn set_stop_token(&mut self, token: StopToken) {
        if self.state == SessionState::Released {
            let mut token = token;
            token.cancel();
            return;
        }
        self.stop_token = Some(token);
    }

    /// Session display name
    pub fn name(&self) -> &str {
        &self.cfg.name
    }

    /// Streaming port this session was configured with
    pub fn port(&self) -> u16 {
        self.cfg.port
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Topology decided at activation, if any
    pub fn topology(&self) -> Option<Topology> {
        self.topology
    }

    /// Snapshot of counters for diagnostics
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            state: self.state,
            topology: self.topology,
            frames_pushed: self.frames_pushed,
            left_failures: self.left_failures,
            right_failures: self.right_failures,
            pose_failures: self.pose_failures,
            push_failures: self.push_failures,
        }
    }

    /// Camera rig paths for the decided topology as (left, right)
    fn camera_paths(&self, topology: Topology) -> (String, Option<String>) {
        let model = self.cfg.model;
        match topology {
            Topology::CustomDual => {
                // Each side of a custom pair uses the model's mono geometry
                let left = model.mono_camera_path(&self.cfg.rig_path);
                let right = self
                    .cfg
                    .second_rig_path
                    .as_ref()
                    .map(|rig| model.mono_camera_path(rig));
                (left, right)
            }
            Topology::ModelStereo => (
                model.left_camera_path(&self.cfg.rig_path),
                Some(model.right_camera_path(&self.cfg.rig_path)),
            ),
            Topology::Mono => (model.mono_camera_path(&self.cfg.rig_path), None),
        }
    }

    fn attach_source(&self, camera_path: &str, label: &'static str) -> Option<Box<dyn ImageSource>> {
        match AnnotatorSource::attach(
            Arc::clone(&self.graph),
            camera_path,
            self.cfg.resolution,
            label,
        ) {
            Ok(source) => Some(Box::new(source)),
            Err(e) => {
                warn!(
                    "{}: failed to initialize {} camera at {}: {}",
                    self.cfg.name, label, camera_path, e
                );
                None
            }
        }
    }

    /// Fetch one side, maintaining its consecutive-failure counter
    fn fetch_side(
        source: Option<&mut Box<dyn ImageSource>>,
        failures: &mut u32,
        name: &str,
    ) -> Option<ImageFrame> {
        let source = source?;
        match source.fetch() {
            Fetch::Frame(frame) => {
                *failures = 0;
                Some(frame)
            }
            Fetch::NotReady => {
                *failures += 1;
                if *failures >= FAILURE_WARN_THRESHOLD {
                    warn!(
                        "{}: {} camera has not produced a frame yet, skipping frame",
                        name,
                        source.label()
                    );
                }
                None
            }
            Fetch::ShapeMismatch => {
                *failures += 1;
                if *failures >= FAILURE_WARN_THRESHOLD {
                    warn!(
                        "{}: {} camera retrieved unexpected data shape, skipping frame",
                        name,
                        source.label()
                    );
                }
                None
            }
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}

fn side_label(topology: Topology, left: bool) -> &'static str {
    match (topology, left) {
        (Topology::Mono, _) => "mono",
        (_, true) => "left",
        (_, false) => "right",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::sim::{SimInertial, SimRenderGraph};
    use parking_lot::Mutex;

    struct RecordingSink {
        pushes: Arc<Mutex<Vec<(usize, usize, u64, PoseSample)>>>,
        status: i32,
        opened: bool,
    }

    impl RecordingSink {
        fn new(pushes: Arc<Mutex<Vec<(usize, usize, u64, PoseSample)>>>) -> Self {
            Self {
                pushes,
                status: 0,
                opened: false,
            }
        }
    }

    impl Sink for RecordingSink {
        fn open(&mut self, _params: &StreamParams) -> crate::error::Result<()> {
            self.opened = true;
            Ok(())
        }
        fn push(&mut self, left: &[u8], right: &[u8], ts: u64, pose: &PoseSample) -> i32 {
            if self.status == 0 {
                self.pushes.lock().push((left.len(), right.len(), ts, *pose));
            }
            self.status
        }
        fn close(&mut self) {
            self.opened = false;
        }
    }

    fn stereo_config(port: u16) -> SessionConfig {
        SessionConfig {
            name: format!("camera-{}", port),
            rig_path: "/World/Rig0".to_string(),
            second_rig_path: None,
            port,
            model: CameraModel::StereoStd,
            resolution: Resolution::Svga,
            fps: 30,
            transport: TransportMode::Network,
            serial_number: 40976320,
            use_system_time: false,
        }
    }

    fn build_session(
        cfg: SessionConfig,
        graph: &Arc<SimRenderGraph>,
        imu: &Arc<SimInertial>,
        registry: &Arc<PortRegistry>,
    ) -> (CameraSession, Arc<Mutex<Vec<(usize, usize, u64, PoseSample)>>>) {
        let pushes = Arc::new(Mutex::new(Vec::new()));
        let sink = Box::new(RecordingSink::new(Arc::clone(&pushes)));
        let session = CameraSession::new(
            cfg,
            Arc::clone(graph) as Arc<dyn RenderGraph>,
            Arc::clone(imu) as Arc<dyn InertialInterface>,
            sink,
            Arc::clone(registry),
        );
        (session, pushes)
    }

    #[test]
    fn test_topology_model_stereo() {
        let graph = Arc::new(SimRenderGraph::new(0));
        let imu = Arc::new(SimInertial::new());
        let registry = Arc::new(PortRegistry::new());
        let (mut session, _) = build_session(stereo_config(30000), &graph, &imu, &registry);

        session.activate().unwrap();
        assert_eq!(session.topology(), Some(Topology::ModelStereo));
        assert_eq!(graph.target_count(), 2);
    }

    #[test]
    fn test_topology_mono_model() {
        let graph = Arc::new(SimRenderGraph::new(0));
        let imu = Arc::new(SimInertial::new());
        let registry = Arc::new(PortRegistry::new());
        let mut cfg = stereo_config(30002);
        cfg.model = CameraModel::MonoGs;
        let (mut session, pushes) = build_session(cfg, &graph, &imu, &registry);

        session.activate().unwrap();
        assert_eq!(session.topology(), Some(Topology::Mono));
        assert_eq!(graph.target_count(), 1);

        graph.render_tick();
        assert!(session.tick(0.0));
        // Mono streams push an empty right plane and a zero-filled pose
        let pushes = pushes.lock();
        assert_eq!(pushes[0].1, 0);
        assert_eq!(pushes[0].3, PoseSample::zero());
    }

    #[test]
    fn test_topology_custom_dual() {
        let graph = Arc::new(SimRenderGraph::new(0));
        let imu = Arc::new(SimInertial::new());
        let registry = Arc::new(PortRegistry::new());
        let mut cfg = stereo_config(30004);
        cfg.model = CameraModel::MonoGs; // model capability is overridden by two rigs
        cfg.second_rig_path = Some("/World/Rig1".to_string());
        let (mut session, _) = build_session(cfg, &graph, &imu, &registry);

        session.activate().unwrap();
        assert_eq!(session.topology(), Some(Topology::CustomDual));
        assert_eq!(graph.target_count(), 2);
    }

    #[test]
    fn test_duplicate_port_fails_second_session_only() {
        let graph = Arc::new(SimRenderGraph::new(0));
        let imu = Arc::new(SimInertial::new());
        let registry = Arc::new(PortRegistry::new());

        let (mut first, _) = build_session(stereo_config(30000), &graph, &imu, &registry);
        first.activate().unwrap();

        let (mut second, _) = build_session(stereo_config(30000), &graph, &imu, &registry);
        match second.activate() {
            Err(Error::PortConflict(port)) => assert_eq!(port, 30000),
            other => panic!("expected port conflict, got {:?}", other.map(|_| ())),
        }
        assert_eq!(second.state(), SessionState::Released);
        assert_eq!(first.state(), SessionState::Active);
        // The loser never owned the port, so the winner's reservation survives
        assert!(registry.is_reserved(30000));
    }

    #[test]
    fn test_degraded_mono_fallback() {
        let graph = Arc::new(SimRenderGraph::new(0));
        graph.fail_path("/World/Rig0/base_link/STEREO_STD/CameraRight");
        let imu = Arc::new(SimInertial::new());
        let registry = Arc::new(PortRegistry::new());
        let (mut session, pushes) = build_session(stereo_config(30000), &graph, &imu, &registry);

        session.activate().unwrap();
        assert_eq!(session.topology(), Some(Topology::ModelStereo));
        assert_eq!(graph.target_count(), 1);

        graph.render_tick();
        assert!(session.tick(0.0));
        assert_eq!(pushes.lock().len(), 1);
    }

    #[test]
    fn test_activation_fails_when_no_side_resolves() {
        let graph = Arc::new(SimRenderGraph::new(0));
        graph.fail_path("/World/Rig0/base_link/STEREO_STD/CameraLeft");
        graph.fail_path("/World/Rig0/base_link/STEREO_STD/CameraRight");
        let imu = Arc::new(SimInertial::new());
        let registry = Arc::new(PortRegistry::new());
        let (mut session, _) = build_session(stereo_config(30000), &graph, &imu, &registry);

        assert!(session.activate().is_err());
        assert_eq!(session.state(), SessionState::Released);
        // The port reserved during the failed attempt was given back
        assert!(!registry.is_reserved(30000));
    }

    #[test]
    fn test_failure_counter_reaches_threshold() {
        let graph = Arc::new(SimRenderGraph::new(0));
        let imu = Arc::new(SimInertial::new());
        let registry = Arc::new(PortRegistry::new());
        let (mut session, pushes) = build_session(stereo_config(30000), &graph, &imu, &registry);
        session.activate().unwrap();

        graph.render_tick();
        graph.set_shape_override(Some((640, 480)));
        let mut sim_time = 0.0;
        for _ in 0..9 {
            assert!(!session.tick(sim_time));
            sim_time += 0.1;
        }
        assert_eq!(session.stats().left_failures, 9);
        assert!(!session.tick(sim_time));
        assert_eq!(session.stats().left_failures, 10);
        assert!(pushes.lock().is_empty());

        // Counter resets on the next successful fetch
        graph.set_shape_override(None);
        assert!(session.tick(sim_time + 0.1));
        assert_eq!(session.stats().left_failures, 0);
    }

    #[test]
    fn test_pose_unavailable_skips_frame_for_stereo() {
        let graph = Arc::new(SimRenderGraph::new(0));
        let imu = Arc::new(SimInertial::new());
        imu.set_valid(false);
        let registry = Arc::new(PortRegistry::new());
        let (mut session, pushes) = build_session(stereo_config(30000), &graph, &imu, &registry);
        session.activate().unwrap();

        graph.render_tick();
        assert!(!session.tick(0.0));
        assert_eq!(session.stats().pose_failures, 1);
        assert!(pushes.lock().is_empty());

        imu.set_valid(true);
        assert!(session.tick(0.1));
        assert_eq!(session.stats().pose_failures, 0);
    }

    #[test]
    fn test_sink_failure_does_not_advance_gate() {
        let graph = Arc::new(SimRenderGraph::new(0));
        let imu = Arc::new(SimInertial::new());
        let registry = Arc::new(PortRegistry::new());
        let pushes = Arc::new(Mutex::new(Vec::new()));
        let mut sink = RecordingSink::new(Arc::clone(&pushes));
        sink.status = 7;
        let mut session = CameraSession::new(
            stereo_config(30000),
            Arc::clone(&graph) as Arc<dyn RenderGraph>,
            Arc::clone(&imu) as Arc<dyn InertialInterface>,
            Box::new(sink),
            Arc::clone(&registry),
        );
        session.activate().unwrap();

        graph.render_tick();
        assert!(!session.tick(0.0));
        assert_eq!(session.stats().push_failures, 1);
        // Baseline did not advance: the same tick time is admitted again
        assert!(!session.tick(0.0));
        assert_eq!(session.stats().push_failures, 2);
    }

    #[test]
    fn test_release_is_idempotent_and_frees_port_once() {
        let graph = Arc::new(SimRenderGraph::new(0));
        let imu = Arc::new(SimInertial::new());
        let registry = Arc::new(PortRegistry::new());
        let (mut session, _) = build_session(stereo_config(30000), &graph, &imu, &registry);
        session.activate().unwrap();

        session.release();
        assert_eq!(session.state(), SessionState::Released);
        assert!(!registry.is_reserved(30000));
        assert_eq!(graph.target_count(), 0);

        // Another owner takes the port; a second release must not free it
        assert!(registry.reserve(30000));
        session.release();
        assert!(registry.is_reserved(30000));
        assert_eq!(session.state(), SessionState::Released);
    }

    #[test]
    fn test_release_before_activation_is_safe() {
        let graph = Arc::new(SimRenderGraph::new(0));
        let imu = Arc::new(SimInertial::new());
        let registry = Arc::new(PortRegistry::new());
        let (mut session, _) = build_session(stereo_config(30000), &graph, &imu, &registry);

        session.release();
        assert_eq!(session.state(), SessionState::Released);
        assert!(session.activate().is_err());
        assert!(!session.tick(0.0));
    }

    #[test]
    fn test_end_to_end_frame_pacing() {
        let graph = Arc::new(SimRenderGraph::new(0));
        let imu = Arc::new(SimInertial::new());
        let registry = Arc::new(PortRegistry::new());
        let mut cfg = stereo_config(30000);
        cfg.resolution = Resolution::Hd1200;
        let (mut session, pushes) = build_session(cfg, &graph, &imu, &registry);
        session.activate().unwrap();

        graph.render_tick();
        assert!(session.tick(0.0));
        assert!(!session.tick(0.02));
        assert!(session.tick(0.05));

        let pushes = pushes.lock();
        assert_eq!(pushes.len(), 2);
        let expected = (1920 * 1200 * 3) as usize;
        assert_eq!(pushes[0].0, expected);
        assert_eq!(pushes[0].1, expected);
        // The stereo pose carries the remapped rig orientation
        assert_eq!(pushes[0].3.orientation, [1.0, 0.0, 0.0, 0.0]);
    }
}
