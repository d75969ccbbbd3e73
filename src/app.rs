//! Application orchestration for the camera streaming daemon.
//!
//! Builds the simulated render graph and inertial sensor, activates one
//! streaming session per configured camera rig, and drives the simulation
//! loop until a shutdown signal arrives. Sessions that fail to activate are
//! logged and skipped; the remaining rigs keep streaming.

use crate::config::AppConfig;
use crate::error::Result;
use crate::graph::sim::{SimInertial, SimRenderGraph};
use crate::graph::RenderGraph;
use crate::pose::InertialInterface;
use crate::registry::PortRegistry;
use crate::session::{CameraSession, SessionState, StopHub};
use crate::sink::tcp::TcpSink;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Render warm-up before the first frame is readable
const WARMUP_FRAMES: u64 = 3;

/// Main application structure that manages all streaming sessions
pub struct StreamerApp {
    config: AppConfig,
    graph: Arc<SimRenderGraph>,
    sessions: Vec<Arc<Mutex<CameraSession>>>,
    stop_hub: Arc<StopHub>,
    shutdown: Arc<AtomicBool>,
}

impl StreamerApp {
    /// Create a new application instance
    ///
    /// Builds the shared scene services and one session per camera entry.
    /// Sessions are created but not yet activated.
    pub fn new(config: AppConfig) -> Self {
        info!("Initializing camera streamer");

        let graph = Arc::new(SimRenderGraph::new(WARMUP_FRAMES));
        let imu = Arc::new(SimInertial::new());
        let registry = Arc::new(PortRegistry::new());
        let stop_hub = StopHub::new();

        let mut sessions = Vec::with_capacity(config.camera.len());
        for entry in &config.camera {
            let session_cfg = entry.resolve();
            let sink = Box::new(TcpSink::new(&config.streaming.bind_host));
            let session = CameraSession::new(
                session_cfg,
                Arc::clone(&graph) as Arc<dyn RenderGraph>,
                Arc::clone(&imu) as Arc<dyn InertialInterface>,
                sink,
                Arc::clone(&registry),
            );
            sessions.push(Arc::new(Mutex::new(session)));
        }

        Self {
            config,
            graph,
            sessions,
            stop_hub,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Activate every session and run the simulation loop
    pub fn run(&mut self) -> Result<()> {
        let mut active = 0usize;
        for session in &self.sessions {
            let mut guard = session.lock();
            match guard.activate() {
                Ok(()) => {
                    active += 1;
                    drop(guard);
                    // The stop signal releases the session; the token is
                    // cancelled when the session releases itself first.
                    let stop_target = Arc::clone(session);
                    let token = self.stop_hub.subscribe(move || {
                        stop_target.lock().release();
                    });
                    session.lock().set_stop_token(token);
                }
                Err(e) => {
                    error!("Failed to activate session {}: {}", guard.name(), e);
                }
            }
        }

        if active == 0 {
            warn!("No camera session activated, nothing to stream");
            return Ok(());
        }

        self.setup_signal_handler();
        info!("{} of {} sessions streaming", active, self.sessions.len());
        info!("Press Ctrl+C to stop");

        let tick_rate = self.config.streaming.tick_rate_hz.max(1);
        let tick_period = Duration::from_secs_f64(1.0 / tick_rate as f64);
        let mut sim_time = 0.0f64;
        let mut last_stats = Instant::now();

        while !self.shutdown.load(Ordering::Relaxed) {
            let tick_start = Instant::now();

            self.graph.render_tick();
            for session in &self.sessions {
                session.lock().tick(sim_time);
            }
            sim_time += tick_period.as_secs_f64();

            if last_stats.elapsed().as_secs() >= 10 {
                self.log_statistics();
                last_stats = Instant::now();
            }

            let elapsed = tick_start.elapsed();
            if elapsed < tick_period {
                std::thread::sleep(tick_period - elapsed);
            }
        }

        info!("Shutdown signal received, releasing sessions...");
        self.stop_hub.fire();
        info!("Camera streamer stopped");
        Ok(())
    }

    /// Setup signal handler for graceful shutdown
    fn setup_signal_handler(&self) {
        let shutdown = Arc::clone(&self.shutdown);

        std::thread::Builder::new()
            .name("signal-handler".to_string())
            .spawn(move || {
                let mut signals =
                    Signals::new([SIGINT, SIGTERM]).expect("Failed to register signal handlers");

                if let Some(sig) = signals.forever().next() {
                    info!("Received signal {:?}, initiating shutdown...", sig);
                    shutdown.store(true, Ordering::Relaxed);
                }
            })
            .expect("Failed to spawn signal handler thread");
    }

    /// Log per-session statistics
    fn log_statistics(&self) {
        for session in &self.sessions {
            let guard = session.lock();
            if guard.state() != SessionState::Active {
                continue;
            }
            let stats = guard.stats();
            info!(
                "{}: frames={} failures(left={} right={} pose={} push={})",
                guard.name(),
                stats.frames_pushed,
                stats.left_failures,
                stats.right_failures,
                stats.pose_failures,
                stats.push_failures
            );
        }
    }
}

impl Drop for StreamerApp {
    fn drop(&mut self) {
        debug!("StreamerApp cleaning up...");
        self.shutdown.store(true, Ordering::Relaxed);
        self.stop_hub.fire();
    }
}
