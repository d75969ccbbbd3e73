//! drishti-stream - Virtual camera streaming library
//!
//! This library provides the building blocks of the camera streaming
//! daemon: per-rig streaming sessions over a simulated render graph, frame
//! pacing against simulation time, pose metadata from the rig's inertial
//! sensor, and TCP fusion sinks with one port per session.

pub mod app;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod pose;
pub mod registry;
pub mod session;
pub mod sink;
pub mod source;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
pub use model::{CameraModel, Resolution};
pub use registry::PortRegistry;
pub use session::{CameraSession, SessionConfig, SessionState, StopHub, Topology};
