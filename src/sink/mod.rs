//! Fusion sink boundary.
//!
//! The external fusion SDK is an opaque collaborator: sessions open it with
//! the stream geometry, push frame buffers plus pose metadata, and treat
//! any non-zero push status as an opaque failure code to log, never to
//! interpret.

pub mod tcp;

use crate::error::Result;
use crate::pose::PoseSample;

/// Transport used between the sink and its consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Network streaming
    Network,
    /// Shared-memory / local IPC
    Ipc,
    /// Both transports simultaneously
    Both,
}

impl TransportMode {
    /// Parse a transport name from configuration
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "NETWORK" => Some(TransportMode::Network),
            "IPC" => Some(TransportMode::Ipc),
            "BOTH" => Some(TransportMode::Both),
            _ => None,
        }
    }

    /// Configuration name of this transport
    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Network => "NETWORK",
            TransportMode::Ipc => "IPC",
            TransportMode::Both => "BOTH",
        }
    }
}

/// Parameters handed to the sink when a session activates
#[derive(Debug, Clone)]
pub struct StreamParams {
    pub port: u16,
    pub serial_number: u32,
    pub image_width: u32,
    pub image_height: u32,
    pub fps: u32,
    pub transport: TransportMode,
    /// Whether pushed buffers still carry an alpha plane
    pub alpha_channel_included: bool,
    /// Whether pushed buffers are RGB-encoded (as opposed to planar YUV)
    pub rgb_encoded: bool,
    /// Codec selector for the consumer side; opaque to this process
    pub codec_type: u8,
}

/// External fusion sink
pub trait Sink: Send {
    /// Open the sink for the given stream geometry
    fn open(&mut self, params: &StreamParams) -> Result<()>;

    /// Push one frame pair plus pose metadata
    ///
    /// `right` is empty for mono streams. Returns `0` on success; any other
    /// value is an opaque failure code.
    fn push(&mut self, left: &[u8], right: &[u8], timestamp_ns: u64, pose: &PoseSample) -> i32;

    /// Close the sink and free its resources; safe to call more than once
    fn close(&mut self);
}
