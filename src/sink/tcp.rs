//! TCP implementation of the fusion sink boundary.
//!
//! A dedicated publisher thread owns the TCP listener for the session's
//! port; the tick path pushes packets to a lock-free queue and never
//! blocks. Consumers receive length-prefixed frames:
//!
//! ```text
//! [4-byte length (big-endian)][postcard FrameHeader][left bytes][right bytes]
//! ```

use crate::error::{Error, Result};
use crate::pose::PoseSample;
use crate::sink::{Sink, StreamParams, TransportMode};
use crossbeam_queue::ArrayQueue;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Push status: accepted
pub const PUSH_OK: i32 = 0;
/// Push status: sink not open
pub const PUSH_NOT_OPEN: i32 = 1;
/// Push status: outbound queue full (consumer too slow)
pub const PUSH_QUEUE_FULL: i32 = 2;

/// Per-frame metadata preceding the pixel planes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameHeader {
    pub serial_number: u32,
    pub timestamp_ns: u64,
    pub width: u32,
    pub height: u32,
    /// Orientation quaternion (w, x, y, z) in sink convention
    pub orientation: [f64; 4],
    /// Linear acceleration (m/s²)
    pub lin_acc: [f64; 3],
    pub left_len: u32,
    pub right_len: u32,
}

struct FramePacket {
    header: FrameHeader,
    left: Vec<u8>,
    right: Vec<u8>,
}

/// Fusion sink streaming over TCP
///
/// Queue depth is small on purpose: a stalled consumer drops frames
/// instead of stalling the simulation tick.
pub struct TcpSink {
    bind_host: String,
    queue: Option<Arc<ArrayQueue<FramePacket>>>,
    publisher_thread: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    params: Option<StreamParams>,
}

impl TcpSink {
    const QUEUE_DEPTH: usize = 8;

    /// Create a sink that will bind on `bind_host` when opened
    pub fn new(bind_host: &str) -> Self {
        Self {
            bind_host: bind_host.to_string(),
            queue: None,
            publisher_thread: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            params: None,
        }
    }

    fn publisher_loop(
        listener: TcpListener,
        queue: Arc<ArrayQueue<FramePacket>>,
        shutdown: Arc<AtomicBool>,
    ) {
        let mut clients: Vec<TcpStream> = Vec::new();
        let mut frames_sent = 0u64;
        let mut buffer = Vec::with_capacity(64 * 1024);

        while !shutdown.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        debug!("TcpSink: failed to set nodelay for {}: {}", addr, e);
                    }
                    info!("TcpSink: consumer connected: {}", addr);
                    clients.push(stream);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
                Err(e) => {
                    warn!("TcpSink: error accepting consumer: {}", e);
                }
            }

            let mut drained = false;
            while let Some(packet) = queue.pop() {
                drained = true;
                match Self::encode(&packet, &mut buffer) {
                    Ok(()) => {
                        Self::broadcast(&mut clients, &buffer);
                        frames_sent += 1;
                    }
                    Err(e) => warn!("TcpSink: failed to encode frame: {}", e),
                }
            }

            if !drained {
                thread::sleep(Duration::from_millis(2));
            }
        }

        info!("TcpSink: publisher thread exiting ({} frames sent)", frames_sent);
    }

    /// Serialize one packet into the reusable buffer
    fn encode(packet: &FramePacket, buffer: &mut Vec<u8>) -> Result<()> {
        let header = postcard::to_allocvec(&packet.header)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let frame_len = (header.len() + packet.left.len() + packet.right.len()) as u32;

        buffer.clear();
        buffer.reserve(4 + frame_len as usize);
        buffer.extend_from_slice(&frame_len.to_be_bytes());
        buffer.extend_from_slice(&header);
        buffer.extend_from_slice(&packet.left);
        buffer.extend_from_slice(&packet.right);
        Ok(())
    }

    /// Send the encoded frame to every consumer, dropping the dead ones
    fn broadcast(clients: &mut Vec<TcpStream>, buffer: &[u8]) {
        clients.retain_mut(|client| match client.write_all(buffer) {
            Ok(_) => true,
            Err(e) => {
                if let Ok(addr) = client.peer_addr() {
                    debug!("TcpSink: consumer {} disconnected: {}", addr, e);
                }
                false
            }
        });
    }
}

impl Sink for TcpSink {
    fn open(&mut self, params: &StreamParams) -> Result<()> {
        if let Some(open) = &self.params {
            return Err(Error::Sink(format!(
                "sink already open on port {}",
                open.port
            )));
        }

        if params.transport != TransportMode::Network {
            warn!(
                "TcpSink: transport {} not supported by this sink, streaming over network",
                params.transport.label()
            );
        }

        let addr = format!("{}:{}", self.bind_host, params.port);
        let listener = TcpListener::bind(&addr).map_err(|e| {
            Error::Sink(format!("failed to bind sink listener on {}: {}", addr, e))
        })?;
        listener.set_nonblocking(true)?;

        let queue = Arc::new(ArrayQueue::new(Self::QUEUE_DEPTH));
        self.shutdown.store(false, Ordering::SeqCst);

        let thread_queue = Arc::clone(&queue);
        let shutdown = Arc::clone(&self.shutdown);
        let thread = thread::Builder::new()
            .name(format!("sink-publisher-{}", params.port))
            .spawn(move || Self::publisher_loop(listener, thread_queue, shutdown))?;

        info!(
            "TcpSink: streaming {}x{} @ {}fps (serial {}) on {}",
            params.image_width, params.image_height, params.fps, params.serial_number, addr
        );

        self.queue = Some(queue);
        self.publisher_thread = Some(thread);
        self.params = Some(params.clone());
        Ok(())
    }

    fn push(&mut self, left: &[u8], right: &[u8], timestamp_ns: u64, pose: &PoseSample) -> i32 {
        let (queue, params) = match (&self.queue, &self.params) {
            (Some(q), Some(p)) => (q, p),
            _ => return PUSH_NOT_OPEN,
        };

        let packet = FramePacket {
            header: FrameHeader {
                serial_number: params.serial_number,
                timestamp_ns,
                width: params.image_width,
                height: params.image_height,
                orientation: pose.orientation,
                lin_acc: pose.lin_acc,
                left_len: left.len() as u32,
                right_len: right.len() as u32,
            },
            left: left.to_vec(),
            right: right.to_vec(),
        };

        match queue.push(packet) {
            Ok(()) => PUSH_OK,
            Err(_) => PUSH_QUEUE_FULL,
        }
    }

    fn close(&mut self) {
        if self.queue.take().is_none() {
            return;
        }
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(thread) = self.publisher_thread.take() {
            let _ = thread.join();
        }
        if let Some(params) = self.params.take() {
            info!("TcpSink: closed on port {}", params.port);
        }
    }
}

impl Drop for TcpSink {
    fn drop(&mut self) {
        self.close();
    }
}
