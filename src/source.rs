//! Image sources and frame validation.
//!
//! An [`ImageSource`] fetches the most recently rendered frame for one
//! logical camera. "Not rendered yet" and "wrong shape" are returned
//! statuses, never errors: the session retries them every tick and only
//! diagnoses after a consecutive-failure threshold.

use crate::error::Result;
use crate::graph::{AnnotatorId, RawFrame, RenderGraph, RenderTargetId};
use crate::model::Resolution;
use log::warn;
use std::sync::Arc;

/// Expected geometry of every streamed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameShape {
    pub height: u32,
    pub width: u32,
    pub channels: u32,
}

impl FrameShape {
    /// Streamed frames always carry three channels
    pub const CHANNELS: u32 = 3;

    /// Shape for a configured resolution
    pub fn for_resolution(resolution: Resolution) -> Self {
        let (width, height) = resolution.dims();
        Self {
            height,
            width,
            channels: Self::CHANNELS,
        }
    }

    /// Byte length of a frame with this shape
    pub fn byte_len(&self) -> usize {
        (self.height * self.width * self.channels) as usize
    }
}

/// Validated frame ready for the sink
#[derive(Debug, Clone)]
pub struct ImageFrame {
    pub data: Vec<u8>,
    pub shape: FrameShape,
}

/// Outcome of one fetch attempt
#[derive(Debug)]
pub enum Fetch {
    /// Frame produced and shape-validated
    Frame(ImageFrame),
    /// The render target has not produced a frame yet (warm-up)
    NotReady,
    /// A frame was produced but its geometry disagrees with configuration
    ShapeMismatch,
}

/// Source of frames for one logical camera (left, right, or mono)
pub trait ImageSource: Send {
    /// Fetch the most recently rendered frame
    fn fetch(&mut self) -> Fetch;

    /// Best-effort teardown; each sub-step failure is logged, not raised
    fn release(&mut self);

    /// Side label for diagnostics ("left", "right", "mono")
    fn label(&self) -> &'static str;
}

/// Image source backed by a render target plus an RGB annotator
pub struct AnnotatorSource {
    graph: Arc<dyn RenderGraph>,
    target: Option<RenderTargetId>,
    annotator: Option<AnnotatorId>,
    expected: FrameShape,
    label: &'static str,
}

impl AnnotatorSource {
    /// Create the render target for `camera_path` and attach an annotator
    pub fn attach(
        graph: Arc<dyn RenderGraph>,
        camera_path: &str,
        resolution: Resolution,
        label: &'static str,
    ) -> Result<Self> {
        let target = graph.create_render_target(camera_path, resolution, true)?;
        let annotator = match graph.attach_rgb_annotator(target) {
            Ok(a) => a,
            Err(e) => {
                // Do not leak the target when attach fails
                if let Err(destroy_err) = graph.destroy_target(target) {
                    warn!(
                        "ImageSource[{}]: failed to destroy target after attach error: {}",
                        label, destroy_err
                    );
                }
                return Err(e);
            }
        };
        Ok(Self {
            graph,
            target: Some(target),
            annotator: Some(annotator),
            expected: FrameShape::for_resolution(resolution),
            label,
        })
    }

    /// Expected shape of every fetched frame
    pub fn expected_shape(&self) -> FrameShape {
        self.expected
    }

    /// Drop a trailing alpha plane when the renderer emits one
    fn strip_to_rgb(raw: RawFrame) -> Option<Vec<u8>> {
        match raw.channels {
            c if c == FrameShape::CHANNELS => Some(raw.data),
            4 => {
                let pixels = (raw.width * raw.height) as usize;
                if raw.data.len() < pixels * 4 {
                    return None;
                }
                let mut rgb = Vec::with_capacity(pixels * 3);
                for px in raw.data.chunks_exact(4).take(pixels) {
                    rgb.extend_from_slice(&px[..3]);
                }
                Some(rgb)
            }
            _ => None,
        }
    }
}

impl ImageSource for AnnotatorSource {
    fn fetch(&mut self) -> Fetch {
        let annotator = match self.annotator {
            Some(a) => a,
            None => return Fetch::NotReady,
        };
        let raw = match self.graph.read_rgb(annotator) {
            Some(raw) => raw,
            None => return Fetch::NotReady,
        };
        if raw.height != self.expected.height || raw.width != self.expected.width {
            return Fetch::ShapeMismatch;
        }
        match Self::strip_to_rgb(raw) {
            Some(data) if data.len() == self.expected.byte_len() => Fetch::Frame(ImageFrame {
                data,
                shape: self.expected,
            }),
            _ => Fetch::ShapeMismatch,
        }
    }

    fn release(&mut self) {
        if let Some(annotator) = self.annotator.take() {
            if let Err(e) = self.graph.detach_annotator(annotator) {
                warn!("ImageSource[{}]: annotator detach failed: {}", self.label, e);
            }
        }
        if let Some(target) = self.target.take() {
            if let Err(e) = self.graph.destroy_target(target) {
                warn!(
                    "ImageSource[{}]: render target destroy failed: {}",
                    self.label, e
                );
            }
        }
    }

    fn label(&self) -> &'static str {
        self.label
    }
}

impl Drop for AnnotatorSource {
    fn drop(&mut self) {
        self.release();
    }
}
