//! Render graph service boundary.
//!
//! The host owns the render/dataflow graph; sessions only ask it to create
//! render targets for camera rig paths, attach RGB annotators, and read the
//! most recently rendered frame. A simulated implementation for
//! hardware-free runs and tests lives in [`sim`].

pub mod sim;

use crate::error::Result;
use crate::model::Resolution;

/// Handle to a render target created for one camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetId(pub u64);

/// Handle to an RGB annotator attached to a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnnotatorId(pub u64);

/// Raw frame as produced by an annotator
///
/// The channel count is whatever the renderer emits (commonly 4 with an
/// alpha plane); shape validation and alpha stripping happen in the image
/// source layer.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub data: Vec<u8>,
    pub height: u32,
    pub width: u32,
    pub channels: u32,
}

/// External render graph service
pub trait RenderGraph: Send + Sync {
    /// Create a render target for the camera at `camera_path`
    fn create_render_target(
        &self,
        camera_path: &str,
        resolution: Resolution,
        force_new: bool,
    ) -> Result<RenderTargetId>;

    /// Destroy a render target
    fn destroy_target(&self, target: RenderTargetId) -> Result<()>;

    /// Attach an RGB annotator to a render target
    fn attach_rgb_annotator(&self, target: RenderTargetId) -> Result<AnnotatorId>;

    /// Detach an annotator from its render target
    fn detach_annotator(&self, annotator: AnnotatorId) -> Result<()>;

    /// Most recently rendered frame for an annotator
    ///
    /// `None` means nothing has been rendered yet; this is expected during
    /// warm-up and is never an error.
    fn read_rgb(&self, annotator: AnnotatorId) -> Option<RawFrame>;
}
