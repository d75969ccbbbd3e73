//! Simulated render graph and inertial sensor.
//!
//! Stands in for the host's render/dataflow graph so the daemon and tests
//! can run without a renderer. Frames become available after a configurable
//! warm-up, pixel data is a cheap gradient pattern, and tests can inject
//! failures (unresolvable camera paths, mismatched frame shapes, missing or
//! invalid inertial readings).

use crate::error::{Error, Result};
use crate::graph::{AnnotatorId, RawFrame, RenderGraph, RenderTargetId};
use crate::model::Resolution;
use crate::pose::{ImuReading, InertialInterface};
use log::debug;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

struct TargetState {
    camera_path: String,
    resolution: Resolution,
    frames_rendered: u64,
}

struct GraphState {
    next_id: u64,
    targets: HashMap<RenderTargetId, TargetState>,
    annotators: HashMap<AnnotatorId, RenderTargetId>,
    fail_paths: HashSet<String>,
    shape_override: Option<(u32, u32)>,
}

/// Simulated render graph
pub struct SimRenderGraph {
    state: Mutex<GraphState>,
    /// Frames a target must render before reads return data
    warmup_frames: u64,
    /// Channels emitted per pixel (the renderer includes an alpha plane)
    channels: u32,
}

impl SimRenderGraph {
    /// Create a simulated graph with the given warm-up length
    pub fn new(warmup_frames: u64) -> Self {
        Self {
            state: Mutex::new(GraphState {
                next_id: 1,
                targets: HashMap::new(),
                annotators: HashMap::new(),
                fail_paths: HashSet::new(),
                shape_override: None,
            }),
            warmup_frames,
            channels: 4,
        }
    }

    /// Advance the simulated renderer by one frame on every target
    pub fn render_tick(&self) {
        let mut state = self.state.lock();
        for target in state.targets.values_mut() {
            target.frames_rendered += 1;
        }
    }

    /// Make `create_render_target` fail for a camera path
    pub fn fail_path(&self, camera_path: &str) {
        self.state.lock().fail_paths.insert(camera_path.to_string());
    }

    /// Override the shape of every produced frame (simulates a source
    /// resolution changing underneath a session)
    pub fn set_shape_override(&self, shape: Option<(u32, u32)>) {
        self.state.lock().shape_override = shape;
    }

    /// Number of live render targets
    pub fn target_count(&self) -> usize {
        self.state.lock().targets.len()
    }

    /// Number of attached annotators
    pub fn annotator_count(&self) -> usize {
        self.state.lock().annotators.len()
    }

    fn alloc_id(state: &mut GraphState) -> u64 {
        let id = state.next_id;
        state.next_id += 1;
        id
    }
}

impl RenderGraph for SimRenderGraph {
    fn create_render_target(
        &self,
        camera_path: &str,
        resolution: Resolution,
        _force_new: bool,
    ) -> Result<RenderTargetId> {
        let mut state = self.state.lock();
        if state.fail_paths.contains(camera_path) {
            return Err(Error::RenderGraph(format!(
                "camera path {} does not resolve to a render target",
                camera_path
            )));
        }
        let id = RenderTargetId(Self::alloc_id(&mut state));
        state.targets.insert(
            id,
            TargetState {
                camera_path: camera_path.to_string(),
                resolution,
                frames_rendered: 0,
            },
        );
        debug!("SimRenderGraph: created target {:?} for {}", id, camera_path);
        Ok(id)
    }

    fn destroy_target(&self, target: RenderTargetId) -> Result<()> {
        let mut state = self.state.lock();
        match state.targets.remove(&target) {
            Some(t) => {
                debug!("SimRenderGraph: destroyed target for {}", t.camera_path);
                Ok(())
            }
            None => Err(Error::RenderGraph(format!(
                "unknown render target {:?}",
                target
            ))),
        }
    }

    fn attach_rgb_annotator(&self, target: RenderTargetId) -> Result<AnnotatorId> {
        let mut state = self.state.lock();
        if !state.targets.contains_key(&target) {
            return Err(Error::RenderGraph(format!(
                "cannot attach annotator to unknown target {:?}",
                target
            )));
        }
        let id = AnnotatorId(Self::alloc_id(&mut state));
        state.annotators.insert(id, target);
        Ok(id)
    }

    fn detach_annotator(&self, annotator: AnnotatorId) -> Result<()> {
        let mut state = self.state.lock();
        match state.annotators.remove(&annotator) {
            Some(_) => Ok(()),
            None => Err(Error::RenderGraph(format!(
                "unknown annotator {:?}",
                annotator
            ))),
        }
    }

    fn read_rgb(&self, annotator: AnnotatorId) -> Option<RawFrame> {
        let state = self.state.lock();
        let target = state.annotators.get(&annotator)?;
        let target = state.targets.get(target)?;
        if target.frames_rendered < self.warmup_frames {
            return None;
        }
        let (width, height) = state
            .shape_override
            .unwrap_or_else(|| target.resolution.dims());
        let size = (width * height * self.channels) as usize;
        // Gradient keyed to the frame counter so consecutive frames differ
        let seed = (target.frames_rendered & 0xff) as u8;
        let mut data = vec![0u8; size];
        for (i, px) in data.iter_mut().enumerate() {
            *px = seed.wrapping_add((i % 251) as u8);
        }
        Some(RawFrame {
            data,
            height,
            width,
            channels: self.channels,
        })
    }
}

struct InertialState {
    reading: ImuReading,
    present: bool,
}

/// Simulated inertial sensor shared by every rig in the scene
pub struct SimInertial {
    state: Mutex<InertialState>,
}

impl SimInertial {
    /// Create a sensor at rest reporting identity orientation and gravity
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InertialState {
                reading: ImuReading {
                    orientation: [1.0, 0.0, 0.0, 0.0],
                    lin_acc: [0.0, 0.0, 9.81],
                    is_valid: true,
                },
                present: true,
            }),
        }
    }

    /// Replace the current reading
    pub fn set_reading(&self, reading: ImuReading) {
        self.state.lock().reading = reading;
    }

    /// Simulate the sensor prim being deleted (or restored)
    pub fn set_present(&self, present: bool) {
        self.state.lock().present = present;
    }

    /// Mark the current reading valid or invalid
    pub fn set_valid(&self, valid: bool) {
        self.state.lock().reading.is_valid = valid;
    }
}

impl Default for SimInertial {
    fn default() -> Self {
        Self::new()
    }
}

impl InertialInterface for SimInertial {
    fn is_sensor_present(&self, _prim_path: &str) -> bool {
        self.state.lock().present
    }

    fn sensor_reading(&self, _prim_path: &str) -> Option<ImuReading> {
        let state = self.state.lock();
        if !state.present {
            return None;
        }
        Some(state.reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup_then_frames() {
        let graph = SimRenderGraph::new(2);
        let target = graph
            .create_render_target("/World/Rig0/cam", Resolution::Svga, true)
            .unwrap();
        let annot = graph.attach_rgb_annotator(target).unwrap();

        assert!(graph.read_rgb(annot).is_none());
        graph.render_tick();
        assert!(graph.read_rgb(annot).is_none());
        graph.render_tick();

        let frame = graph.read_rgb(annot).unwrap();
        assert_eq!((frame.width, frame.height), (960, 600));
        assert_eq!(frame.channels, 4);
        assert_eq!(frame.data.len(), 960 * 600 * 4);
    }

    #[test]
    fn test_fail_path_rejects_create() {
        let graph = SimRenderGraph::new(0);
        graph.fail_path("/World/missing");
        assert!(graph
            .create_render_target("/World/missing", Resolution::Svga, true)
            .is_err());
    }

    #[test]
    fn test_shape_override_changes_frames() {
        let graph = SimRenderGraph::new(0);
        let target = graph
            .create_render_target("/World/Rig0/cam", Resolution::Svga, true)
            .unwrap();
        let annot = graph.attach_rgb_annotator(target).unwrap();
        graph.render_tick();
        graph.set_shape_override(Some((640, 480)));
        let frame = graph.read_rgb(annot).unwrap();
        assert_eq!((frame.width, frame.height), (640, 480));
    }

    #[test]
    fn test_detach_and_destroy() {
        let graph = SimRenderGraph::new(0);
        let target = graph
            .create_render_target("/World/Rig0/cam", Resolution::Svga, true)
            .unwrap();
        let annot = graph.attach_rgb_annotator(target).unwrap();
        graph.detach_annotator(annot).unwrap();
        assert!(graph.read_rgb(annot).is_none());
        graph.destroy_target(target).unwrap();
        assert!(graph.destroy_target(target).is_err());
        assert_eq!(graph.target_count(), 0);
    }
}
