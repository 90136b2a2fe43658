use crate::driver::FrameOutcome;
use crate::matrix_operations::flatten_4x4_matrix_for_wgpu;
use crate::rig::{Eye, EyeCamera};
use bytemuck::{Pod, Zeroable};
use cgmath::{Matrix4, Point3, Rad, Transform};
use log::debug;
use std::time::Duration;

/// What a renderer needs to draw one eye.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeView {
    pub eye: Eye,
    pub world_transform: Matrix4<f64>,
    pub view_matrix: Matrix4<f64>,
    pub horizontal_offset: f32,
    pub near_clip: f64,
    pub far_clip: f64,
    pub field_of_view_y: f64,
}

impl EyeView {
    pub fn position(&self) -> Point3<f64> {
        self.world_transform.transform_point(Point3::new(0.0, 0.0, 0.0))
    }

    pub fn projection(&self, aspect: f64) -> Matrix4<f64> {
        cgmath::perspective(Rad(self.field_of_view_y), aspect, self.near_clip, self.far_clip)
    }

    pub fn uniform(&self, aspect: f64) -> EyeUniform {
        EyeUniform {
            view_transform: flatten_4x4_matrix_for_wgpu(self.view_matrix),
            projection: flatten_4x4_matrix_for_wgpu(self.projection(aspect)),
            eye_offset: self.horizontal_offset,
            far_clip: self.far_clip as f32,
            _padding: [0.0; 2],
        }
    }

    pub fn camera(&self) -> EyeCamera {
        EyeCamera {
            horizontal_offset: self.horizontal_offset,
            near_clip: self.near_clip,
            far_clip: self.far_clip,
            field_of_view_y: self.field_of_view_y,
        }
    }
}

/// Per-eye uniform block, laid out for a std140 buffer.
#[repr(C)]
#[derive(Default, Copy, Clone, Debug, Pod, Zeroable)]
pub struct EyeUniform {
    pub view_transform: [f32; 16],
    pub projection: [f32; 16],
    pub eye_offset: f32,
    pub far_clip: f32,
    _padding: [f32; 2],
}

/// Both points of view for one rendered frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StereoFrame {
    pub index: u64,
    pub time: Duration,
    pub outcome: FrameOutcome,
    pub left: EyeView,
    pub right: EyeView,
}

impl StereoFrame {
    pub fn view(&self, eye: Eye) -> &EyeView {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }

    pub fn uniforms(&self, aspect: f64) -> [EyeUniform; 2] {
        [self.left.uniform(aspect), self.right.uniform(aspect)]
    }
}

/// The renderer seam: receives the two points of view once per frame.
pub trait StereoRenderer {
    fn render(&mut self, frame: &StereoFrame);
}

/// Renderer that only reports the eye poses.
#[derive(Debug)]
pub struct LogRenderer {
    every_frames: u64,
    aspect: f64,
    rendered: u64,
}

impl LogRenderer {
    pub fn new(every_frames: u64) -> Self {
        LogRenderer {
            every_frames: every_frames.max(1),
            aspect: 1.0,
            rendered: 0,
        }
    }

    pub fn set_aspect(&mut self, aspect: f64) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn rendered(&self) -> u64 {
        self.rendered
    }
}

impl StereoRenderer for LogRenderer {
    fn render(&mut self, frame: &StereoFrame) {
        self.rendered += 1;
        if frame.index % self.every_frames != 0 {
            return;
        }
        let uniforms = frame.uniforms(self.aspect);
        let bytes: &[u8] = bytemuck::cast_slice(&uniforms);
        let left = frame.left.position();
        let right = frame.right.position();
        debug!(
            "frame {} at {:.3}s ({:?}): left eye ({:.2}, {:.2}, {:.2}) right eye ({:.2}, {:.2}, {:.2}), {} uniform bytes",
            frame.index,
            frame.time.as_secs_f64(),
            frame.outcome,
            left.x,
            left.y,
            left.z,
            right.x,
            right.y,
            right.z,
            bytes.len()
        );
    }
}
