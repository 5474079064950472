use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::{AmbientSh, ProbeParams};

/// Parameters bound to every SSGI kernel dispatch.
///
/// Most of the block is the same for all passes of a camera-frame; only
/// `blur_pass` differs between the blur dispatches.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct PassParams {
    pub prev_inv_view_proj: Mat4,

    /// Non-jittered view-projection of the current and of the previous
    /// frame; only read by the motion vector fixup
    pub view_proj: Mat4,
    pub prev_view_proj: Mat4,

    /// Camera's position from the previous frame (`xyz`)
    pub prev_camera_position: Vec4,

    /// 2x2 rotation matrix applied to the spatial blur's sampling pattern,
    /// stored as `(cos, sin, -sin, cos)`
    pub blur_rotator: Vec4,

    pub ambient: AmbientSh,
    pub probe: ProbeParams,

    pub max_steps: f32,
    pub max_small_steps: f32,
    pub max_medium_steps: f32,
    pub step_size: f32,
    pub small_step_size: f32,
    pub medium_step_size: f32,
    pub thickness: f32,
    pub ray_count: f32,

    pub temporal_intensity: f32,
    pub max_brightness: f32,
    pub is_probe_camera: f32,

    /// 0 - no back-face data, 1 - back-face depth, 2 - back-face depth and
    /// color
    pub back_depth_enabled: f32,

    pub pixel_spread_angle_tangent: f32,
    pub history_texture_valid: f32,
    pub indirect_diffuse_multiplier: f32,
    pub aggressive_denoise: f32,

    pub denoiser_radius: f32,
    pub probe_weight: f32,
    pub probe_set: f32,
    pub down_sample: f32,

    pub frame_index: u32,
    pub rendering_layers: u32,
    pub use_rendering_layers: u32,
    pub blur_pass: u32,
}

impl PassParams {
    pub fn has_history(&self) -> bool {
        self.history_texture_valid > 0.0
    }

    pub fn has_probe(&self) -> bool {
        self.probe_set > 0.0
    }

    pub fn with_blur_pass(mut self, blur_pass: u32) -> Self {
        self.blur_pass = blur_pass;
        self
    }
}
