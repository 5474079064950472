use glam::{Mat4, Vec3};

use crate::{
    gpu, Camera, DenoiseSettings, FrameCounter, FrameInputs, GBufferFormats,
    GBufferRequirements, Plan, RaySteps, ReflectionProbe, SsgiSettings, Stage,
};

/// Settings resolved for a single frame, shared by all cameras rendered in
/// it.
#[derive(Clone, Debug)]
pub struct FrameConfig {
    pub ray_steps: RaySteps,
    pub ray_count: u32,

    /// Resolution scale the indirect lighting is traced at
    pub scale: f32,

    pub thickness: f32,
    pub denoise: DenoiseSettings,
    pub indirect_diffuse_multiplier: f32,

    /// Rendering-layer mask, when the host writes rendering layers and the
    /// volume doesn't cover all of them
    pub rendering_layers: Option<u32>,

    pub override_ambient: bool,
    pub ambient: gpu::AmbientSh,

    /// Buffers the host has to render for SSGI this frame
    pub gbuffer: GBufferRequirements,
    pub gbuffer_formats: GBufferFormats,

    /// Whether rays that miss fall back to a reflection probe picked by the
    /// engine (as opposed to nothing, or the host's probe atlas)
    pub use_probe_fallback: bool,
}

impl FrameConfig {
    pub fn plan(&self) -> Plan {
        Plan {
            denoise: self.denoise.enabled,
            aggressive_blur: self.denoise.is_aggressive(),
            second_blur: self.denoise.runs_second_pass(),
        }
    }

    pub(crate) fn denoise_of(settings: &SsgiSettings) -> DenoiseSettings {
        DenoiseSettings {
            intensity: settings.denoise.intensity(),
            radius: settings.denoise.radius(),
            ..settings.denoise.clone()
        }
    }

    /// Builds the parameter block shared by all passes of a camera-frame.
    pub fn pass_params<T>(
        &self,
        camera: &Camera,
        inputs: &FrameInputs<'_, T>,
        history: PreviousFrame,
        probe: Option<&ReflectionProbe<T>>,
        frame: FrameCounter,
    ) -> gpu::PassParams {
        let flag = |value: bool| if value { 1.0 } else { 0.0 };

        gpu::PassParams {
            prev_inv_view_proj: history.inv_view_proj,
            view_proj: camera.view_proj(),
            prev_view_proj: history.inv_view_proj.inverse(),
            prev_camera_position: history.position.extend(0.0),
            blur_rotator: frame.rotator(),
            ambient: self.ambient,
            probe: probe.map(|probe| probe.params()).unwrap_or_default(),

            max_steps: self.ray_steps.max_steps as f32,
            max_small_steps: self.ray_steps.max_small_steps as f32,
            max_medium_steps: self.ray_steps.max_medium_steps as f32,
            step_size: self.ray_steps.step_size,
            small_step_size: self.ray_steps.small_step_size,
            medium_step_size: self.ray_steps.medium_step_size,
            thickness: self.thickness,
            ray_count: self.ray_count as f32,

            temporal_intensity: self.denoise.intensity,
            max_brightness: gpu::MAX_BRIGHTNESS,
            is_probe_camera: flag(camera.is_reflection()),
            back_depth_enabled: inputs.backface_mode().param(),
            pixel_spread_angle_tangent: camera
                .pixel_spread_angle_tangent(self.scale),
            history_texture_valid: flag(history.valid),
            indirect_diffuse_multiplier: self.indirect_diffuse_multiplier,
            aggressive_denoise: flag(self.denoise.is_aggressive()),

            // Kernels sample the blur kernel with a doubled radius
            denoiser_radius: self.denoise.radius * 2.0,

            // Only one probe is ever bound
            probe_weight: 0.0,

            probe_set: flag(probe.is_some()),
            down_sample: self.scale,

            frame_index: frame.get(),
            rendering_layers: self
                .rendering_layers
                .unwrap_or(SsgiSettings::ALL_RENDERING_LAYERS),
            use_rendering_layers: self.rendering_layers.is_some() as u32,
            blur_pass: 0,
        }
    }
}

/// What the engine remembers about the camera's previous frame.
#[derive(Clone, Copy, Debug)]
pub struct PreviousFrame {
    pub inv_view_proj: Mat4,
    pub position: Vec3,

    /// Whether the history textures may be reprojected
    pub valid: bool,
}

/// Outcome of rendering a single camera.
#[derive(Clone, Debug)]
pub struct FrameReport {
    /// Index of the camera's history record
    pub slot: usize,

    /// Whether this frame reprojected real history
    pub history_valid: bool,

    pub frame_index: u32,

    /// Index of the reflection probe rays fell back to
    pub probe: Option<usize>,

    pub stages: Vec<Stage>,
}
