use derivative::Derivative;
use log::warn;

use crate::QualitySettings;

/// Per-volume SSGI settings, as tweaked by the user.
#[derive(Clone, Debug, Derivative)]
#[derivative(Default)]
pub struct SsgiSettings {
    pub enable: bool,
    pub thickness_mode: ThicknessMode,

    /// Thickness assumed for everything the depth buffer sees; clamped to
    /// `[0.0, 0.5]`.
    #[derivative(Default(value = "0.1"))]
    pub depth_buffer_thickness: f32,

    pub quality: QualitySettings,

    /// When set, `resolution_scale` is ignored and everything's traced at
    /// the camera's resolution.
    pub full_resolution: bool,

    /// Clamped to `[0.25, 0.75]`.
    #[derivative(Default(value = "0.5"))]
    pub resolution_scale: f32,

    pub denoise: DenoiseSettings,
    pub ray_miss: RayMiss,

    #[derivative(Default(value = "1.0"))]
    pub indirect_diffuse_multiplier: f32,

    /// Bitmask of rendering layers that receive indirect lighting.
    #[derivative(Default(value = "0xffff"))]
    pub rendering_layers: u32,
}

impl SsgiSettings {
    pub const ALL_RENDERING_LAYERS: u32 = 0xffff;

    pub fn is_active(&self) -> bool {
        self.enable && self.rendering_layers != 0
    }

    /// Returns the resolution scale that's actually used for tracing.
    pub fn effective_scale(&self) -> f32 {
        if self.full_resolution {
            1.0
        } else {
            self.resolution_scale.clamp(0.25, 0.75)
        }
    }

    pub fn depth_buffer_thickness(&self) -> f32 {
        self.depth_buffer_thickness.clamp(0.0, 0.5)
    }

    pub fn indirect_diffuse_multiplier(&self) -> f32 {
        self.indirect_diffuse_multiplier.max(0.0)
    }

    /// Brings all fields back into their ranges, warning about the ones that
    /// had to be adjusted.
    pub fn sanitize(&mut self) {
        fn clamp(name: &str, value: &mut f32, min: f32, max: f32) {
            let clamped = value.clamp(min, max);

            if clamped != *value {
                warn!("Clamping `{name}` from {value} to {clamped}");
                *value = clamped;
            }
        }

        clamp(
            "depth_buffer_thickness",
            &mut self.depth_buffer_thickness,
            0.0,
            0.5,
        );

        clamp("resolution_scale", &mut self.resolution_scale, 0.25, 0.75);

        clamp(
            "indirect_diffuse_multiplier",
            &mut self.indirect_diffuse_multiplier,
            0.0,
            f32::MAX,
        );

        clamp("denoise.intensity", &mut self.denoise.intensity, 0.5, 0.95);
        clamp("denoise.radius", &mut self.denoise.radius, 0.0, 1.0);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThicknessMode {
    /// Everything's assumed to be `depth_buffer_thickness` thick
    #[default]
    Constant,

    /// Thickness is computed from the back-face depth buffer
    ComputeBackfaces,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RayMiss {
    Nothing,

    /// Rays that leave the screen fall back to the reflection probes
    #[default]
    ReflectionProbes,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DenoiserAlgorithm {
    Conservative,
    #[default]
    Aggressive,
}

#[derive(Clone, Debug, Derivative)]
#[derivative(Default)]
pub struct DenoiseSettings {
    #[derivative(Default(value = "true"))]
    pub enabled: bool,

    pub algorithm: DenoiserAlgorithm,

    /// How much of the history survives each frame; clamped to
    /// `[0.5, 0.95]`.
    #[derivative(Default(value = "0.95"))]
    pub intensity: f32,

    /// Clamped to `[0.0, 1.0]`.
    #[derivative(Default(value = "0.6"))]
    pub radius: f32,

    #[derivative(Default(value = "true"))]
    pub second_pass: bool,
}

impl DenoiseSettings {
    pub fn intensity(&self) -> f32 {
        self.intensity.clamp(0.5, 0.95)
    }

    pub fn radius(&self) -> f32 {
        self.radius.clamp(0.0, 1.0)
    }

    pub fn is_aggressive(&self) -> bool {
        self.enabled && self.algorithm == DenoiserAlgorithm::Aggressive
    }

    pub fn runs_second_pass(&self) -> bool {
        self.enabled && self.second_pass
    }
}

/// Renderer-wide switches, shared by all cameras.
#[derive(Clone, Debug, Derivative)]
#[derivative(Default)]
pub struct FeatureSettings {
    /// Whether SSGI should run while the host shows its rendering debugger
    pub rendering_debugger: bool,

    /// Whether reflection-probe cameras get SSGI too
    #[derivative(Default(value = "true"))]
    pub reflection_probes: bool,

    /// Whether baked ambient lighting is stripped from the camera color
    /// and replaced by the traced one
    #[derivative(Default(value = "true"))]
    pub override_ambient: bool,

    pub backface_lighting: bool,
}
