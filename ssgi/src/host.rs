use crate::{gpu, BackfaceMode, RenderingPath};

/// Renderer that SSGI is plugged into.
///
/// Everything the engine needs to know about the host's frame goes through
/// this trait; `T` is the backend's texture type.
pub trait HostRenderer<T> {
    fn rendering_path(&self) -> RenderingPath;

    /// Returns the G-buffer rendered by the host this frame, if any.
    fn active_gbuffer(&self) -> Option<&GBufferTargets<T>>;

    /// Returns the targets of the host's motion vector pass, if any.
    fn motion_vector_targets(&self) -> Option<&MotionVectorTargets<T>>;

    /// Returns whether the host writes rendering layers, so that indirect
    /// lighting can be masked by them.
    fn writes_rendering_layers(&self) -> bool;
}

#[derive(Debug)]
pub struct GBufferTargets<T> {
    pub albedo: T,
    pub specular: T,
    pub normals: T,
}

#[derive(Debug)]
pub struct MotionVectorTargets<T> {
    pub color: T,
    pub depth: T,
}

/// Textures of the camera being rendered.
#[derive(Debug)]
pub struct FrameInputs<'a, T> {
    /// Camera's color target; SSGI reads direct lighting from it and writes
    /// the combined image back into it
    pub color: &'a T,
    pub color_format: wgpu::TextureFormat,

    pub depth: &'a T,
    pub motion_vectors: &'a T,

    pub backface_depth: Option<&'a T>,
    pub backface_color: Option<&'a T>,

    /// Host's G-buffer, or the forward G-buffer rendered for SSGI
    pub gbuffer: Option<&'a GBufferTargets<T>>,
}

impl<T> FrameInputs<'_, T> {
    /// Returns which back-face buffers the host actually provided.
    pub fn backface_mode(&self) -> BackfaceMode {
        match (self.backface_depth, self.backface_color) {
            (Some(_), Some(_)) => BackfaceMode::DepthAndColor,
            (Some(_), None) => BackfaceMode::Depth,
            (None, _) => BackfaceMode::Disabled,
        }
    }
}

/// Scene-wide lighting inputs.
#[derive(Clone, Debug, Default)]
pub struct FrameEnvironment {
    /// Ambient lighting as L2 spherical harmonics, indexed by
    /// `[channel][basis]`
    pub ambient: [[f32; 9]; 3],
}

impl FrameEnvironment {
    pub fn ambient_sh(&self) -> gpu::AmbientSh {
        gpu::AmbientSh::pack(&self.ambient)
    }
}
