use crate::ThicknessMode;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderingPath {
    #[default]
    Forward,

    /// Forward rendering with clustered lights; reflection probes are read
    /// from an atlas there, so the engine doesn't have to provide a fallback
    /// probe on its own
    ForwardPlus,

    Deferred,
}

impl RenderingPath {
    pub fn has_probe_atlas(self) -> bool {
        self == RenderingPath::ForwardPlus
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GraphicsApi {
    #[default]
    Vulkan,
    Metal,
    Dx12,
    Dx11,

    /// OpenGL (ES) and WebGL, where the host's G-buffer can't be read back
    LegacyGl,

    WebGpu,
}

impl From<wgpu::Backend> for GraphicsApi {
    fn from(backend: wgpu::Backend) -> Self {
        match backend {
            wgpu::Backend::Metal => GraphicsApi::Metal,
            wgpu::Backend::Dx12 => GraphicsApi::Dx12,
            wgpu::Backend::Dx11 => GraphicsApi::Dx11,
            wgpu::Backend::Gl => GraphicsApi::LegacyGl,
            wgpu::Backend::BrowserWebGpu => GraphicsApi::WebGpu,
            wgpu::Backend::Vulkan | wgpu::Backend::Empty => GraphicsApi::Vulkan,
        }
    }
}

/// What the host's renderer looks like this frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct RendererState {
    pub rendering_path: RenderingPath,

    /// Whether the host's renderer produces a G-buffer this frame
    pub gbuffer_produced: bool,

    pub thickness_mode: ThicknessMode,
    pub backface_lighting: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct PlatformCaps {
    pub api: GraphicsApi,

    /// Whether the host renders in linear color space
    pub linear_color_space: bool,

    pub snorm_renderable: bool,
}

impl PlatformCaps {
    pub fn from_adapter(
        info: &wgpu::AdapterInfo,
        linear_color_space: bool,
    ) -> Self {
        let api = GraphicsApi::from(info.backend);

        Self {
            api,
            linear_color_space,

            // WebGPU and GLES don't list `Rgba8Snorm` as renderable
            snorm_renderable: !matches!(
                api,
                GraphicsApi::LegacyGl | GraphicsApi::WebGpu
            ),
        }
    }

    pub fn is_legacy_gl(&self) -> bool {
        self.api == GraphicsApi::LegacyGl
    }
}

impl Default for PlatformCaps {
    fn default() -> Self {
        Self {
            api: Default::default(),
            linear_color_space: true,
            snorm_renderable: true,
        }
    }
}

/// Which additional buffers the host has to render for SSGI this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GBufferRequirements {
    pub needs_forward_gbuffer: bool,
    pub needs_backface_depth: bool,
    pub needs_backface_color: bool,
}

impl GBufferRequirements {
    pub fn backface_mode(&self) -> BackfaceMode {
        if self.needs_backface_color {
            BackfaceMode::DepthAndColor
        } else if self.needs_backface_depth {
            BackfaceMode::Depth
        } else {
            BackfaceMode::Disabled
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackfaceMode {
    #[default]
    Disabled,
    Depth,
    DepthAndColor,
}

impl BackfaceMode {
    pub fn param(self) -> f32 {
        match self {
            BackfaceMode::Disabled => 0.0,
            BackfaceMode::Depth => 1.0,
            BackfaceMode::DepthAndColor => 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GBufferPolicy;

impl GBufferPolicy {
    pub fn decide(
        renderer: &RendererState,
        platform: &PlatformCaps,
    ) -> GBufferRequirements {
        let legacy_gl = platform.is_legacy_gl();
        let using_deferred = renderer.gbuffer_produced && !legacy_gl;

        let needs_backface_depth =
            renderer.thickness_mode != ThicknessMode::Constant;

        GBufferRequirements {
            needs_forward_gbuffer: !renderer.gbuffer_produced && !legacy_gl,
            needs_backface_depth,
            needs_backface_color: needs_backface_depth
                && renderer.backface_lighting
                && !using_deferred,
        }
    }
}

/// Formats of the forward G-buffer rendered on behalf of SSGI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GBufferFormats {
    pub albedo: wgpu::TextureFormat,
    pub specular: wgpu::TextureFormat,
    pub normals: wgpu::TextureFormat,
}

impl GBufferFormats {
    pub fn negotiate(platform: &PlatformCaps) -> Self {
        Self {
            albedo: if platform.linear_color_space {
                wgpu::TextureFormat::Rgba8UnormSrgb
            } else {
                wgpu::TextureFormat::Rgba8Unorm
            },
            specular: wgpu::TextureFormat::Rgba8Unorm,
            normals: if platform.snorm_renderable {
                wgpu::TextureFormat::Rgba8Snorm
            } else {
                wgpu::TextureFormat::Rgba16Float
            },
        }
    }
}
