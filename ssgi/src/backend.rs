use std::fmt;

use glam::UVec2;

use crate::gpu;

/// Something that can allocate textures and record SSGI passes into them.
///
/// The engine is written purely against this trait; [`WgpuBackend`] records
/// the passes straight into a command encoder, while [`GraphBackend`] turns
/// them into nodes that a host render graph schedules on its own.
///
/// [`WgpuBackend`]: crate::WgpuBackend
/// [`GraphBackend`]: crate::GraphBackend
pub trait Backend {
    type Texture: fmt::Debug;

    /// Returns whether this backend is able to run given kernel; engine
    /// refuses to work if any kernel is missing.
    fn supports(&self, kernel: Kernel) -> bool;

    fn create_texture(&mut self, desc: &TextureDesc) -> Self::Texture;

    fn release_texture(&mut self, texture: Self::Texture);

    /// Copies `src` into `dst`; both textures have the same size and format.
    fn copy_texture(&mut self, src: &Self::Texture, dst: &Self::Texture);

    /// Runs a fullscreen kernel reading `sources` and writing all `targets`
    /// at once.
    ///
    /// `sources` follow [`Kernel::sources()`]; missing optional sources are
    /// passed as `None` and it's up to the backend to substitute them.
    fn run_kernel(
        &mut self,
        kernel: Kernel,
        sources: &[Option<&Self::Texture>],
        targets: &[&Self::Texture],
        params: &gpu::PassParams,
    );
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    pub label: &'static str,
    pub size: UVec2,
    pub format: wgpu::TextureFormat,
}

impl TextureDesc {
    pub fn new(
        label: &'static str,
        size: UVec2,
        format: wgpu::TextureFormat,
    ) -> Self {
        assert!(size.x > 0, "texture `{label}` has zero width");
        assert!(size.y > 0, "texture `{label}` has zero height");

        Self {
            label,
            size,
            format,
        }
    }
}

/// Opaque GPU kernel run by the engine.
///
/// Numbered kernels correspond to the passes of the SSGI shader; `Blit` is a
/// plain (scaling) copy that every backend has to provide as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kernel {
    ExtractDirectLighting,
    RayMarch,
    Reproject,
    SecondBlurA,
    SecondBlurB,
    HistoryDepth,
    Combine,
    FixMotionVectors,
    AggressiveBlur,
    Blit,
}

impl Kernel {
    pub const ALL: [Self; 10] = [
        Self::ExtractDirectLighting,
        Self::RayMarch,
        Self::Reproject,
        Self::SecondBlurA,
        Self::SecondBlurB,
        Self::HistoryDepth,
        Self::Combine,
        Self::FixMotionVectors,
        Self::AggressiveBlur,
        Self::Blit,
    ];

    /// Index of the pass inside the SSGI shader.
    pub fn pass_index(self) -> Option<u32> {
        match self {
            Self::ExtractDirectLighting => Some(0),
            Self::RayMarch => Some(1),
            Self::Reproject => Some(2),
            Self::SecondBlurA => Some(3),
            Self::SecondBlurB => Some(4),
            Self::HistoryDepth => Some(5),
            Self::Combine => Some(6),
            Self::FixMotionVectors => Some(7),
            Self::AggressiveBlur => Some(8),
            Self::Blit => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ExtractDirectLighting => "extract_direct_lighting",
            Self::RayMarch => "ray_march",
            Self::Reproject => "reproject",
            Self::SecondBlurA => "second_blur_a",
            Self::SecondBlurB => "second_blur_b",
            Self::HistoryDepth => "history_depth",
            Self::Combine => "combine",
            Self::FixMotionVectors => "fix_motion_vectors",
            Self::AggressiveBlur => "aggressive_blur",
            Self::Blit => "blit",
        }
    }

    /// Ordered list of textures read by this kernel.
    pub fn sources(self) -> &'static [Source] {
        use Source::*;
        use SourceDim::*;

        match self {
            Self::ExtractDirectLighting | Self::Blit => &[Required(D2)],

            Self::RayMarch => &[
                // intermediate color
                Required(D2),
                // depth
                Required(D2),
                // motion vectors
                Required(D2),
                // history color (see `Accumulation::history_color()`)
                Required(D2),
                // history depth
                Required(D2),
                // back-face depth
                Optional(D2),
                // back-face color
                Optional(D2),
                // g-buffer: albedo, specular, normals
                Optional(D2),
                Optional(D2),
                Optional(D2),
                // fallback reflection probe
                Optional(Cube),
            ],

            Self::Reproject => &[
                // raw (unfiltered) indirect diffuse
                Required(D2),
                // depth
                Required(D2),
                // motion vectors
                Required(D2),
                // history indirect diffuse
                Required(D2),
                // history sample count
                Required(D2),
                // history depth
                Required(D2),
                // history color (or intermediate color)
                Required(D2),
            ],

            Self::AggressiveBlur | Self::SecondBlurA | Self::SecondBlurB => &[
                // input
                Required(D2),
                // depth
                Required(D2),
                // sample count
                Required(D2),
                // g-buffer normals
                Optional(D2),
            ],

            Self::HistoryDepth => &[Required(D2)],

            Self::Combine => &[
                // intermediate color
                Required(D2),
                // indirect diffuse
                Required(D2),
                // depth
                Required(D2),
                // ambient lighting stripped from the camera color
                Optional(D2),
                // g-buffer: albedo, specular
                Optional(D2),
                Optional(D2),
            ],

            Self::FixMotionVectors => &[
                // motion vectors' depth
                Required(D2),
            ],
        }
    }

    /// Number of render targets written simultaneously by this kernel.
    pub fn target_count(self) -> usize {
        match self {
            Self::Reproject | Self::ExtractDirectLighting => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pass_index() {
            Some(idx) => write!(f, "{}#{idx}", self.name()),
            None => write!(f, "{}", self.name()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Required(SourceDim),
    Optional(SourceDim),
}

impl Source {
    pub fn dim(self) -> SourceDim {
        match self {
            Source::Required(dim) | Source::Optional(dim) => dim,
        }
    }

    pub fn is_optional(self) -> bool {
        matches!(self, Source::Optional(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceDim {
    D2,
    Cube,
}

/// Checks whether given bindings match kernel's declared layout; used by the
/// backends before they record anything.
pub(crate) fn assert_bindings<T>(
    kernel: Kernel,
    sources: &[Option<&T>],
    targets: &[&T],
) {
    let layout = kernel.sources();

    assert_eq!(
        layout.len(),
        sources.len(),
        "kernel `{kernel}` expects {} sources",
        layout.len()
    );

    for (idx, (source, binding)) in layout.iter().zip(sources).enumerate() {
        assert!(
            source.is_optional() || binding.is_some(),
            "kernel `{kernel}` is missing required source #{idx}"
        );
    }

    assert_eq!(
        kernel.target_count(),
        targets.len(),
        "kernel `{kernel}` expects {} targets",
        kernel.target_count()
    );
}
