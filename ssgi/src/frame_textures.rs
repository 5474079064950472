use glam::UVec2;
use log::debug;

use crate::{Backend, TextureDesc};

pub const DIFFUSE_FORMAT: wgpu::TextureFormat =
    wgpu::TextureFormat::Rgba16Float;

pub const SAMPLE_COUNT_FORMAT: wgpu::TextureFormat =
    wgpu::TextureFormat::R16Float;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;

/// Everything that decides the shape of the textures used by a camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TexturesKey {
    /// Size of the camera's color target
    pub size: UVec2,

    /// Size the indirect lighting is traced at
    pub scaled_size: UVec2,

    pub color_format: wgpu::TextureFormat,
    pub override_ambient: bool,
}

/// Transient textures used while rendering a single camera-frame.
#[derive(Debug)]
pub struct FrameTextures<T> {
    key: TexturesKey,
    pub intermediate_color: T,
    pub diffuse: T,
    pub intermediate_diffuse: T,
    pub sample_count: T,

    /// Ambient lighting stripped from the camera color; present only when
    /// ambient lighting is overridden
    pub ambient: Option<T>,
}

impl<T> FrameTextures<T> {
    pub fn new(
        backend: &mut impl Backend<Texture = T>,
        key: TexturesKey,
    ) -> Self {
        debug!(
            "Allocating frame textures; size={}x{}, scaled_size={}x{}, \
             format={:?}, override_ambient={}",
            key.size.x,
            key.size.y,
            key.scaled_size.x,
            key.scaled_size.y,
            key.color_format,
            key.override_ambient,
        );

        let intermediate_color = backend.create_texture(&TextureDesc::new(
            "ssgi_intermediate_color",
            key.size,
            key.color_format,
        ));

        let diffuse = backend.create_texture(&TextureDesc::new(
            "ssgi_diffuse",
            key.scaled_size,
            DIFFUSE_FORMAT,
        ));

        let intermediate_diffuse = backend.create_texture(&TextureDesc::new(
            "ssgi_intermediate_diffuse",
            key.scaled_size,
            DIFFUSE_FORMAT,
        ));

        let sample_count = backend.create_texture(&TextureDesc::new(
            "ssgi_sample_count",
            key.scaled_size,
            SAMPLE_COUNT_FORMAT,
        ));

        let ambient = key.override_ambient.then(|| {
            backend.create_texture(&TextureDesc::new(
                "ssgi_ambient",
                key.size,
                DIFFUSE_FORMAT,
            ))
        });

        Self {
            key,
            intermediate_color,
            diffuse,
            intermediate_diffuse,
            sample_count,
            ambient,
        }
    }

    /// Makes sure `this` matches `key`, reallocating the textures if it
    /// doesn't.
    pub fn ensure<'a>(
        this: &'a mut Option<Self>,
        backend: &mut impl Backend<Texture = T>,
        key: TexturesKey,
    ) -> &'a Self {
        if this.as_ref().map_or(false, |this| this.key != key) {
            if let Some(old) = this.take() {
                old.release(backend);
            }
        }

        this.get_or_insert_with(|| Self::new(backend, key))
    }

    pub fn release(self, backend: &mut impl Backend<Texture = T>) {
        debug!("Releasing frame textures");

        backend.release_texture(self.intermediate_color);
        backend.release_texture(self.diffuse);
        backend.release_texture(self.intermediate_diffuse);
        backend.release_texture(self.sample_count);

        if let Some(ambient) = self.ambient {
            backend.release_texture(ambient);
        }
    }
}
