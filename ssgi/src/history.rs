use glam::{Mat4, UVec2, Vec3};
use log::{debug, info};

use crate::{
    Backend, CameraId, TextureDesc, TexturesKey, DEPTH_FORMAT, DIFFUSE_FORMAT,
    SAMPLE_COUNT_FORMAT,
};

/// Number of cameras whose history is kept around at once.
pub const MAX_TRACKED_CAMERAS: usize = 4;

/// Persistent state of a tracked camera, carried from frame to frame.
#[derive(Debug)]
pub struct CameraHistory<T> {
    pub id: CameraId,
    pub prev_inv_view_proj: Mat4,
    pub prev_position: Vec3,

    /// Size of the history textures; zero until they get allocated
    pub scaled_size: UVec2,

    pub textures: Option<HistoryTextures<T>>,

    /// Whether the history textures contain a previous frame that may be
    /// reprojected
    pub valid: bool,

    /// Denoise state the history was accumulated with
    pub denoised: Option<bool>,
}

impl<T> CameraHistory<T> {
    pub fn new(id: CameraId) -> Self {
        Self {
            id,
            prev_inv_view_proj: Mat4::ZERO,
            prev_position: Vec3::ZERO,
            scaled_size: UVec2::ZERO,
            textures: None,
            valid: false,
            denoised: None,
        }
    }

    /// Returns whether nothing has been rendered for this camera yet.
    pub fn is_fresh(&self) -> bool {
        self.textures.is_none()
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn release(self, backend: &mut impl Backend<Texture = T>) {
        if let Some(textures) = self.textures {
            textures.release(backend);
        }
    }
}

#[derive(Debug)]
pub struct HistoryTextures<T> {
    key: TexturesKey,

    /// Linear depth of the previous frame, at full resolution
    pub depth: T,

    /// Previous frame's final color, at scaled resolution
    pub color: T,

    pub diffuse: T,
    pub sample_count: T,
}

impl<T> HistoryTextures<T> {
    pub fn new(
        backend: &mut impl Backend<Texture = T>,
        id: CameraId,
        key: TexturesKey,
    ) -> Self {
        debug!(
            "Allocating history textures for camera {id}; size={}x{}, \
             scaled_size={}x{}",
            key.size.x, key.size.y, key.scaled_size.x, key.scaled_size.y,
        );

        Self {
            key,
            depth: backend.create_texture(&TextureDesc::new(
                "ssgi_history_depth",
                key.size,
                DEPTH_FORMAT,
            )),
            color: backend.create_texture(&TextureDesc::new(
                "ssgi_history_color",
                key.scaled_size,
                key.color_format,
            )),
            diffuse: backend.create_texture(&TextureDesc::new(
                "ssgi_history_diffuse",
                key.scaled_size,
                DIFFUSE_FORMAT,
            )),
            sample_count: backend.create_texture(&TextureDesc::new(
                "ssgi_history_sample_count",
                key.scaled_size,
                SAMPLE_COUNT_FORMAT,
            )),
        }
    }

    /// Returns whether these textures can be reused for given key; the
    /// ambient override doesn't affect history.
    pub fn matches(&self, key: &TexturesKey) -> bool {
        self.key.size == key.size
            && self.key.scaled_size == key.scaled_size
            && self.key.color_format == key.color_format
    }

    pub fn release(self, backend: &mut impl Backend<Texture = T>) {
        backend.release_texture(self.depth);
        backend.release_texture(self.color);
        backend.release_texture(self.diffuse);
        backend.release_texture(self.sample_count);
    }
}

/// Fixed-capacity table of camera histories.
///
/// Records are kept from the newest (index 0) to the oldest; when an unseen
/// camera shows up on a full table, the oldest record gets evicted. Hits
/// don't reorder the table.
#[derive(Debug)]
pub struct HistoryStore<T> {
    records: Vec<CameraHistory<T>>,
}

impl<T> HistoryStore<T> {
    pub fn find(&self, id: CameraId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    /// Returns index of given camera's record, creating the record if
    /// needed; returns the evicted record as well, so that the caller can
    /// release its textures.
    pub fn ensure(
        &mut self,
        id: CameraId,
    ) -> (usize, Option<CameraHistory<T>>) {
        if let Some(idx) = self.find(id) {
            return (idx, None);
        }

        let evicted = if self.records.len() == MAX_TRACKED_CAMERAS {
            self.records.pop()
        } else {
            None
        };

        if let Some(evicted) = &evicted {
            info!("Evicting camera history: {}", evicted.id);
        }

        info!("Tracking camera: {id}");

        self.records.insert(0, CameraHistory::new(id));

        (0, evicted)
    }

    pub fn get(&self, idx: usize) -> &CameraHistory<T> {
        &self.records[idx]
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut CameraHistory<T> {
        &mut self.records[idx]
    }

    pub fn remove(&mut self, id: CameraId) -> Option<CameraHistory<T>> {
        let idx = self.find(id)?;

        info!("Forgetting camera: {id}");

        Some(self.records.remove(idx))
    }

    pub fn drain(&mut self) -> impl Iterator<Item = CameraHistory<T>> + '_ {
        self.records.drain(..)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T> Default for HistoryStore<T> {
    fn default() -> Self {
        Self {
            records: Vec::with_capacity(MAX_TRACKED_CAMERAS),
        }
    }
}
