use std::fmt;
use std::hash::{Hash, Hasher};

use fxhash::FxHasher;
use glam::{Mat4, UVec2, Vec3};

/// Stable identity of a host camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CameraId(u64);

impl CameraId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Derives an identity from whatever the host identifies cameras with
    /// (an entity, a handle, a name).
    pub fn of(key: impl Hash) -> Self {
        let mut hasher = FxHasher::default();

        key.hash(&mut hasher);

        Self(hasher.finish())
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraKind {
    #[default]
    Game,
    SceneView,
    Reflection,
    Preview,
}

/// Camera as seen by the engine for a single frame.
#[derive(Clone, Debug)]
pub struct Camera {
    pub id: CameraId,
    pub kind: CameraKind,

    /// World-to-view matrix
    pub view: Mat4,

    /// View-to-clip matrix, without jitter
    pub projection: Mat4,

    pub position: Vec3,

    /// Vertical field of view, in radians
    pub fov_y: f32,

    /// Size of the camera's color target, in pixels
    pub size: UVec2,

    /// Set by the host for scene-view cameras whose motion vectors weren't
    /// rendered with the previous frame's matrices.
    pub motion_vectors_stale: bool,
}

impl Camera {
    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn inv_view_proj(&self) -> Mat4 {
        self.view_proj().inverse()
    }

    pub fn is_preview(&self) -> bool {
        self.kind == CameraKind::Preview
    }

    pub fn is_reflection(&self) -> bool {
        self.kind == CameraKind::Reflection
    }

    /// Size of the buffers traced at given resolution scale.
    pub fn scaled_size(&self, scale: f32) -> UVec2 {
        let size = (self.size.as_vec2() * scale).floor().as_uvec2();

        size.max(UVec2::ONE)
    }

    /// Returns the spread angle of a single (scaled) pixel, used by the ray
    /// march to pick mip levels and cone widths.
    pub fn pixel_spread_angle_tangent(&self, scale: f32) -> f32 {
        let size = self.scaled_size(scale);

        (self.fov_y * 0.5).tan() * 2.0 / (size.x.min(size.y) as f32)
    }

    pub fn describe(&self) -> String {
        format!(
            "id={}, kind={:?}, size={}x{}",
            self.id, self.kind, self.size.x, self.size.y
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            id: Default::default(),
            kind: Default::default(),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            position: Vec3::ZERO,
            fov_y: std::f32::consts::FRAC_PI_2,
            size: UVec2::ONE,
            motion_vectors_stale: false,
        }
    }
}
