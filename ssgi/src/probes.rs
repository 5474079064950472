use std::cmp::Ordering;

use glam::{Vec3, Vec4};

use crate::gpu;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Magnitude of the box's extent, used to prefer tightly-scoped probes.
    pub fn size(&self) -> f32 {
        (self.max - self.min).length()
    }
}

/// Reflection probe visible to a camera.
#[derive(Clone, Debug)]
pub struct ReflectionProbe<T> {
    pub bounds: Aabb,
    pub importance: i32,
    pub position: Vec3,
    pub box_projection: bool,
    pub hdr_decode: Vec4,
    pub texture: T,
}

impl<T> ReflectionProbe<T> {
    pub fn params(&self) -> gpu::ProbeParams {
        gpu::ProbeParams::new(
            self.hdr_decode,
            self.box_projection,
            self.bounds.min,
            self.bounds.max,
            self.position,
        )
    }
}

/// Picks the reflection probe that rays fall back to when they leave the
/// screen.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProbeResolver;

impl ProbeResolver {
    /// Returns the best probe containing the camera: the most important one,
    /// then the smallest one, then the closest one; on exact ties the first
    /// probe wins.
    pub fn select<'a, T>(
        probes: &'a [ReflectionProbe<T>],
        camera_position: Vec3,
    ) -> Option<(usize, &'a ReflectionProbe<T>)> {
        let mut best: Option<(usize, &'a ReflectionProbe<T>)> = None;

        for (idx, probe) in probes.iter().enumerate() {
            if !probe.bounds.contains(camera_position) {
                continue;
            }

            let is_better = match best {
                Some((_, best)) => {
                    Self::compare(probe, best, camera_position).is_lt()
                }
                None => true,
            };

            if is_better {
                best = Some((idx, probe));
            }
        }

        best
    }

    fn compare<T>(
        lhs: &ReflectionProbe<T>,
        rhs: &ReflectionProbe<T>,
        camera_position: Vec3,
    ) -> Ordering {
        let distance = |probe: &ReflectionProbe<T>| {
            probe.position.distance(camera_position)
        };

        rhs.importance
            .cmp(&lhs.importance)
            .then_with(|| lhs.bounds.size().total_cmp(&rhs.bounds.size()))
            .then_with(|| distance(lhs).total_cmp(&distance(rhs)))
    }
}
