use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// Reflection probe sampled by the ray-march kernel when a ray misses.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct ProbeParams {
    pub hdr_decode: Vec4,
    pub box_min: Vec4,
    pub box_max: Vec4,

    /// Probe's position (`xyz`) and whether it's box-projected (`w`, 1.0 or
    /// 0.0)
    pub position: Vec4,
}

impl ProbeParams {
    pub fn new(
        hdr_decode: Vec4,
        box_projection: bool,
        box_min: Vec3,
        box_max: Vec3,
        position: Vec3,
    ) -> Self {
        // Infinite probes carry no box
        if box_projection {
            Self {
                hdr_decode,
                box_min: box_min.extend(0.0),
                box_max: box_max.extend(0.0),
                position: position.extend(1.0),
            }
        } else {
            Self {
                hdr_decode,
                ..Default::default()
            }
        }
    }

    pub fn is_box_projected(&self) -> bool {
        self.position.w > 0.0
    }
}
