use bytemuck::{Pod, Zeroable};
use glam::{vec4, Vec4};

/// Ambient lighting packed in the layout kernels evaluate it in (the usual
/// `SHAr`..`SHC` split of an L2 spherical harmonic).
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct AmbientSh {
    pub ar: Vec4,
    pub ag: Vec4,
    pub ab: Vec4,
    pub br: Vec4,
    pub bg: Vec4,
    pub bb: Vec4,
    pub c: Vec4,
}

impl AmbientSh {
    /// Packs raw L2 coefficients (`coefficients[channel][basis]`).
    pub fn pack(coefficients: &[[f32; 9]; 3]) -> Self {
        let [r, g, b] = coefficients;

        let a = |sh: &[f32; 9]| vec4(sh[3], sh[1], sh[2], sh[0] - sh[6]);
        let b_ = |sh: &[f32; 9]| vec4(sh[4], sh[5], sh[6] * 3.0, sh[7]);

        Self {
            ar: a(r),
            ag: a(g),
            ab: a(b),
            br: b_(r),
            bg: b_(g),
            bb: b_(b),
            c: vec4(r[8], g[8], b[8], 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack() {
        let mut coefficients = [[0.0; 9]; 3];

        for (channel, sh) in coefficients.iter_mut().enumerate() {
            for (basis, value) in sh.iter_mut().enumerate() {
                *value = (10 * channel + basis) as f32;
            }
        }

        let target = AmbientSh::pack(&coefficients);

        assert_eq!(vec4(3.0, 1.0, 2.0, -6.0), target.ar);
        assert_eq!(vec4(13.0, 11.0, 12.0, -6.0), target.ag);
        assert_eq!(vec4(24.0, 25.0, 78.0, 27.0), target.bb);
        assert_eq!(vec4(8.0, 18.0, 28.0, 1.0), target.c);
    }
}
