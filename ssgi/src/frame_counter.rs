use glam::{vec4, Vec4};

/// Random angles (in radians) used to rotate the blur's sampling pattern
/// from frame to frame.
pub const BLUR_RANDS: [f32; 32] = [
    0.61264, 0.296032, 0.637552, 0.524287, 0.493583, 0.972775, 0.292517,
    0.771358, 0.526745, 0.769914, 0.400229, 0.891529, 0.283315, 0.352458,
    0.807725, 0.919026, 0.0697553, 0.949327, 0.525995, 0.0860558, 0.192214,
    0.663227, 0.890233, 0.348893, 0.0641713, 0.020023, 0.457702, 0.0630958,
    0.23828, 0.970634, 0.902208, 0.85092,
];

/// Engine-wide frame counter, advanced once per rendered camera-frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameCounter {
    value: u32,
}

impl FrameCounter {
    pub const STRIDE: u32 = 33;
    pub const WRAP: u32 = 64000;

    pub fn new(value: u32) -> Self {
        Self {
            value: value % Self::WRAP,
        }
    }

    pub fn get(self) -> u32 {
        self.value
    }

    pub fn table_index(self) -> usize {
        (self.value as usize) % BLUR_RANDS.len()
    }

    /// Returns the blur rotation matrix for the current frame, packed as
    /// `(cos, sin, -sin, cos)`.
    pub fn rotator(self) -> Vec4 {
        let (sin, cos) = BLUR_RANDS[self.table_index()].sin_cos();

        vec4(cos, sin, -sin, cos)
    }

    pub fn advance(&mut self) {
        self.value = (self.value + Self::STRIDE) % Self::WRAP;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn advance() {
        let mut target = FrameCounter::default();

        target.advance();
        assert_eq!(33, target.get());
        assert_eq!(1, target.table_index());

        target.advance();
        assert_eq!(66, target.get());
        assert_eq!(2, target.table_index());
    }

    #[test]
    fn wraparound() {
        let mut target = FrameCounter::new(63980);

        target.advance();

        assert_eq!(13, target.get());
        assert_eq!(13, target.table_index());
    }

    #[test]
    fn rotator() {
        let target = FrameCounter::new(32 * 7 + 5);
        let rotator = target.rotator();
        let angle = BLUR_RANDS[5];

        assert_relative_eq!(angle.cos(), rotator.x);
        assert_relative_eq!(angle.sin(), rotator.y);
        assert_relative_eq!(-angle.sin(), rotator.z);
        assert_relative_eq!(angle.cos(), rotator.w);
    }
}
