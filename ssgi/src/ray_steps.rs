/// Step schedule of the ray-march kernel.
///
/// Rays start with fine steps and progressively switch to coarser ones; the
/// `max_*` fields are cumulative step counts at which each tier ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaySteps {
    pub max_steps: u32,
    pub max_small_steps: u32,
    pub max_medium_steps: u32,
    pub step_size: f32,
    pub small_step_size: f32,
    pub medium_step_size: f32,
}

impl RaySteps {
    /// Step counts at or below which the low-step tiering is used.
    pub const LOW_STEP_COUNT: u32 = 16;

    pub fn new(max_steps: u32) -> Self {
        let groups = max_steps / 8;
        let low = max_steps <= Self::LOW_STEP_COUNT;

        let max_small_steps = if low { 0 } else { groups.max(4) };

        let max_medium_steps = if low {
            max_small_steps + groups
        } else {
            max_small_steps + 2 * groups
        };

        Self {
            max_steps,
            max_small_steps,
            max_medium_steps,
            step_size: 0.4,
            small_step_size: if max_small_steps < 4 { 0.05 } else { 0.005 },
            medium_step_size: if low { 0.1 } else { 0.05 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_boundary() {
        let target = RaySteps::new(16);

        assert_eq!(16, target.max_steps);
        assert_eq!(0, target.max_small_steps);
        assert_eq!(2, target.max_medium_steps);
        assert_eq!(0.05, target.small_step_size);
        assert_eq!(0.1, target.medium_step_size);
    }

    #[test]
    fn above_boundary() {
        let target = RaySteps::new(24);

        assert_eq!(4, target.max_small_steps);
        assert_eq!(10, target.max_medium_steps);
        assert_eq!(0.005, target.small_step_size);
        assert_eq!(0.05, target.medium_step_size);

        let target = RaySteps::new(64);

        assert_eq!(8, target.max_small_steps);
        assert_eq!(24, target.max_medium_steps);
        assert_eq!(0.4, target.step_size);
    }
}
