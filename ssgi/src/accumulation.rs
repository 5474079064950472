use crate::{
    gpu, Backend, FrameInputs, FrameTextures, HistoryTextures, Kernel,
};

/// Stage of the per-camera accumulation pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Idle,
    DirectLightExtracted,
    RayMarched,
    Reprojected,
    Blurred(Blur),
    HistoryUpdated,
    Combined,
    HistoryStored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blur {
    /// Symmetric two-pass blur, run when the aggressive denoiser is picked
    Aggressive,

    /// Asymmetric two-pass blur
    Second,
}

/// Which optional stages run this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    pub denoise: bool,
    pub aggressive_blur: bool,
    pub second_blur: bool,
}

impl Stage {
    /// Returns the stage that follows this one, or `None` once the frame's
    /// history is stored.
    pub fn next(self, plan: &Plan) -> Option<Self> {
        let after_blurs = |plan: &Plan, aggressive_done: bool| {
            if plan.aggressive_blur && !aggressive_done {
                Stage::Blurred(Blur::Aggressive)
            } else if plan.second_blur {
                Stage::Blurred(Blur::Second)
            } else {
                Stage::HistoryUpdated
            }
        };

        let next = match self {
            Stage::Idle => Stage::DirectLightExtracted,
            Stage::DirectLightExtracted => Stage::RayMarched,

            Stage::RayMarched => {
                if plan.denoise {
                    Stage::Reprojected
                } else {
                    Stage::HistoryUpdated
                }
            }

            Stage::Reprojected => after_blurs(plan, false),
            Stage::Blurred(Blur::Aggressive) => after_blurs(plan, true),
            Stage::Blurred(Blur::Second) => Stage::HistoryUpdated,
            Stage::HistoryUpdated => Stage::Combined,
            Stage::Combined => Stage::HistoryStored,
            Stage::HistoryStored => return None,
        };

        Some(next)
    }
}

/// Everything needed to record a single camera-frame.
#[derive(Debug)]
pub struct Accumulation<'a, T> {
    pub plan: Plan,
    pub frame: &'a FrameTextures<T>,
    pub history: &'a HistoryTextures<T>,
    pub inputs: &'a FrameInputs<'a, T>,
    pub probe: Option<&'a T>,
    pub params: gpu::PassParams,
}

impl<'a, T> Accumulation<'a, T> {
    /// Walks the pipeline from `Idle` to `HistoryStored`, recording passes
    /// of each entered stage; returns the visited stages.
    pub fn run(&self, backend: &mut impl Backend<Texture = T>) -> Vec<Stage> {
        let mut stage = Stage::Idle;
        let mut stages = vec![stage];

        while let Some(next) = stage.next(&self.plan) {
            self.enter(backend, next);
            stages.push(next);
            stage = next;
        }

        stages
    }

    fn enter(&self, backend: &mut impl Backend<Texture = T>, stage: Stage) {
        let frame = self.frame;
        let history = self.history;
        let inputs = self.inputs;
        let params = &self.params;

        match stage {
            Stage::Idle => {}

            Stage::DirectLightExtracted => {
                if let Some(ambient) = &frame.ambient {
                    backend.run_kernel(
                        Kernel::ExtractDirectLighting,
                        &[Some(inputs.color)],
                        &[&frame.intermediate_color, ambient],
                        params,
                    );
                } else {
                    backend.run_kernel(
                        Kernel::Blit,
                        &[Some(inputs.color)],
                        &[&frame.intermediate_color],
                        params,
                    );
                }
            }

            Stage::RayMarched => {
                let target = if self.plan.denoise {
                    &frame.intermediate_diffuse
                } else {
                    &frame.diffuse
                };

                let gbuffer = inputs.gbuffer;

                backend.run_kernel(
                    Kernel::RayMarch,
                    &[
                        Some(&frame.intermediate_color),
                        Some(inputs.depth),
                        Some(inputs.motion_vectors),
                        Some(self.history_color()),
                        Some(&history.depth),
                        inputs.backface_depth,
                        inputs.backface_color,
                        gbuffer.map(|gbuffer| &gbuffer.albedo),
                        gbuffer.map(|gbuffer| &gbuffer.specular),
                        gbuffer.map(|gbuffer| &gbuffer.normals),
                        self.probe,
                    ],
                    &[target],
                    params,
                );
            }

            Stage::Reprojected => {
                backend.run_kernel(
                    Kernel::Reproject,
                    &[
                        Some(&frame.intermediate_diffuse),
                        Some(inputs.depth),
                        Some(inputs.motion_vectors),
                        Some(&history.diffuse),
                        Some(&history.sample_count),
                        Some(&history.depth),
                        Some(self.history_color()),
                    ],
                    &[&frame.diffuse, &frame.sample_count],
                    params,
                );
            }

            Stage::Blurred(blur) => {
                let (first, second) = match blur {
                    Blur::Aggressive => {
                        (Kernel::AggressiveBlur, Kernel::AggressiveBlur)
                    }
                    Blur::Second => (Kernel::SecondBlurA, Kernel::SecondBlurB),
                };

                let normals = inputs.gbuffer.map(|gbuffer| &gbuffer.normals);

                backend.run_kernel(
                    first,
                    &[
                        Some(&frame.diffuse),
                        Some(inputs.depth),
                        Some(&frame.sample_count),
                        normals,
                    ],
                    &[&frame.intermediate_diffuse],
                    &params.with_blur_pass(0),
                );

                backend.run_kernel(
                    second,
                    &[
                        Some(&frame.intermediate_diffuse),
                        Some(inputs.depth),
                        Some(&frame.sample_count),
                        normals,
                    ],
                    &[&frame.diffuse],
                    &params.with_blur_pass(1),
                );
            }

            Stage::HistoryUpdated => {
                if self.plan.denoise {
                    backend.copy_texture(&frame.diffuse, &history.diffuse);

                    backend.copy_texture(
                        &frame.sample_count,
                        &history.sample_count,
                    );
                }

                backend.run_kernel(
                    Kernel::HistoryDepth,
                    &[Some(inputs.depth)],
                    &[&history.depth],
                    params,
                );
            }

            Stage::Combined => {
                let gbuffer = inputs.gbuffer;

                backend.run_kernel(
                    Kernel::Combine,
                    &[
                        Some(&frame.intermediate_color),
                        Some(&frame.diffuse),
                        Some(inputs.depth),
                        frame.ambient.as_ref(),
                        gbuffer.map(|gbuffer| &gbuffer.albedo),
                        gbuffer.map(|gbuffer| &gbuffer.specular),
                    ],
                    &[inputs.color],
                    params,
                );
            }

            Stage::HistoryStored => {
                backend.run_kernel(
                    Kernel::Blit,
                    &[Some(inputs.color)],
                    &[&history.color],
                    params,
                );
            }
        }
    }

    /// Texture the kernels treat as the previous frame's color; until the
    /// history is valid, that's the current frame's direct lighting.
    fn history_color(&self) -> &'a T {
        if self.params.has_history() {
            &self.history.color
        } else {
            &self.frame.intermediate_color
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stages(plan: Plan) -> Vec<Stage> {
        let mut stage = Stage::Idle;
        let mut stages = vec![stage];

        while let Some(next) = stage.next(&plan) {
            stages.push(next);
            stage = next;
        }

        stages
    }

    #[test]
    fn without_denoise() {
        assert_eq!(
            vec![
                Stage::Idle,
                Stage::DirectLightExtracted,
                Stage::RayMarched,
                Stage::HistoryUpdated,
                Stage::Combined,
                Stage::HistoryStored,
            ],
            stages(Plan::default())
        );
    }

    #[test]
    fn with_both_blurs() {
        let plan = Plan {
            denoise: true,
            aggressive_blur: true,
            second_blur: true,
        };

        assert_eq!(
            vec![
                Stage::Idle,
                Stage::DirectLightExtracted,
                Stage::RayMarched,
                Stage::Reprojected,
                Stage::Blurred(Blur::Aggressive),
                Stage::Blurred(Blur::Second),
                Stage::HistoryUpdated,
                Stage::Combined,
                Stage::HistoryStored,
            ],
            stages(plan)
        );
    }

    #[test]
    fn with_single_blur() {
        let plan = Plan {
            denoise: true,
            aggressive_blur: false,
            second_blur: true,
        };

        assert_eq!(
            &[
                Stage::Reprojected,
                Stage::Blurred(Blur::Second),
                Stage::HistoryUpdated,
            ],
            &stages(plan)[3..6]
        );

        let plan = Plan {
            denoise: true,
            aggressive_blur: false,
            second_blur: false,
        };

        assert_eq!(
            &[Stage::Reprojected, Stage::HistoryUpdated],
            &stages(plan)[3..5]
        );
    }

    #[test]
    fn with_aggressive_blur_only() {
        let plan = Plan {
            denoise: true,
            aggressive_blur: true,
            second_blur: false,
        };

        let stages = stages(plan);

        assert_eq!(
            &[
                Stage::Reprojected,
                Stage::Blurred(Blur::Aggressive),
                Stage::HistoryUpdated,
            ],
            &stages[3..6]
        );

        assert!(!stages.contains(&Stage::Blurred(Blur::Second)));
    }
}
