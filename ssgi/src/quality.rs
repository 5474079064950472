use derivative::Derivative;
use log::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QualityMode {
    #[default]
    Low,
    Medium,
    High,
    Custom,
}

impl QualityMode {
    /// Returns `(sample_count, max_ray_steps)` for given mode; `Custom` has no
    /// preset.
    pub fn preset(self) -> Option<(u32, u32)> {
        match self {
            QualityMode::Low => Some((1, 24)),
            QualityMode::Medium => Some((2, 32)),
            QualityMode::High => Some((4, 64)),
            QualityMode::Custom => None,
        }
    }
}

/// Quality knobs of a volume.
///
/// Numbers are private so that every edit goes through a setter which marks
/// them dirty; [`QualityPresetResolver`] then decides whether the edit turns
/// the mode into `Custom`.
#[derive(Clone, Debug, Derivative)]
#[derivative(Default)]
pub struct QualitySettings {
    mode: QualityMode,
    #[derivative(Default(value = "1"))]
    sample_count: u32,
    #[derivative(Default(value = "24"))]
    max_ray_steps: u32,
    dirty: bool,
}

impl QualitySettings {
    pub const SAMPLE_COUNT_RANGE: (u32, u32) = (1, 16);
    pub const MIN_MAX_RAY_STEPS: u32 = 16;

    pub fn new(mode: QualityMode) -> Self {
        let mut this = Self::default();

        this.set_mode(mode);
        this
    }

    pub fn mode(&self) -> QualityMode {
        self.mode
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn max_ray_steps(&self) -> u32 {
        self.max_ray_steps
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Switches the mode, overwriting the numbers with its preset.
    pub fn set_mode(&mut self, mode: QualityMode) {
        self.mode = mode;
        self.apply(mode);
        self.dirty = false;
    }

    /// Overwrites the numbers with the preset of given mode; no-op for
    /// `Custom`.
    pub fn apply(&mut self, mode: QualityMode) {
        if let Some((sample_count, max_ray_steps)) = mode.preset() {
            self.sample_count = sample_count;
            self.max_ray_steps = max_ray_steps;
        }
    }

    pub fn set_sample_count(&mut self, sample_count: u32) {
        if sample_count != self.sample_count {
            let (min, max) = Self::SAMPLE_COUNT_RANGE;

            self.sample_count = sample_count.clamp(min, max);
            self.dirty = true;
        }
    }

    pub fn set_max_ray_steps(&mut self, max_ray_steps: u32) {
        if max_ray_steps != self.max_ray_steps {
            self.max_ray_steps = max_ray_steps.max(Self::MIN_MAX_RAY_STEPS);
            self.dirty = true;
        }
    }
}

/// Keeps quality numbers consistent with their mode across frames.
#[derive(Debug, Default)]
pub struct QualityPresetResolver {
    last_mode: Option<QualityMode>,
}

impl QualityPresetResolver {
    /// Manual edits win over presets: [`QualitySettings::set_mode()`] has
    /// already applied the preset, so anything edited afterwards turns the
    /// mode into `Custom`.
    pub fn resolve(&mut self, settings: &mut QualitySettings) {
        if settings.dirty {
            if settings.mode != QualityMode::Custom {
                debug!(
                    "Quality edited manually, switching from {:?} to custom",
                    settings.mode
                );

                settings.mode = QualityMode::Custom;
            }

            settings.dirty = false;
        } else if self.last_mode != Some(settings.mode) {
            debug!("Applying quality preset: {:?}", settings.mode);

            settings.apply(settings.mode);
        }

        self.last_mode = Some(settings.mode);
    }
}
