use std::fmt;

use glam::UVec2;
use log::info;

use crate::{Camera, FeatureSettings, SsgiSettings};

/// Why a frame (or a single camera) was rendered without SSGI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The engine hasn't been set up, or its setup failed
    Disabled,

    /// The volume is disabled or has no rendering layers
    Inactive,

    /// Indirect lighting is scaled to zero and ambient lighting isn't
    /// replaced, so there's nothing to add
    NothingToAdd,

    DebuggerActive,
    PreviewCamera,
    ReflectionCamera,

    /// Camera's color target has zero width or height
    EmptyViewport,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::Disabled => "engine is disabled",
            SkipReason::Inactive => "volume is inactive",
            SkipReason::NothingToAdd => "nothing to add",
            SkipReason::DebuggerActive => "rendering debugger is active",
            SkipReason::PreviewCamera => "preview camera",
            SkipReason::ReflectionCamera => "reflection camera",
            SkipReason::EmptyViewport => "empty viewport",
        };

        write!(f, "{reason}")
    }
}

/// Flag that lets a message through once, until re-armed.
#[derive(Clone, Copy, Debug)]
pub struct LogOnce {
    armed: bool,
}

impl LogOnce {
    /// Returns `true` if the message should be logged now.
    pub fn fire(&mut self) -> bool {
        let armed = self.armed;

        self.armed = false;
        armed
    }

    pub fn rearm(&mut self) {
        self.armed = true;
    }
}

impl Default for LogOnce {
    fn default() -> Self {
        Self { armed: true }
    }
}

/// Decides whether SSGI runs for given frame and camera.
#[derive(Debug, Default)]
pub struct Activation {
    debugger_notice: LogOnce,
}

impl Activation {
    pub fn check_frame(
        &mut self,
        settings: &SsgiSettings,
        features: &FeatureSettings,
        debugger_active: bool,
    ) -> Result<(), SkipReason> {
        if !debugger_active {
            self.debugger_notice.rearm();
        }

        if !settings.is_active() {
            return Err(SkipReason::Inactive);
        }

        if settings.indirect_diffuse_multiplier() == 0.0
            && !features.override_ambient
        {
            return Err(SkipReason::NothingToAdd);
        }

        if debugger_active && !features.rendering_debugger {
            if self.debugger_notice.fire() {
                info!(
                    "SSGI is disabled while the rendering debugger is active \
                     (see `FeatureSettings::rendering_debugger`)"
                );
            }

            return Err(SkipReason::DebuggerActive);
        }

        Ok(())
    }

    pub fn check_camera(
        camera: &Camera,
        features: &FeatureSettings,
    ) -> Result<(), SkipReason> {
        if camera.size.cmpeq(UVec2::ZERO).any() {
            return Err(SkipReason::EmptyViewport);
        }

        if camera.is_preview() {
            return Err(SkipReason::PreviewCamera);
        }

        if camera.is_reflection() && !features.reflection_probes {
            return Err(SkipReason::ReflectionCamera);
        }

        Ok(())
    }
}
