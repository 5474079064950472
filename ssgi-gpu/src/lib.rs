//! Parameter blocks shared between the SSGI orchestrator and its kernels.

#![cfg_attr(target_arch = "spirv", no_std)]

mod ambient;
mod passes;
mod probe;

pub use self::ambient::*;
pub use self::passes::*;
pub use self::probe::*;

/// Upper bound for the radiance a single ray-march hit may contribute; keeps
/// fireflies from poisoning the accumulation buffer.
pub const MAX_BRIGHTNESS: f32 = 7.0;
