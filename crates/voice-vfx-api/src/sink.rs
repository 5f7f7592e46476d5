//! Parameter-sink capability

use crate::Rgba;

pub const PARAM_SIZE: &str = "Size";
pub const PARAM_TURBULENCE_INTENSITY: &str = "TurbulenceIntensity";
pub const PARAM_TRAIL_LIFETIME: &str = "TrailLifetime";
pub const PARAM_COLOR: &str = "Color";

/// Named parameter writes into an external effect system.
///
/// Last write wins; there is no read-back. The engine writes all four
/// parameters once per tick plus one color write at startup.
pub trait ParameterSink {
    fn set_scalar(&mut self, name: &str, value: f32);
    fn set_color(&mut self, name: &str, value: Rgba);
}
