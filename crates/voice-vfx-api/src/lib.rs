//! Shared interface types for voice-vfx
//!
//! This crate defines the seam between the feature-extraction engine and
//! its surroundings: the audio-source capability the engine reads from,
//! the parameter-sink capability it writes to, and the value types both
//! sides exchange.

pub mod color;
pub mod sink;
pub mod source;

pub use color::Rgba;
pub use sink::{
    ParameterSink, PARAM_COLOR, PARAM_SIZE, PARAM_TRAIL_LIFETIME, PARAM_TURBULENCE_INTENSITY,
};
pub use source::{AudioSource, FftWindow, UnknownWindow, SAMPLE_BUFFER_SIZE, SPECTRUM_SIZE};
