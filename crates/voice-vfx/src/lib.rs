//! Voice-reactive VFX parameter engine
//!
//! Samples an audio source once per tick, extracts a smoothed loudness and
//! a treble-band energy, and writes the mapped "Size",
//! "TurbulenceIntensity", "TrailLifetime", and "Color" parameters to a
//! sink. Hosts pick a source (live capture or a looping clip), a sink, and
//! drive the tick loop with measured delta-time.

pub mod audio;
pub mod error;
pub mod sink;
pub mod utils;

pub use audio::{
    list_devices, AudioFeatures, CaptureSource, ClipSource, ReactivityConfig, SourceKind,
    SpectrumAnalyzer, VfxMapping, VoiceReactor,
};
pub use error::AudioError;
pub use sink::{MemorySink, TracingSink};
pub use utils::Config;
