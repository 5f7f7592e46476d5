mod capture_source;
mod clip_source;
mod reactor;
mod spectrum;

pub use capture_source::{list_devices, CaptureSource};
pub use clip_source::ClipSource;
pub use reactor::{AudioFeatures, ReactivityConfig, VfxMapping, VoiceReactor};
pub use spectrum::SpectrumAnalyzer;

/// Which provider feeds the extractor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Microphone,
    Clip,
}
