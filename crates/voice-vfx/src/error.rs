//! Source construction and startup errors.
//!
//! The per-tick path is total; everything here can only happen before the
//! first tick, while a source or extractor is being built.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    /// No capture device is present on the host.
    #[error("no audio capture device available")]
    DeviceUnavailable,

    /// The capture device delivered nothing within the startup deadline.
    #[error("capture device produced no samples within {waited_ms} ms")]
    DeviceTimedOut { waited_ms: u64 },

    /// A snapshot buffer size was zero.
    #[error("degenerate {what} buffer: size must be non-zero")]
    DegenerateBuffer { what: &'static str },

    /// The decoded clip holds no frames.
    #[error("audio clip contains no samples")]
    EmptyClip,

    /// The clip source was selected without a file to play.
    #[error("no clip file given (pass --clip <path> or set `clip` in the config file)")]
    MissingClip,

    #[error("unsupported clip sample format: {bits}-bit int")]
    ClipFormat { bits: u16 },

    #[error("failed to read audio clip: {0}")]
    ClipRead(#[from] hound::Error),

    #[error("failed to open capture stream: {0}")]
    StreamOpen(String),

    #[error("failed to start capture stream: {0}")]
    StreamStart(String),
}
