//! Configuration file management.
//!
//! Loads user preferences from `~/.voice-vfx.toml`, writing a commented
//! template on the first run.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;
use voice_vfx_api::{FftWindow, Rgba};

use crate::audio::{ReactivityConfig, SourceKind, VfxMapping};

const DEFAULT_DEVICE_TIMEOUT_SECS: u64 = 3;

const CONFIG_TEMPLATE: &str = r#"# voice-vfx configuration file

# Audio source: "microphone" (live capture) or "clip" (looping WAV playback)
# source = "microphone"

# WAV file for the clip source
# clip = "/path/to/voice.wav"

# Seconds to wait for the capture device to deliver samples (default: 3)
# device_timeout_secs = 3

# Window function for frequency snapshots (default: blackman-harris)
# One of: rectangular, triangle, hamming, hann, blackman, blackman-harris
# fft_window = "blackman-harris"

# =============================================================================
# Reactivity
# =============================================================================
# Defaults depend on the source. The microphone variant uses
# amplitude_multiplier 100 and smoothing_speed 50; clip playback uses 10 and 5.

# amplitude_multiplier = 10.0
# smoothing_speed = 5.0

# Colors as [r, g, b, a] in 0-1. Playback rests on blue, capture on white;
# both speak in cyan.
# silent_color = [0.0, 0.0, 1.0, 1.0]
# speaking_color = [0.0, 1.0, 1.0, 1.0]

# =============================================================================
# Parameter mapping: output = base + signal * gain
# =============================================================================
# size_base = 1.0            # 2.0 for the microphone source
# size_gain = 0.5
# turbulence_base = 5.0
# turbulence_gain = 20.0
# trail_base = 0.5
# trail_gain = 10.0
"#;

#[derive(Deserialize, Default)]
pub struct Config {
    pub source: Option<String>,
    pub clip: Option<String>,
    pub device_timeout_secs: Option<u64>,
    pub fft_window: Option<String>,

    pub amplitude_multiplier: Option<f32>,
    pub smoothing_speed: Option<f32>,
    pub silent_color: Option<[f32; 4]>,
    pub speaking_color: Option<[f32; 4]>,

    // Mapping overrides (flattened for simpler TOML)
    pub size_base: Option<f32>,
    pub size_gain: Option<f32>,
    pub turbulence_base: Option<f32>,
    pub turbulence_gain: Option<f32>,
    pub trail_base: Option<f32>,
    pub trail_gain: Option<f32>,
}

impl Config {
    fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".voice-vfx.toml"))
    }

    pub fn load() -> Self {
        let path = match Self::path() {
            Some(p) => p,
            None => return Self::default(),
        };

        // Create a template file if it doesn't exist
        if !path.exists() {
            let _ = fs::write(&path, CONFIG_TEMPLATE);
            info!("created config template at {:?}", path);
        }

        fs::read_to_string(&path)
            .ok()
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn device_timeout(&self) -> Duration {
        Duration::from_secs(
            self.device_timeout_secs
                .unwrap_or(DEFAULT_DEVICE_TIMEOUT_SECS),
        )
    }

    pub fn source_kind(&self) -> Option<SourceKind> {
        match self.source.as_deref() {
            Some("microphone") | Some("mic") => Some(SourceKind::Microphone),
            Some("clip") => Some(SourceKind::Clip),
            _ => None,
        }
    }

    pub fn clip_path(&self) -> Option<PathBuf> {
        self.clip.as_ref().map(PathBuf::from)
    }

    /// Window for frequency snapshots; unknown names fall back to the
    /// default.
    pub fn fft_window(&self) -> FftWindow {
        self.fft_window
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(FftWindow::BlackmanHarris)
    }

    /// Reactivity settings for `kind`, with per-variant defaults where the
    /// file leaves fields unset.
    pub fn reactivity(&self, kind: SourceKind) -> ReactivityConfig {
        let defaults = match kind {
            SourceKind::Microphone => ReactivityConfig::microphone(),
            SourceKind::Clip => ReactivityConfig::playback(),
        };

        ReactivityConfig {
            amplitude_multiplier: self
                .amplitude_multiplier
                .unwrap_or(defaults.amplitude_multiplier),
            smoothing_speed: self.smoothing_speed.unwrap_or(defaults.smoothing_speed),
            silent_color: self
                .silent_color
                .map(Rgba::from)
                .unwrap_or(defaults.silent_color),
            speaking_color: self
                .speaking_color
                .map(Rgba::from)
                .unwrap_or(defaults.speaking_color),
        }
    }

    /// Parameter mapping for `kind`, with per-variant defaults.
    pub fn mapping(&self, kind: SourceKind) -> VfxMapping {
        let defaults = match kind {
            SourceKind::Microphone => VfxMapping::microphone(),
            SourceKind::Clip => VfxMapping::playback(),
        };

        VfxMapping {
            size_base: self.size_base.unwrap_or(defaults.size_base),
            size_gain: self.size_gain.unwrap_or(defaults.size_gain),
            turbulence_base: self.turbulence_base.unwrap_or(defaults.turbulence_base),
            turbulence_gain: self.turbulence_gain.unwrap_or(defaults.turbulence_gain),
            trail_base: self.trail_base.unwrap_or(defaults.trail_base),
            trail_gain: self.trail_gain.unwrap_or(defaults.trail_gain),
        }
    }
}
