//! Voice-reactive feature extraction and parameter mapping.
//!
//! Reads one time-domain and one frequency-domain snapshot per tick,
//! derives a smoothed loudness and a treble-band energy, and maps both
//! onto the four VFX parameters.

use tracing::trace;
use voice_vfx_api::{
    AudioSource, FftWindow, ParameterSink, Rgba, PARAM_COLOR, PARAM_SIZE, PARAM_TRAIL_LIFETIME,
    PARAM_TURBULENCE_INTENSITY, SAMPLE_BUFFER_SIZE, SPECTRUM_SIZE,
};

use crate::error::AudioError;

/// Reactivity settings supplied by the host.
#[derive(Clone, Debug)]
pub struct ReactivityConfig {
    /// Gain applied to the mean-absolute amplitude of one snapshot.
    pub amplitude_multiplier: f32,
    /// How fast the smoothed amplitude chases the raw amplitude, in 1/s.
    pub smoothing_speed: f32,
    /// Color written at startup and approached at rest.
    pub silent_color: Rgba,
    /// Color approached while the signal is loud.
    pub speaking_color: Rgba,
}

impl ReactivityConfig {
    /// Defaults for a clip routed through a playback channel.
    pub fn playback() -> Self {
        Self {
            amplitude_multiplier: 10.0,
            smoothing_speed: 5.0,
            silent_color: Rgba::BLUE,
            speaking_color: Rgba::CYAN,
        }
    }

    /// Defaults for live capture, which runs at much lower raw levels.
    pub fn microphone() -> Self {
        Self {
            amplitude_multiplier: 100.0,
            smoothing_speed: 50.0,
            silent_color: Rgba::WHITE,
            speaking_color: Rgba::CYAN,
        }
    }
}

impl Default for ReactivityConfig {
    fn default() -> Self {
        Self::playback()
    }
}

/// Linear mapping from the two extracted scalars onto the VFX parameters.
///
/// Each output is `base + signal * gain`; size and turbulence follow the
/// smoothed amplitude, trail lifetime follows the treble energy.
#[derive(Clone, Debug)]
pub struct VfxMapping {
    pub size_base: f32,
    pub size_gain: f32,
    pub turbulence_base: f32,
    pub turbulence_gain: f32,
    pub trail_base: f32,
    pub trail_gain: f32,
}

impl VfxMapping {
    pub fn playback() -> Self {
        Self {
            size_base: 1.0,
            size_gain: 0.5,
            turbulence_base: 5.0,
            turbulence_gain: 20.0,
            trail_base: 0.5,
            trail_gain: 10.0,
        }
    }

    /// Capture variant, identical except for a larger base size.
    pub fn microphone() -> Self {
        Self {
            size_base: 2.0,
            ..Self::playback()
        }
    }
}

impl Default for VfxMapping {
    fn default() -> Self {
        Self::playback()
    }
}

/// Everything one tick produced, returned for logging and tests.
#[derive(Clone, Copy, Debug)]
pub struct AudioFeatures {
    /// Mean-absolute amplitude of the snapshot times the configured gain.
    pub raw_amplitude: f32,
    /// Exponentially smoothed amplitude carried across ticks.
    pub smoothed_amplitude: f32,
    /// Magnitude sum over the top quarter of the spectrum.
    pub treble_energy: f32,
    pub size: f32,
    pub turbulence_intensity: f32,
    pub trail_lifetime: f32,
    pub color: Rgba,
}

/// Per-tick audio feature extractor driving a parameter sink.
///
/// Owns the snapshot buffers and the single piece of cross-tick state, the
/// smoothed amplitude. Construction writes the silent color to the sink so
/// the effect rests before the first tick lands.
pub struct VoiceReactor {
    config: ReactivityConfig,
    mapping: VfxMapping,
    window: FftWindow,
    samples: Vec<f32>,
    spectrum: Vec<f32>,
    smoothed_amplitude: f32,
}

impl VoiceReactor {
    /// Extractor with the fixed 1024-sample / 512-bin snapshot sizes.
    pub fn new(
        config: ReactivityConfig,
        mapping: VfxMapping,
        sink: &mut impl ParameterSink,
    ) -> Self {
        Self::build(SAMPLE_BUFFER_SIZE, SPECTRUM_SIZE, config, mapping, sink)
    }

    /// Extractor with custom snapshot sizes.
    ///
    /// Zero-length buffers are rejected up front; ticking with one would
    /// divide by zero.
    pub fn with_buffer_sizes(
        sample_len: usize,
        spectrum_len: usize,
        config: ReactivityConfig,
        mapping: VfxMapping,
        sink: &mut impl ParameterSink,
    ) -> Result<Self, AudioError> {
        if sample_len == 0 {
            return Err(AudioError::DegenerateBuffer { what: "sample" });
        }
        if spectrum_len == 0 {
            return Err(AudioError::DegenerateBuffer { what: "spectrum" });
        }
        Ok(Self::build(sample_len, spectrum_len, config, mapping, sink))
    }

    fn build(
        sample_len: usize,
        spectrum_len: usize,
        config: ReactivityConfig,
        mapping: VfxMapping,
        sink: &mut impl ParameterSink,
    ) -> Self {
        sink.set_color(PARAM_COLOR, config.silent_color);

        Self {
            config,
            mapping,
            window: FftWindow::BlackmanHarris,
            samples: vec![0.0; sample_len],
            spectrum: vec![0.0; spectrum_len],
            smoothed_amplitude: 0.0,
        }
    }

    /// Window applied to frequency snapshots. Defaults to Blackman-Harris.
    pub fn set_window(&mut self, window: FftWindow) {
        self.window = window;
    }

    /// Run one tick: refresh the source, extract features, write the four
    /// parameters. `dt` is the seconds elapsed since the previous tick.
    pub fn tick(
        &mut self,
        source: &mut impl AudioSource,
        sink: &mut impl ParameterSink,
        dt: f32,
    ) -> AudioFeatures {
        source.advance(dt);
        source.output_samples(&mut self.samples, 0);
        source.spectrum(&mut self.spectrum, 0, self.window);

        let features = self.extract(dt);

        sink.set_scalar(PARAM_SIZE, features.size);
        sink.set_scalar(PARAM_TURBULENCE_INTENSITY, features.turbulence_intensity);
        sink.set_scalar(PARAM_TRAIL_LIFETIME, features.trail_lifetime);
        sink.set_color(PARAM_COLOR, features.color);

        features
    }

    /// Feature extraction over the already-filled snapshot buffers.
    fn extract(&mut self, dt: f32) -> AudioFeatures {
        let raw = mean_abs(&self.samples) * self.config.amplitude_multiplier;

        // The chase fraction dt * speed is not clamped; a product above 1
        // overshoots past the raw value for that tick.
        let fraction = dt * self.config.smoothing_speed;
        self.smoothed_amplitude = lerp(self.smoothed_amplitude, raw, fraction);

        let treble = treble_energy(&self.spectrum);

        let size = self.mapping.size_base + self.smoothed_amplitude * self.mapping.size_gain;
        let turbulence =
            self.mapping.turbulence_base + self.smoothed_amplitude * self.mapping.turbulence_gain;
        let trail = self.mapping.trail_base + treble * self.mapping.trail_gain;

        // The color fraction is the smoothed amplitude itself, also
        // unclamped; loud input extrapolates past the speaking color.
        let color = self
            .config
            .silent_color
            .lerp(self.config.speaking_color, self.smoothed_amplitude);

        trace!(
            "raw {:.4} smoothed {:.4} treble {:.4}",
            raw,
            self.smoothed_amplitude,
            treble
        );

        AudioFeatures {
            raw_amplitude: raw,
            smoothed_amplitude: self.smoothed_amplitude,
            treble_energy: treble,
            size,
            turbulence_intensity: turbulence,
            trail_lifetime: trail,
            color,
        }
    }
}

/// Mean absolute value of one snapshot; a loudness proxy, not true RMS.
fn mean_abs(samples: &[f32]) -> f32 {
    let sum: f32 = samples.iter().map(|s| s.abs()).sum();
    sum / samples.len() as f32
}

/// Linear interpolation with exact endpoints at 0 and 1, unclamped.
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Sum of the top quarter of the magnitude spectrum.
fn treble_energy(spectrum: &[f32]) -> f32 {
    let start = spectrum.len() * 3 / 4;
    spectrum[start..].iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    /// Source serving fixed buffers, for driving the extractor directly.
    struct StubSource {
        samples: Vec<f32>,
        spectrum: Vec<f32>,
    }

    impl StubSource {
        fn constant(sample: f32, bin: f32) -> Self {
            Self {
                samples: vec![sample; SAMPLE_BUFFER_SIZE],
                spectrum: vec![bin; SPECTRUM_SIZE],
            }
        }
    }

    impl AudioSource for StubSource {
        fn output_samples(&mut self, buf: &mut [f32], _channel: usize) {
            buf.copy_from_slice(&self.samples[..buf.len()]);
        }

        fn spectrum(&mut self, buf: &mut [f32], _channel: usize, _window: FftWindow) {
            buf.copy_from_slice(&self.spectrum[..buf.len()]);
        }
    }

    fn playback_reactor(sink: &mut MemorySink) -> VoiceReactor {
        VoiceReactor::new(ReactivityConfig::playback(), VfxMapping::playback(), sink)
    }

    #[test]
    fn test_silence_gives_zero_amplitude() {
        let mut sink = MemorySink::new();
        let mut reactor = playback_reactor(&mut sink);
        let mut source = StubSource::constant(0.0, 0.0);

        let features = reactor.tick(&mut source, &mut sink, 0.02);
        assert_eq!(features.raw_amplitude, 0.0);
        assert_eq!(features.smoothed_amplitude, 0.0);
    }

    #[test]
    fn test_smoothed_decays_monotonically_to_zero() {
        let mut sink = MemorySink::new();
        let mut reactor = playback_reactor(&mut sink);

        // Push the smoothed amplitude up, then feed silence
        let mut loud = StubSource::constant(0.1, 0.0);
        reactor.tick(&mut loud, &mut sink, 0.02);

        let mut silent = StubSource::constant(0.0, 0.0);
        let mut previous = reactor.tick(&mut silent, &mut sink, 0.02).smoothed_amplitude;
        assert!(previous > 0.0);

        for _ in 0..200 {
            let features = reactor.tick(&mut silent, &mut sink, 0.02);
            assert!(
                features.smoothed_amplitude <= previous,
                "decay must be monotone"
            );
            previous = features.smoothed_amplitude;
        }
        assert!(previous < 1e-3);
    }

    #[test]
    fn test_constant_input_approaches_without_overshoot() {
        let mut sink = MemorySink::new();
        let mut reactor = playback_reactor(&mut sink);
        // Samples of 0.1 at multiplier 10 give a raw amplitude of 1.0
        let mut source = StubSource::constant(0.1, 0.0);

        // fraction = 0.02 * 5 = 0.1 per tick
        let first = reactor.tick(&mut source, &mut sink, 0.02);
        assert!((first.smoothed_amplitude - 0.1).abs() < 1e-4);

        let second = reactor.tick(&mut source, &mut sink, 0.02);
        assert!((second.smoothed_amplitude - 0.19).abs() < 1e-4);

        let mut previous = second.smoothed_amplitude;
        for _ in 0..200 {
            let features = reactor.tick(&mut source, &mut sink, 0.02);
            assert!(features.smoothed_amplitude >= previous - 1e-6);
            assert!(
                features.smoothed_amplitude <= features.raw_amplitude + 1e-4,
                "approach must not overshoot"
            );
            previous = features.smoothed_amplitude;
        }
        assert!((previous - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_large_fraction_overshoots_past_raw() {
        let mut sink = MemorySink::new();
        let mut reactor = playback_reactor(&mut sink);
        let mut source = StubSource::constant(0.1, 0.0);

        // fraction = 0.3 * 5 = 1.5, so one tick lands at 1.5x the raw value
        let features = reactor.tick(&mut source, &mut sink, 0.3);
        assert!(
            (features.smoothed_amplitude - 1.5).abs() < 1e-3,
            "unclamped lerp must extrapolate, got {}",
            features.smoothed_amplitude
        );
        assert!(features.smoothed_amplitude > features.raw_amplitude);
    }

    #[test]
    fn test_treble_energy_sums_top_quarter() {
        let silent = vec![0.0; 512];
        assert_eq!(treble_energy(&silent), 0.0);

        // 512 bins at 0.5 each: bins 384..512 sum to 64
        let constant = vec![0.5; 512];
        assert!((treble_energy(&constant) - 64.0).abs() < 1e-3);

        // Odd length: start = 10 * 3 / 4 = 7, three bins remain
        let short = vec![1.0; 10];
        assert_eq!(treble_energy(&short), 3.0);

        // Bins below the boundary contribute nothing
        let mut low_only = vec![1.0; 512];
        for bin in low_only.iter_mut().skip(384) {
            *bin = 0.0;
        }
        assert_eq!(treble_energy(&low_only), 0.0);
    }

    #[test]
    fn test_color_endpoints_are_exact() {
        let config = ReactivityConfig {
            amplitude_multiplier: 2.0,
            smoothing_speed: 4.0,
            ..ReactivityConfig::playback()
        };
        let mut sink = MemorySink::new();
        let mut reactor = VoiceReactor::new(config, VfxMapping::playback(), &mut sink);

        // At smoothed 0 the color is exactly the silent color
        let mut silent = StubSource::constant(0.0, 0.0);
        let features = reactor.tick(&mut silent, &mut sink, 0.02);
        assert_eq!(features.color, Rgba::BLUE);

        // Samples of 0.5 at multiplier 2 give raw exactly 1.0, and
        // dt 0.25 * speed 4 gives fraction exactly 1.0
        let mut loud = StubSource::constant(0.5, 0.0);
        let features = reactor.tick(&mut loud, &mut sink, 0.25);
        assert_eq!(features.smoothed_amplitude, 1.0);
        assert_eq!(features.color, Rgba::CYAN);
        assert_eq!(sink.color(PARAM_COLOR), Some(Rgba::CYAN));
    }

    #[test]
    fn test_loudness_scenario_end_to_end() {
        let mut sink = MemorySink::new();
        let mut reactor = playback_reactor(&mut sink);
        let mut source = StubSource::constant(0.1, 0.0);

        let features = reactor.tick(&mut source, &mut sink, 0.02);
        assert!((features.raw_amplitude - 1.0).abs() < 1e-4);
        assert!((features.smoothed_amplitude - 0.1).abs() < 1e-4);
        assert!((features.size - 1.05).abs() < 1e-3);
        assert!((features.turbulence_intensity - 7.0).abs() < 1e-3);

        assert_eq!(sink.scalar(PARAM_SIZE), Some(features.size));
        assert_eq!(
            sink.scalar(PARAM_TURBULENCE_INTENSITY),
            Some(features.turbulence_intensity)
        );
    }

    #[test]
    fn test_treble_scenario_end_to_end() {
        let mut sink = MemorySink::new();
        let mut reactor = playback_reactor(&mut sink);

        let mut spectrum = vec![0.0; SPECTRUM_SIZE];
        for bin in spectrum.iter_mut().skip(384) {
            *bin = 0.01;
        }
        let mut source = StubSource {
            samples: vec![0.0; SAMPLE_BUFFER_SIZE],
            spectrum,
        };

        let features = reactor.tick(&mut source, &mut sink, 0.02);
        assert!((features.treble_energy - 1.28).abs() < 1e-4);
        assert!((features.trail_lifetime - 13.3).abs() < 1e-3);
        assert_eq!(
            sink.scalar(PARAM_TRAIL_LIFETIME),
            Some(features.trail_lifetime)
        );
    }

    #[test]
    fn test_silent_color_written_before_first_tick() {
        let mut sink = MemorySink::new();
        let _reactor = playback_reactor(&mut sink);

        assert_eq!(sink.color(PARAM_COLOR), Some(Rgba::BLUE));
        assert_eq!(sink.scalar(PARAM_SIZE), None, "no scalars before the first tick");
    }

    #[test]
    fn test_zero_length_buffers_rejected() {
        let mut sink = MemorySink::new();
        let config = ReactivityConfig::playback();
        let mapping = VfxMapping::playback();

        let result =
            VoiceReactor::with_buffer_sizes(0, 512, config.clone(), mapping.clone(), &mut sink);
        assert!(matches!(result, Err(AudioError::DegenerateBuffer { .. })));

        let result = VoiceReactor::with_buffer_sizes(1024, 0, config, mapping, &mut sink);
        assert!(matches!(result, Err(AudioError::DegenerateBuffer { .. })));
    }

    #[test]
    fn test_variant_defaults() {
        let playback = ReactivityConfig::playback();
        assert_eq!(playback.amplitude_multiplier, 10.0);
        assert_eq!(playback.smoothing_speed, 5.0);
        assert_eq!(playback.silent_color, Rgba::BLUE);
        assert_eq!(playback.speaking_color, Rgba::CYAN);

        let microphone = ReactivityConfig::microphone();
        assert_eq!(microphone.amplitude_multiplier, 100.0);
        assert_eq!(microphone.smoothing_speed, 50.0);
        assert_eq!(microphone.silent_color, Rgba::WHITE);

        assert_eq!(VfxMapping::playback().size_base, 1.0);
        assert_eq!(VfxMapping::microphone().size_base, 2.0);
        assert_eq!(
            VfxMapping::microphone().trail_gain,
            VfxMapping::playback().trail_gain
        );
    }

    #[test]
    fn test_mean_abs_ignores_sign() {
        let samples = vec![0.5, -0.5, 0.25, -0.25];
        assert!((mean_abs(&samples) - 0.375).abs() < 1e-6);
    }
}
