//! Audio-source capability and FFT window functions

use std::str::FromStr;

/// Number of time-domain samples in one snapshot.
pub const SAMPLE_BUFFER_SIZE: usize = 1024;

/// Number of frequency-domain magnitude bins in one snapshot.
pub const SPECTRUM_SIZE: usize = 512;

/// Window function applied before the Fourier transform of a frequency
/// snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FftWindow {
    Rectangular,
    Triangle,
    Hamming,
    Hann,
    Blackman,
    BlackmanHarris,
}

/// A window name that is not in the [`FftWindow`] menu.
#[derive(Debug, thiserror::Error)]
#[error("unknown window function: {0:?}")]
pub struct UnknownWindow(pub String);

impl FftWindow {
    pub const ALL: [FftWindow; 6] = [
        FftWindow::Rectangular,
        FftWindow::Triangle,
        FftWindow::Hamming,
        FftWindow::Hann,
        FftWindow::Blackman,
        FftWindow::BlackmanHarris,
    ];

    /// Kebab-case name, the inverse of [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            FftWindow::Rectangular => "rectangular",
            FftWindow::Triangle => "triangle",
            FftWindow::Hamming => "hamming",
            FftWindow::Hann => "hann",
            FftWindow::Blackman => "blackman",
            FftWindow::BlackmanHarris => "blackman-harris",
        }
    }

    /// Window coefficients for a transform of `len` points, in the
    /// periodic form (denominator `len`, as fits an FFT).
    pub fn coefficients(self, len: usize) -> Vec<f32> {
        use std::f32::consts::PI;

        (0..len)
            .map(|i| {
                let x = i as f32 / len as f32;
                match self {
                    FftWindow::Rectangular => 1.0,
                    FftWindow::Triangle => 1.0 - (2.0 * x - 1.0).abs(),
                    FftWindow::Hamming => 0.54 - 0.46 * (2.0 * PI * x).cos(),
                    FftWindow::Hann => 0.5 - 0.5 * (2.0 * PI * x).cos(),
                    FftWindow::Blackman => {
                        0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
                    }
                    FftWindow::BlackmanHarris => {
                        0.35875 - 0.48829 * (2.0 * PI * x).cos()
                            + 0.14128 * (4.0 * PI * x).cos()
                            - 0.01168 * (6.0 * PI * x).cos()
                    }
                }
            })
            .collect()
    }
}

impl FromStr for FftWindow {
    type Err = UnknownWindow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rectangular" => Ok(FftWindow::Rectangular),
            "triangle" => Ok(FftWindow::Triangle),
            "hamming" => Ok(FftWindow::Hamming),
            "hann" => Ok(FftWindow::Hann),
            "blackman" => Ok(FftWindow::Blackman),
            "blackman-harris" => Ok(FftWindow::BlackmanHarris),
            other => Err(UnknownWindow(other.to_string())),
        }
    }
}

/// A live audio signal sampled once per tick.
///
/// Implementors serve snapshot copies of the most recently rendered audio;
/// the consumer never sees or mutates their internal buffers.
pub trait AudioSource {
    /// Advance the playback clock by `dt` seconds. Sources that progress on
    /// their own (live devices) keep the default no-op.
    fn advance(&mut self, _dt: f32) {}

    /// Fill `buf` with the most recent time-domain samples, oldest first,
    /// in the -1.0 to 1.0 range. `channel` selects an interleaved channel
    /// on multi-channel sources; single-channel sources ignore it.
    fn output_samples(&mut self, buf: &mut [f32], channel: usize);

    /// Fill `buf` with magnitudes of the windowed Fourier transform of the
    /// same trailing window `output_samples` serves.
    fn spectrum(&mut self, buf: &mut [f32], channel: usize, window: FftWindow);
}
