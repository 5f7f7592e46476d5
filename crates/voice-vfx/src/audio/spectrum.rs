//! Windowed FFT magnitude spectra.
//!
//! Both source providers produce their frequency snapshots through this
//! analyzer, so the transform exists in exactly one place.

use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use voice_vfx_api::FftWindow;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    window: FftWindow,
    coefficients: Vec<f32>,
}

impl SpectrumAnalyzer {
    /// Analyzer over `fft_size` time-domain points, producing
    /// `fft_size / 2` magnitude bins.
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();

        Self {
            fft,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            window: FftWindow::Rectangular,
            coefficients: FftWindow::Rectangular.coefficients(fft_size),
        }
    }

    /// Fill `out` with `|X_k| / N` magnitudes of the windowed transform of
    /// `samples`. Short input is zero-padded, non-finite samples are
    /// treated as silence, and bins past `fft_size / 2` are zeroed.
    pub fn magnitudes(&mut self, samples: &[f32], out: &mut [f32], window: FftWindow) {
        let n = self.buffer.len();
        if window != self.window {
            self.coefficients = window.coefficients(n);
            self.window = window;
        }

        for i in 0..n {
            let s = samples.get(i).copied().unwrap_or(0.0);
            let s = if s.is_finite() { s } else { 0.0 };
            self.buffer[i] = Complex::new(s * self.coefficients[i], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let scale = 1.0 / n as f32;
        let bins = (n / 2).min(out.len());
        for (slot, value) in out.iter_mut().zip(&self.buffer[..bins]) {
            *slot = value.norm() * scale;
        }
        for slot in &mut out[bins..] {
            *slot = 0.0;
        }
    }
}
