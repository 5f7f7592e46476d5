//! Looping clip playback source.
//!
//! Decodes a WAV file up front and serves snapshots of the trailing
//! window behind a playhead the host clock advances. The clip loops, so
//! windows wrap across the seam.

use std::path::Path;

use tracing::info;
use voice_vfx_api::{AudioSource, FftWindow, SAMPLE_BUFFER_SIZE};

use crate::audio::SpectrumAnalyzer;
use crate::error::AudioError;

pub struct ClipSource {
    /// Interleaved frames, `channels` samples per frame.
    frames: Vec<f32>,
    channels: usize,
    sample_rate: u32,
    /// Playhead in frames from clip start, wrapping at the clip length.
    playhead: f64,
    scratch: Vec<f32>,
    analyzer: SpectrumAnalyzer,
}

impl ClipSource {
    pub fn from_wav(path: impl AsRef<Path>) -> Result<Self, AudioError> {
        let path = path.as_ref();
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let frames: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => {
                reader.samples::<f32>().collect::<Result<_, _>>()?
            }
            hound::SampleFormat::Int => {
                let max = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f32;
                match spec.bits_per_sample {
                    16 => reader
                        .samples::<i16>()
                        .map(|s| s.map(|v| v as f32 / max))
                        .collect::<Result<_, _>>()?,
                    24 | 32 => reader
                        .samples::<i32>()
                        .map(|s| s.map(|v| v as f32 / max))
                        .collect::<Result<_, _>>()?,
                    bits => return Err(AudioError::ClipFormat { bits }),
                }
            }
        };

        info!(
            "loaded clip {:?}: {} frames, {} ch, {} Hz",
            path,
            frames.len() / spec.channels.max(1) as usize,
            spec.channels,
            spec.sample_rate
        );

        Self::from_frames(frames, spec.channels as usize, spec.sample_rate)
    }

    /// Source over raw interleaved frames.
    pub fn from_frames(
        frames: Vec<f32>,
        channels: usize,
        sample_rate: u32,
    ) -> Result<Self, AudioError> {
        if channels == 0 || frames.len() < channels {
            return Err(AudioError::EmptyClip);
        }

        Ok(Self {
            frames,
            channels,
            sample_rate,
            playhead: 0.0,
            scratch: vec![0.0; SAMPLE_BUFFER_SIZE],
            analyzer: SpectrumAnalyzer::new(SAMPLE_BUFFER_SIZE),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn frame_count(&self) -> usize {
        self.frames.len() / self.channels
    }

    /// Copy the trailing `buf.len()` frames ending at `playhead`, oldest
    /// first, wrapping across the loop seam. Clips shorter than the window
    /// cycle through repeatedly.
    fn fill_window(
        frames: &[f32],
        channels: usize,
        playhead: f64,
        buf: &mut [f32],
        channel: usize,
    ) {
        let frame_count = (frames.len() / channels) as i64;
        let channel = channel.min(channels - 1);
        let end = playhead as i64;

        let len = buf.len() as i64;
        for (i, slot) in buf.iter_mut().enumerate() {
            let frame = (end - len + i as i64).rem_euclid(frame_count);
            *slot = frames[frame as usize * channels + channel];
        }
    }
}

impl AudioSource for ClipSource {
    fn advance(&mut self, dt: f32) {
        let frames = self.frame_count() as f64;
        self.playhead = (self.playhead + dt as f64 * self.sample_rate as f64) % frames;
    }

    fn output_samples(&mut self, buf: &mut [f32], channel: usize) {
        Self::fill_window(&self.frames, self.channels, self.playhead, buf, channel);
    }

    fn spectrum(&mut self, buf: &mut [f32], channel: usize, window: FftWindow) {
        Self::fill_window(
            &self.frames,
            self.channels,
            self.playhead,
            &mut self.scratch,
            channel,
        );
        self.analyzer.magnitudes(&self.scratch, buf, window);
    }
}
