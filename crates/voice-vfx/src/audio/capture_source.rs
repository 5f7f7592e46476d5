//! Live capture source.
//!
//! Opens the default input device, downmixes interleaved frames to mono
//! into a one-second ring buffer, and serves snapshots of the most recent
//! samples. Startup blocks until the device delivers its first samples or
//! a deadline passes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Stream;
use tracing::{debug, info, warn};
use voice_vfx_api::{AudioSource, FftWindow, SAMPLE_BUFFER_SIZE};

use crate::audio::SpectrumAnalyzer;
use crate::error::AudioError;

const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Mono sample ring written by the capture callback.
struct Ring {
    samples: Vec<f32>,
    write_pos: usize,
}

impl Ring {
    fn new(len: usize) -> Self {
        Self {
            samples: vec![0.0; len],
            write_pos: 0,
        }
    }

    fn push(&mut self, sample: f32) {
        self.samples[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.samples.len();
    }

    /// Copy the most recent samples into `buf`, oldest first. A `buf`
    /// longer than the ring gets its tail zeroed.
    fn latest(&self, buf: &mut [f32]) {
        let len = self.samples.len();
        let take = buf.len().min(len);
        let start = (self.write_pos + len - take) % len;

        for (i, slot) in buf[..take].iter_mut().enumerate() {
            *slot = self.samples[(start + i) % len];
        }
        for slot in &mut buf[take..] {
            *slot = 0.0;
        }
    }
}

/// Average interleaved frames down to mono and push them into the ring.
fn downmix_into(ring: &mut Ring, data: &[f32], channels: usize) {
    for chunk in data.chunks(channels.max(1)) {
        let sample: f32 = chunk.iter().sum::<f32>() / chunk.len() as f32;
        ring.push(sample);
    }
}

pub struct CaptureSource {
    ring: Arc<Mutex<Ring>>,
    scratch: Vec<f32>,
    analyzer: SpectrumAnalyzer,
    _stream: Stream,
}

impl CaptureSource {
    /// Open the default input device and wait for it to go live.
    ///
    /// Fails with `DeviceUnavailable` when no input device exists and with
    /// `DeviceTimedOut` when the stream stays silent past `timeout`.
    pub fn open(timeout: Duration) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AudioError::DeviceUnavailable)?;
        let name = device.name().unwrap_or_else(|_| "unknown".to_string());
        info!("using capture device: {}", name);

        let stream_config: cpal::StreamConfig = device
            .default_input_config()
            .map_err(|e| AudioError::StreamOpen(e.to_string()))?
            .into();
        let channels = stream_config.channels as usize;
        let sample_rate = stream_config.sample_rate.0 as usize;
        debug!("capture config: {} ch at {} Hz", channels, sample_rate);

        // One second of audio, like a one-second looping capture clip
        let ring = Arc::new(Mutex::new(Ring::new(sample_rate.max(SAMPLE_BUFFER_SIZE))));
        let written = Arc::new(AtomicUsize::new(0));

        let callback_ring = Arc::clone(&ring);
        let callback_written = Arc::clone(&written);
        let err_fn = |err| warn!("capture stream error: {}", err);

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mut ring = callback_ring.lock().unwrap();
                    downmix_into(&mut ring, data, channels);
                    callback_written.fetch_add(data.len(), Ordering::Relaxed);
                },
                err_fn,
                None,
            )
            .map_err(|e| AudioError::StreamOpen(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamStart(e.to_string()))?;

        wait_for_samples(&written, timeout)?;
        info!("capture device is live");

        Ok(Self {
            ring,
            scratch: vec![0.0; SAMPLE_BUFFER_SIZE],
            analyzer: SpectrumAnalyzer::new(SAMPLE_BUFFER_SIZE),
            _stream: stream,
        })
    }
}

impl AudioSource for CaptureSource {
    // The device progresses on its own clock, so advance() keeps the
    // default no-op, and the downmixed ring has no channels to select.

    fn output_samples(&mut self, buf: &mut [f32], _channel: usize) {
        self.ring.lock().unwrap().latest(buf);
    }

    fn spectrum(&mut self, buf: &mut [f32], _channel: usize, window: FftWindow) {
        self.ring.lock().unwrap().latest(&mut self.scratch);
        self.analyzer.magnitudes(&self.scratch, buf, window);
    }
}

/// Bounded wait for the first callback delivery.
fn wait_for_samples(written: &AtomicUsize, timeout: Duration) -> Result<(), AudioError> {
    let deadline = Instant::now() + timeout;
    while written.load(Ordering::Relaxed) == 0 {
        if Instant::now() >= deadline {
            return Err(AudioError::DeviceTimedOut {
                waited_ms: timeout.as_millis() as u64,
            });
        }
        thread::sleep(STARTUP_POLL_INTERVAL);
    }
    Ok(())
}

/// Print the capture devices cpal can see. CLI output, not logging.
pub fn list_devices() {
    let host = cpal::default_host();
    println!("\n=== Capture Devices ===");

    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    match host.input_devices() {
        Ok(devices) => {
            let mut idx = 0;
            for device in devices {
                if let Ok(name) = device.name() {
                    let marker = if Some(&name) == default_name.as_ref() {
                        " (default)"
                    } else {
                        ""
                    };
                    println!("  [{}] {}{}", idx, name, marker);
                    idx += 1;
                }
            }
            if idx == 0 {
                println!("  none found");
            }
        }
        Err(e) => println!("  failed to enumerate devices: {}", e),
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_serves_latest_in_order() {
        let mut ring = Ring::new(8);
        for i in 0..10 {
            ring.push(i as f32);
        }

        let mut out = [0.0; 4];
        ring.latest(&mut out);
        assert_eq!(out, [6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_ring_wraps_write_position() {
        let mut ring = Ring::new(4);
        for i in 0..6 {
            ring.push(i as f32);
        }

        let mut out = [0.0; 4];
        ring.latest(&mut out);
        assert_eq!(out, [2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_downmix_averages_channels() {
        let mut ring = Ring::new(4);
        downmix_into(&mut ring, &[0.2, 0.4, -1.0, 1.0], 2);

        let mut out = [0.0; 2];
        ring.latest(&mut out);
        assert!((out[0] - 0.3).abs() < 1e-6);
        assert_eq!(out[1], 0.0);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let mut ring = Ring::new(4);
        downmix_into(&mut ring, &[0.1, 0.2, 0.3], 1);

        let mut out = [0.0; 3];
        ring.latest(&mut out);
        assert_eq!(out, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_timed_out_wait_reports_deadline() {
        let written = AtomicUsize::new(0);
        let result = wait_for_samples(&written, Duration::from_millis(30));
        assert!(matches!(
            result,
            Err(AudioError::DeviceTimedOut { waited_ms: 30 })
        ));
    }

    #[test]
    fn test_wait_returns_once_samples_arrive() {
        let written = AtomicUsize::new(512);
        assert!(wait_for_samples(&written, Duration::from_millis(30)).is_ok());
    }
}
