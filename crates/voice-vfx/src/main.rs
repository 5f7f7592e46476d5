//! Demo host: a terminal tick loop driving the extractor.

use std::env;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{error, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use voice_vfx::{
    list_devices, AudioError, CaptureSource, ClipSource, Config, SourceKind, TracingSink,
    VoiceReactor,
};
use voice_vfx_api::AudioSource;

const TICK_HZ: u64 = 60;

fn main() {
    let args: Vec<String> = env::args().collect();

    let debug_enabled = args.contains(&"--debug".to_string()) || args.contains(&"-d".to_string());
    init_tracing(debug_enabled);

    if args.contains(&"--help".to_string()) || args.contains(&"-h".to_string()) {
        print_usage();
        return;
    }

    if args.contains(&"--list-devices".to_string()) {
        list_devices();
        return;
    }

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), AudioError> {
    let config = Config::load();

    let kind = if args.iter().any(|a| a == "--clip") {
        SourceKind::Clip
    } else if args.contains(&"--mic".to_string()) {
        SourceKind::Microphone
    } else {
        config.source_kind().unwrap_or(SourceKind::Microphone)
    };

    let seconds = flag_value(args, "--seconds").and_then(|s| s.parse::<f32>().ok());

    match kind {
        SourceKind::Microphone => {
            let source = CaptureSource::open(config.device_timeout())?;
            drive(source, &config, kind, seconds)
        }
        SourceKind::Clip => {
            let path = flag_value(args, "--clip")
                .map(PathBuf::from)
                .or_else(|| config.clip_path())
                .ok_or(AudioError::MissingClip)?;
            let source = ClipSource::from_wav(&path)?;
            drive(source, &config, kind, seconds)
        }
    }
}

fn drive(
    mut source: impl AudioSource,
    config: &Config,
    kind: SourceKind,
    seconds: Option<f32>,
) -> Result<(), AudioError> {
    let mut sink = TracingSink::new();
    let mut reactor = VoiceReactor::new(config.reactivity(kind), config.mapping(kind), &mut sink);
    reactor.set_window(config.fft_window());

    let tick = Duration::from_secs(1) / TICK_HZ as u32;
    let started = Instant::now();
    let mut last = Instant::now();
    let mut ticks: u64 = 0;

    info!("running {:?} source at {} Hz, ctrl-c to stop", kind, TICK_HZ);
    loop {
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;

        let features = reactor.tick(&mut source, &mut sink, dt);
        ticks += 1;

        // Once-a-second summary; per-write detail sits at debug level
        if ticks % TICK_HZ == 0 {
            info!(
                "amplitude {:.3} (raw {:.3}) treble {:.3} | size {:.2} turbulence {:.2} trail {:.2} color ({:.2}, {:.2}, {:.2})",
                features.smoothed_amplitude,
                features.raw_amplitude,
                features.treble_energy,
                features.size,
                features.turbulence_intensity,
                features.trail_lifetime,
                features.color.r,
                features.color.g,
                features.color.b,
            );
        }

        if let Some(limit) = seconds {
            if started.elapsed().as_secs_f32() >= limit {
                info!(
                    "stopping after {} ticks in {:.1}s",
                    ticks,
                    started.elapsed().as_secs_f32()
                );
                return Ok(());
            }
        }

        thread::sleep(tick.saturating_sub(now.elapsed()));
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn init_tracing(debug: bool) {
    let default_level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_usage() {
    println!("voice-vfx: drive VFX parameters from a live audio signal");
    println!();
    println!("Usage: voice-vfx [options]");
    println!("  --mic             capture from the default input device (default)");
    println!("  --clip <path>     loop a WAV file as the source");
    println!("  --list-devices    print capture devices and exit");
    println!("  --seconds <n>     stop after n seconds");
    println!("  -d, --debug       log parameter writes (debug level)");
    println!("  -h, --help        show this help");
}
