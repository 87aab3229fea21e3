//! beatviz - audio-reactive band and beat analyzer
//!
//! Feeds a WAV file, the default input device, or nothing at all through
//! the analyzer at a fixed frame rate and reports bands and beats.

use std::io::{self, Write};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use beatviz::analyzer::AnalysisFrame;
use beatviz::audio::{read_wav_mono, LiveInput};
use beatviz::cli::{Args, Command, FPS_RANGE};
use beatviz::error::{ConfigError, Result};
use beatviz::params::VisualizerConfig;
use beatviz::pipeline::{run_offline, Pipeline, PipelineFrame};

/// One JSON line of frame output
#[derive(Serialize)]
struct FrameRecord<'a> {
    time_s: f32,
    #[serde(flatten)]
    analysis: &'a AnalysisFrame,
    fov_degrees: f32,
    idle_animation: bool,
}

/// Collects counts and prints frames for every mode
struct Reporter {
    json: bool,
    fps: f32,
    frames: u64,
    beats: u64,
    last_time_s: f32,
}

impl Reporter {
    fn new(json: bool, fps: f32) -> Self {
        Self {
            json,
            fps,
            frames: 0,
            beats: 0,
            last_time_s: 0.0,
        }
    }

    fn frame(&mut self, frame: &PipelineFrame) -> Result<()> {
        let analysis = &frame.analysis;
        let time_s = frame.time_s;
        self.frames += 1;
        self.last_time_s = time_s;

        if let Some(beat) = &analysis.beat {
            self.beats += 1;
            if !self.json {
                info!(
                    "Beat #{} at {:.2}s (bass {:.2}, threshold {:.2})",
                    self.beats, time_s, beat.energy, beat.threshold
                );
            }
        }

        if self.json {
            let record = FrameRecord {
                time_s,
                analysis,
                fov_degrees: frame.visual.camera.fov_degrees,
                idle_animation: frame.visual.idle,
            };
            let line = serde_json::to_string(&record)?;
            // A closed stdout (e.g. piped into `head`) just ends output
            let _ = writeln!(io::stdout().lock(), "{}", line);
        }
        Ok(())
    }

    fn summary(&self) {
        let duration_s = if self.frames == 0 {
            0.0
        } else {
            self.last_time_s + 1.0 / self.fps
        };
        info!(
            "{} frames ({:.1}s), {} beats",
            self.frames, duration_s, self.beats
        );
    }
}

fn init_tracing(args: &Args) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(args: &Args) -> Result<()> {
    let config = VisualizerConfig::load_or_default(args.config.as_deref())?;
    let fps = args.fps();
    if !FPS_RANGE.contains(&fps) {
        return Err(ConfigError::Invalid(format!("fps out of range: {}", fps)).into());
    }
    let mut reporter = Reporter::new(args.json, fps);

    match &args.command {
        Command::Analyze { path, .. } => {
            let audio = read_wav_mono(path)?;
            info!(
                "Analyzing {} ({:.1}s @ {}Hz)",
                path.display(),
                audio.duration_secs(),
                audio.sample_rate_hz
            );

            let mut failure = None;
            run_offline(&audio, &config, fps, |frame| {
                if failure.is_none() {
                    failure = reporter.frame(frame).err();
                }
            })?;
            if let Some(err) = failure {
                return Err(err);
            }
        }
        Command::Live { seconds, .. } => {
            let period = Duration::try_from_secs_f32(1.0 / fps).map_err(|_| {
                ConfigError::Invalid(format!("fps {} gives no usable frame period", fps))
            })?;
            let input = LiveInput::start(input_capacity(&config))?;
            let mut pipeline = Pipeline::new(&config)?;
            let start = Instant::now();
            let mut samples = Vec::new();

            info!(
                "Listening @ {}Hz, {} bins of {:.1}Hz",
                input.sample_rate_hz(),
                config.spectrum.frequency_bin_count(),
                config.spectrum.bin_width_hz(input.sample_rate_hz())
            );
            if seconds.is_none() {
                info!("No --seconds limit: runs until killed, without a summary");
            }
            loop {
                let elapsed = start.elapsed().as_secs_f32();
                if seconds.is_some_and(|limit| elapsed >= limit) {
                    break;
                }

                samples.clear();
                input.drain_into(&mut samples);
                let frame = pipeline.step(Some(samples.as_slice()), elapsed);
                reporter.frame(&frame)?;

                thread::sleep(period);
            }
        }
        Command::Idle { frames, .. } => {
            let mut pipeline = Pipeline::new(&config)?;
            for i in 0..*frames {
                let frame = pipeline.step(None, i as f32 / fps);
                reporter.frame(&frame)?;
            }
        }
    }

    reporter.summary();
    Ok(())
}

/// Keep about two FFT windows of undrained live samples
fn input_capacity(config: &VisualizerConfig) -> usize {
    config.spectrum.fft_size * 2
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
