//! Command-line argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "beatviz")]
#[command(about = "Audio-reactive band and beat analyzer", long_about = None)]
pub struct Args {
    /// Log analyzer internals (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON preset overriding default parameters
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Print every frame to stdout as a JSON line
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a WAV file at a fixed frame rate
    Analyze {
        /// WAV file (int or float PCM, any channel count)
        #[arg(value_name = "WAV")]
        path: PathBuf,

        /// Frames per second to simulate
        #[arg(long, value_name = "FPS", default_value = "60", value_parser = parse_fps)]
        fps: f32,
    },

    /// Analyze the default audio input device
    Live {
        /// Stop after this many seconds and print a summary.
        /// Without it the capture runs until killed and no summary is printed.
        #[arg(long, value_name = "SECONDS")]
        seconds: Option<f32>,

        /// Frames per second
        #[arg(long, value_name = "FPS", default_value = "60", value_parser = parse_fps)]
        fps: f32,
    },

    /// Run without audio to show the idle fallback
    Idle {
        /// Number of frames to produce
        #[arg(long, value_name = "FRAMES", default_value = "60")]
        frames: u64,

        /// Frames per second (only affects animation time)
        #[arg(long, value_name = "FPS", default_value = "60", value_parser = parse_fps)]
        fps: f32,
    },
}

/// Accepted frame rates
pub const FPS_RANGE: std::ops::RangeInclusive<f32> = 1.0..=1000.0;

fn parse_fps(value: &str) -> Result<f32, String> {
    let fps: f32 = value
        .parse()
        .map_err(|_| format!("`{}` is not a number", value))?;
    if !FPS_RANGE.contains(&fps) {
        return Err(format!(
            "fps must be in {}..={}, got {}",
            FPS_RANGE.start(),
            FPS_RANGE.end(),
            fps
        ));
    }
    Ok(fps)
}

impl Args {
    /// Log filter used when RUST_LOG is not set
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "beatviz=debug"
        } else {
            "beatviz=info"
        }
    }

    /// Frame rate of the selected command
    pub fn fps(&self) -> f32 {
        match self.command {
            Command::Analyze { fps, .. } | Command::Live { fps, .. } | Command::Idle { fps, .. } => {
                fps
            }
        }
    }
}
