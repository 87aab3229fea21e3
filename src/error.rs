//! Error types for configuration loading and audio input.
//!
//! The analyzer core never fails; these cover everything around it.

use std::path::PathBuf;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected schema
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A parameter is outside its accepted range
    #[error("invalid parameter: {0}")]
    Invalid(String),
}

/// Errors raised by audio inputs and the spectrum source.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// WAV decoding failed
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// WAV file has a layout we cannot downmix
    #[error("unsupported WAV layout: {0}")]
    UnsupportedWav(String),

    /// No default capture device on this host
    #[error("no audio input device found")]
    NoInputDevice,

    /// Device refused to report a default input config
    #[error("failed to get input config: {0}")]
    StreamConfig(#[from] cpal::DefaultStreamConfigError),

    /// Input stream could not be built
    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    /// Input stream could not be started
    #[error("failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// Device sample format is not one we convert
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Spectrum source parameters rejected
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Top-level error for the command-line front end.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Audio(#[from] AudioError),

    /// Frame could not be written as JSON
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result alias for the command-line front end.
pub type Result<T> = std::result::Result<T, Error>;

/// Result alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result alias for audio operations.
pub type AudioResult<T> = std::result::Result<T, AudioError>;
