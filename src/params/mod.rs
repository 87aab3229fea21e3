//! Parameter definitions with documented units and defaults.
//!
//! All tuning constants live here:
//! - Band layout, reactivity and beat detection
//! - Spectrum source (FFT size, smoothing, dB range)
//! - Visual drive mapping
//! - JSON preset loading

mod analyzer;
mod config;
mod reactive;
mod spectrum;

// Re-export all types
pub use analyzer::{AnalyzerParams, BeatParams, MAX_BIN_MAGNITUDE};
pub use config::VisualizerConfig;
pub use reactive::ReactiveParams;
pub use spectrum::SpectrumParams;
