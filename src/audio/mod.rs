//! Audio inputs and spectrum analysis.
//!
//! Turns a WAV file or the default capture device into mono samples and
//! those samples into the 8-bit spectra the analyzer consumes.

mod capture;
mod file;
mod spectrum;

// Re-export public types
pub use capture::LiveInput;
pub use file::{read_wav_mono, DecodedAudio};
pub use spectrum::{blackman_window, SpectrumAnalyser};
