//! Spectrum source configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Settings for turning PCM samples into an 8-bit magnitude spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumParams {
    /// FFT window size (must be power of 2)
    /// Yields fft_size / 2 spectrum bins
    pub fft_size: usize,

    /// Per-bin smoothing between successive spectra (0 = none, 1 = frozen)
    pub smoothing_time_constant: f32,

    /// Level mapped to byte 0 (dBFS)
    pub min_decibels: f32,

    /// Level mapped to byte 255 (dBFS)
    pub max_decibels: f32,
}

impl Default for SpectrumParams {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl SpectrumParams {
    /// Number of bins in each produced spectrum
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Frequency covered by one bin (Hz)
    pub fn bin_width_hz(&self, sample_rate_hz: u32) -> f32 {
        sample_rate_hz as f32 / self.fft_size as f32
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(ConfigError::Invalid(format!(
                "FFT size must be a power of 2 in 32..=32768, got {}",
                self.fft_size
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            return Err(ConfigError::Invalid(format!(
                "smoothing_time_constant must be in [0, 1], got {}",
                self.smoothing_time_constant
            )));
        }
        if !(self.min_decibels < self.max_decibels) {
            return Err(ConfigError::Invalid(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            )));
        }
        Ok(())
    }
}
