//! PCM to 8-bit magnitude spectrum conversion.
//!
//! Produces the same shape of data a browser frequency analyser hands out:
//! Blackman-windowed FFT, per-bin temporal smoothing, dB scaling and
//! quantization to 0..=255 across a fixed dB range.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;
use tracing::debug;

use crate::error::AudioResult;
use crate::params::SpectrumParams;

/// Streaming spectrum source over the most recent `fft_size` samples
pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    params: SpectrumParams,

    /// Ring of the latest samples
    ring: Vec<f32>,

    /// Next write position in `ring` (also the oldest sample)
    write_pos: usize,

    window: Vec<f32>,
    fft_buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,

    /// Smoothed linear magnitudes, one per bin
    smoothed: Vec<f32>,
}

impl SpectrumAnalyser {
    /// Create an analyser; fails if `params` do not validate
    pub fn new(params: SpectrumParams) -> AudioResult<Self> {
        params.validate()?;

        let fft_size = params.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();

        let window = (0..fft_size).map(|i| blackman_window(i, fft_size)).collect();

        debug!(
            "SpectrumAnalyser created: fft_size={}, bins={}, smoothing={}",
            fft_size,
            params.frequency_bin_count(),
            params.smoothing_time_constant
        );

        Ok(Self {
            fft,
            ring: vec![0.0; fft_size],
            write_pos: 0,
            window,
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            smoothed: vec![0.0; params.frequency_bin_count()],
            params,
        })
    }

    /// Append samples; only the latest `fft_size` are kept
    pub fn push_samples(&mut self, samples: &[f32]) {
        let size = self.ring.len();
        for &sample in samples {
            // NaN/Inf would poison the smoothed spectrum for good
            self.ring[self.write_pos] = if sample.is_finite() { sample } else { 0.0 };
            self.write_pos = (self.write_pos + 1) % size;
        }
    }

    /// Compute the current spectrum into `out`.
    ///
    /// Bins beyond `frequency_bin_count()` are zeroed; a shorter `out`
    /// receives the lowest bins.
    pub fn byte_frequency_data(&mut self, out: &mut [u8]) {
        self.analyse();

        let min_db = self.params.min_decibels;
        let range_scale = 255.0 / (self.params.max_decibels - min_db);

        for (i, byte) in out.iter_mut().enumerate() {
            *byte = match self.smoothed.get(i) {
                Some(&magnitude) => {
                    let db = 20.0 * magnitude.log10();
                    // log10(0) = -inf, which clamps to 0
                    ((db - min_db) * range_scale).floor().clamp(0.0, 255.0) as u8
                }
                None => 0,
            };
        }
    }

    /// Windowed FFT of the ring, folded into the smoothed magnitudes
    fn analyse(&mut self) {
        let size = self.ring.len();
        for i in 0..size {
            let sample = self.ring[(self.write_pos + i) % size];
            self.fft_buffer[i] = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch);

        let tau = self.params.smoothing_time_constant;
        let norm = 1.0 / size as f32;
        for (smoothed, bin) in self.smoothed.iter_mut().zip(&self.fft_buffer) {
            let magnitude = bin.norm() * norm;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
        }
    }

    pub fn frequency_bin_count(&self) -> usize {
        self.smoothed.len()
    }

    pub fn params(&self) -> &SpectrumParams {
        &self.params
    }

    /// Clear samples and smoothing history
    pub fn reset(&mut self) {
        self.ring.fill(0.0);
        self.write_pos = 0;
        self.smoothed.fill(0.0);
    }
}

/// Blackman window (alpha = 0.16) over a periodic span of `size` samples
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f32, sample_rate_hz: f32, len: usize, amplitude: f32) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq_hz * i as f32 / sample_rate_hz).sin() * amplitude)
            .collect()
    }

    #[test]
    fn test_blackman_window() {
        let size = 2048;

        // Zero at the start, peak of 1 at the center
        assert!(blackman_window(0, size).abs() < 1e-6);
        assert!((blackman_window(size / 2, size) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_silence_is_all_zero() {
        let mut analyser = SpectrumAnalyser::new(SpectrumParams::default()).unwrap();
        analyser.push_samples(&vec![0.0; 4096]);

        let mut bins = vec![255u8; analyser.frequency_bin_count()];
        analyser.byte_frequency_data(&mut bins);
        assert!(bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_low_sine_lands_in_low_bins() {
        let mut analyser = SpectrumAnalyser::new(SpectrumParams::default()).unwrap();
        let mut bins = vec![0u8; analyser.frequency_bin_count()];

        // 100 Hz ≈ bin 4.6 at 44.1kHz / 2048
        let signal = sine(100.0, 44100.0, 2048, 0.9);
        for _ in 0..10 {
            analyser.push_samples(&signal);
            analyser.byte_frequency_data(&mut bins);
        }

        let peak = bins
            .iter()
            .enumerate()
            .max_by_key(|(_, &b)| b)
            .map(|(i, _)| i)
            .unwrap();
        assert!((3..=6).contains(&peak), "peak at bin {}", peak);
        assert_eq!(bins[peak], 255);

        let low: u32 = bins[..100].iter().map(|&b| b as u32).sum();
        let high: u32 = bins[512..].iter().map(|&b| b as u32).sum();
        assert!(low > high, "low={} high={}", low, high);
    }

    #[test]
    fn test_smoothing_spreads_over_frames() {
        let params = SpectrumParams {
            smoothing_time_constant: 0.9,
            ..Default::default()
        };
        let mut analyser = SpectrumAnalyser::new(params).unwrap();
        let mut bins = vec![0u8; analyser.frequency_bin_count()];

        let signal = sine(1000.0, 44100.0, 2048, 0.01);
        analyser.push_samples(&signal);
        analyser.byte_frequency_data(&mut bins);
        let first = bins[46];

        analyser.byte_frequency_data(&mut bins);
        let second = bins[46];
        assert!(second > first, "first={} second={}", first, second);
    }

    #[test]
    fn test_non_finite_samples_are_silenced() {
        let mut analyser = SpectrumAnalyser::new(SpectrumParams::default()).unwrap();
        analyser.push_samples(&[f32::NAN, f32::INFINITY, f32::NEG_INFINITY]);

        let mut bins = vec![0u8; 16];
        analyser.byte_frequency_data(&mut bins);
        assert!(bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_short_and_long_outputs() {
        let params = SpectrumParams {
            fft_size: 64,
            ..Default::default()
        };
        let mut analyser = SpectrumAnalyser::new(params).unwrap();
        analyser.push_samples(&sine(5000.0, 44100.0, 64, 1.0));

        let mut long = vec![7u8; 100];
        analyser.byte_frequency_data(&mut long);
        assert!(long[32..].iter().all(|&b| b == 0));

        let mut short = vec![0u8; 4];
        analyser.byte_frequency_data(&mut short);
    }

    #[test]
    fn test_rejects_invalid_params() {
        let params = SpectrumParams {
            fft_size: 1000,
            ..Default::default()
        };
        assert!(SpectrumAnalyser::new(params).is_err());
    }

    #[test]
    fn test_reset() {
        let mut analyser = SpectrumAnalyser::new(SpectrumParams::default()).unwrap();
        analyser.push_samples(&sine(100.0, 44100.0, 2048, 0.9));
        let mut bins = vec![0u8; analyser.frequency_bin_count()];
        analyser.byte_frequency_data(&mut bins);
        assert!(bins.iter().any(|&b| b > 0));

        analyser.reset();
        analyser.byte_frequency_data(&mut bins);
        assert!(bins.iter().all(|&b| b == 0));
    }
}
