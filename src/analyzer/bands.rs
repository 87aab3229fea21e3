//! Band splitting of 8-bit magnitude spectra.

use std::ops::Range;

use serde::Serialize;

use crate::params::{AnalyzerParams, MAX_BIN_MAGNITUDE};

/// Normalized frequency band energies for one frame, each in [0, 1]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BandEnergies {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    /// Mean of the three reactivity-scaled bands
    pub average: f32,
}

impl BandEnergies {
    /// Every band (and the average) at the same level
    pub fn uniform(level: f32) -> Self {
        Self {
            bass: level,
            mid: level,
            treble: level,
            average: level,
        }
    }

    fn from_bands(bass: f32, mid: f32, treble: f32) -> Self {
        Self {
            bass,
            mid,
            treble,
            average: (bass + mid + treble) / 3.0,
        }
    }
}

/// Contiguous bin ranges of the three bands.
///
/// Always partitions `0..len` exactly, whatever the fractions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BandRanges {
    pub bass: Range<usize>,
    pub mid: Range<usize>,
    pub treble: Range<usize>,
}

impl BandRanges {
    /// Split `len` bins at floor(len * bass_end) and floor(len * mid_end)
    pub fn new(len: usize, bass_end_fraction: f32, mid_end_fraction: f32) -> Self {
        let bass_end = boundary(len, bass_end_fraction);
        let mid_end = boundary(len, mid_end_fraction).max(bass_end);

        Self {
            bass: 0..bass_end,
            mid: bass_end..mid_end,
            treble: mid_end..len,
        }
    }

    /// Band layout for a spectrum of `len` bins under `params`
    pub fn for_params(len: usize, params: &AnalyzerParams) -> Self {
        Self::new(len, params.bass_end_fraction, params.mid_end_fraction)
    }

    /// Normalized (bass, mid, treble) levels before reactivity scaling
    pub fn levels(&self, spectrum: &[u8]) -> (f32, f32, f32) {
        (
            mean_level(&spectrum[self.bass.clone()]),
            mean_level(&spectrum[self.mid.clone()]),
            mean_level(&spectrum[self.treble.clone()]),
        )
    }
}

/// Compute reactivity-scaled band energies for one spectrum frame.
///
/// Scaled values are clamped to [0, 1] and the average is taken over the
/// clamped values, so it tracks what the visuals actually receive.
pub fn split_bands(spectrum: &[u8], params: &AnalyzerParams) -> BandEnergies {
    split_with_drive(spectrum, params).0
}

/// Reactivity-scaled bass before clamping, as fed to beat detection.
///
/// Can exceed 1.0 when `bass_reactivity > 1`. The detector threshold is
/// `baseline * sensitivity`, which has to stay reachable on loud input.
pub fn bass_drive(spectrum: &[u8], params: &AnalyzerParams) -> f32 {
    split_with_drive(spectrum, params).1
}

/// Clamped band energies plus the unclamped bass drive
pub(crate) fn split_with_drive(spectrum: &[u8], params: &AnalyzerParams) -> (BandEnergies, f32) {
    let ranges = BandRanges::for_params(spectrum.len(), params);
    let (bass, mid, treble) = ranges.levels(spectrum);
    let drive = scale(bass, params.bass_reactivity);

    let bands = BandEnergies::from_bands(
        drive.min(1.0),
        scale(mid, params.mid_reactivity).min(1.0),
        scale(treble, params.treble_reactivity).min(1.0),
    );
    (bands, drive)
}

fn boundary(len: usize, fraction: f32) -> usize {
    if !(fraction > 0.0) {
        // Also catches NaN
        return 0;
    }
    if fraction >= 1.0 {
        return len;
    }
    ((len as f32 * fraction).floor() as usize).min(len)
}

/// Mean bin magnitude scaled to [0, 1]; empty bands are silent
fn mean_level(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u64 = bins.iter().map(|&b| u64::from(b)).sum();
    (sum as f64 / bins.len() as f64) as f32 / MAX_BIN_MAGNITUDE
}

/// `level * reactivity`, finite and non-negative
fn scale(level: f32, reactivity: f32) -> f32 {
    let scaled = level * reactivity;
    if scaled.is_nan() {
        return 0.0;
    }
    scaled.clamp(0.0, f32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unscaled() -> AnalyzerParams {
        AnalyzerParams::default().with_uniform_reactivity(1.0)
    }

    #[test]
    fn test_reference_layout() {
        let ranges = BandRanges::new(100, 0.1, 0.5);
        assert_eq!(ranges.bass, 0..10);
        assert_eq!(ranges.mid, 10..50);
        assert_eq!(ranges.treble, 50..100);
    }

    #[test]
    fn test_saturated_spectrum_is_unity() {
        let spectrum = vec![255u8; 100];
        let bands = split_bands(&spectrum, &unscaled());
        assert_eq!(bands, BandEnergies::uniform(1.0));
    }

    #[test]
    fn test_silent_spectrum_is_zero() {
        let spectrum = vec![0u8; 1024];
        let bands = split_bands(&spectrum, &AnalyzerParams::default());
        assert_eq!(bands, BandEnergies::uniform(0.0));
    }

    #[test]
    fn test_band_means() {
        // Bass bins at 51 (0.2), mid at 102 (0.4), treble at 153 (0.6)
        let mut spectrum = vec![0u8; 100];
        spectrum[..10].fill(51);
        spectrum[10..50].fill(102);
        spectrum[50..].fill(153);

        let bands = split_bands(&spectrum, &unscaled());
        assert!((bands.bass - 0.2).abs() < 1e-6);
        assert!((bands.mid - 0.4).abs() < 1e-6);
        assert!((bands.treble - 0.6).abs() < 1e-6);
        assert!((bands.average - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_reactivity_scales_and_clamps() {
        let spectrum = vec![102u8; 100]; // 0.4 everywhere
        let params = AnalyzerParams {
            bass_reactivity: 1.5,
            mid_reactivity: 1.0,
            treble_reactivity: 3.0,
            ..Default::default()
        };

        let bands = split_bands(&spectrum, &params);
        assert!((bands.bass - 0.6).abs() < 1e-6);
        assert!((bands.mid - 0.4).abs() < 1e-6);
        assert_eq!(bands.treble, 1.0);
        // Average follows the scaled values
        assert!((bands.average - (0.6 + 0.4 + 1.0) / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_bass_drive_is_not_clamped() {
        // 200/255 * 1.5 ≈ 1.176
        let spectrum = vec![200u8; 100];
        let params = AnalyzerParams::default();

        let (bands, drive) = split_with_drive(&spectrum, &params);
        assert_eq!(bands.bass, 1.0);
        assert!((drive - 200.0 / 255.0 * 1.5).abs() < 1e-6);
        assert_eq!(bass_drive(&spectrum, &params), drive);

        let negative = params.clone().with_uniform_reactivity(-2.0);
        assert_eq!(bass_drive(&spectrum, &negative), 0.0);
    }

    #[test]
    fn test_tiny_spectrum_has_empty_bands() {
        // floor(4 * 0.1) = 0 → bass is empty and reads as silence
        let spectrum = vec![255u8; 4];
        let ranges = BandRanges::new(4, 0.1, 0.5);
        assert!(ranges.bass.is_empty());

        let bands = split_bands(&spectrum, &unscaled());
        assert_eq!(bands.bass, 0.0);
        assert_eq!(bands.mid, 1.0);
        assert_eq!(bands.treble, 1.0);
    }

    #[test]
    fn test_empty_spectrum() {
        let bands = split_bands(&[], &AnalyzerParams::default());
        assert_eq!(bands, BandEnergies::uniform(0.0));
    }

    #[test]
    fn test_degenerate_fractions_still_partition() {
        let inverted = BandRanges::new(100, 0.7, 0.2);
        assert_eq!(inverted.bass, 0..70);
        assert!(inverted.mid.is_empty());
        assert_eq!(inverted.treble, 70..100);

        let out_of_range = BandRanges::new(100, -0.5, 2.0);
        assert!(out_of_range.bass.is_empty());
        assert_eq!(out_of_range.mid, 0..100);
        assert!(out_of_range.treble.is_empty());

        let nan = BandRanges::new(100, f32::NAN, 0.5);
        assert_eq!(nan.bass, 0..0);
        assert_eq!(nan.mid, 0..50);
    }

    proptest! {
        #[test]
        fn prop_ranges_partition_spectrum(
            len in 0usize..8192,
            f1 in 0.0f32..1.0,
            f2 in 0.0f32..1.0,
        ) {
            let ranges = BandRanges::new(len, f1.min(f2), f1.max(f2));
            prop_assert_eq!(ranges.bass.start, 0);
            prop_assert_eq!(ranges.bass.end, ranges.mid.start);
            prop_assert_eq!(ranges.mid.end, ranges.treble.start);
            prop_assert_eq!(ranges.treble.end, len);
            prop_assert!(ranges.bass.start <= ranges.bass.end);
            prop_assert!(ranges.mid.start <= ranges.mid.end);
            prop_assert!(ranges.treble.start <= ranges.treble.end);
            prop_assert_eq!(ranges.bass.len() + ranges.mid.len() + ranges.treble.len(), len);
        }

        #[test]
        fn prop_energies_stay_normalized(
            spectrum in proptest::collection::vec(any::<u8>(), 0..512),
            reactivity in 0.0f32..4.0,
        ) {
            let params = AnalyzerParams::default().with_uniform_reactivity(reactivity);
            let bands = split_bands(&spectrum, &params);
            for value in [bands.bass, bands.mid, bands.treble, bands.average] {
                prop_assert!((0.0..=1.0).contains(&value));
            }
        }
    }
}
