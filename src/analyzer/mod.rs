//! Frequency and beat analyzer.
//!
//! Consumes one 8-bit spectrum per rendered frame, splits it into
//! bass/mid/treble energies and runs beat detection on the bass band.
//! When no spectrum is available the analyzer reports a constant idle
//! level so dependent visuals keep moving gently.

mod bands;
mod beat;

pub use bands::{bass_drive, split_bands, BandEnergies, BandRanges};
pub use beat::{BeatDetector, BeatEvent, BeatState};

use serde::Serialize;
use tracing::{debug, trace};

use crate::params::AnalyzerParams;

/// Analyzer output for one frame
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AnalysisFrame {
    /// Frames analyzed before this one
    pub frame_index: u64,
    pub bands: BandEnergies,
    /// Decaying pulse strength in [0, 1]
    pub beat_strength: f32,
    /// Set only on the frame a beat fired
    pub beat: Option<BeatEvent>,
    /// True when no spectrum was supplied and idle values were used
    pub idle: bool,
}

impl AnalysisFrame {
    pub fn is_beat(&self) -> bool {
        self.beat.is_some()
    }
}

/// Stateful analyzer owning its parameters and beat detector state
#[derive(Debug, Clone)]
pub struct Analyzer {
    params: AnalyzerParams,
    detector: BeatDetector,
    frame_index: u64,
}

impl Analyzer {
    pub fn new(params: AnalyzerParams) -> Self {
        debug!(
            "Analyzer created: bands=[{}, {}], sensitivity={}, refractory={} frames",
            params.bass_end_fraction,
            params.mid_end_fraction,
            params.beat.sensitivity,
            params.beat.refractory_frames
        );

        Self {
            detector: BeatDetector::new(params.beat.clone()),
            params,
            frame_index: 0,
        }
    }

    /// Analyze one frame. `None` means no audio source is connected.
    pub fn update(&mut self, spectrum: Option<&[u8]>) -> AnalysisFrame {
        self.update_with(spectrum, |_| {})
    }

    /// Analyze one frame, calling `on_beat` synchronously if a beat fires
    pub fn update_with<F>(&mut self, spectrum: Option<&[u8]>, mut on_beat: F) -> AnalysisFrame
    where
        F: FnMut(&BeatEvent),
    {
        let frame_index = self.frame_index;
        self.frame_index += 1;

        let (bands, beat, idle) = match spectrum {
            Some(bins) => {
                let (bands, drive) = bands::split_with_drive(bins, &self.params);
                let beat = self.detector.process(drive, frame_index);
                (bands, beat, false)
            }
            None => {
                self.detector.tick_idle();
                (BandEnergies::uniform(self.params.idle_level), None, true)
            }
        };

        if let Some(event) = &beat {
            trace!(
                "Beat at frame {}: energy={:.3} threshold={:.3}",
                event.frame_index,
                event.energy,
                event.threshold
            );
            on_beat(event);
        }

        AnalysisFrame {
            frame_index,
            bands,
            beat_strength: self.detector.strength(),
            beat,
            idle,
        }
    }

    pub fn params(&self) -> &AnalyzerParams {
        &self.params
    }

    /// Retune while running; the beat baseline is kept
    pub fn set_params(&mut self, params: AnalyzerParams) {
        self.detector.set_params(params.beat.clone());
        self.params = params;
        debug!("Analyzer params updated");
    }

    pub fn beat_state(&self) -> &BeatState {
        self.detector.state()
    }

    /// Number of frames analyzed so far
    pub fn frame_count(&self) -> u64 {
        self.frame_index
    }

    /// Forget all history, as if freshly created
    pub fn reset(&mut self) {
        self.detector.reset();
        self.frame_index = 0;
        debug!("Analyzer reset");
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_fallback() {
        let mut analyzer = Analyzer::default();
        for _ in 0..50 {
            let frame = analyzer.update(None);
            assert!(frame.idle);
            assert_eq!(frame.bands, BandEnergies::uniform(0.05));
            assert!(!frame.is_beat());
        }
        assert_eq!(analyzer.frame_count(), 50);
    }

    #[test]
    fn test_callback_fires_on_beat() {
        let mut analyzer = Analyzer::default();
        let spectrum = vec![255u8; 1024];

        let mut fired = Vec::new();
        let frame = analyzer.update_with(Some(spectrum.as_slice()), |event| fired.push(*event));

        assert!(frame.is_beat());
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].frame_index, 0);
        assert_eq!(frame.beat, Some(fired[0]));
    }

    #[test]
    fn test_idle_frames_fade_pulse() {
        let mut analyzer = Analyzer::default();
        let spectrum = vec![255u8; 1024];
        analyzer.update(Some(spectrum.as_slice()));
        let baseline = analyzer.beat_state().baseline;

        let frame = analyzer.update(None);
        assert!((frame.beat_strength - 0.81).abs() < 1e-6);
        assert_eq!(analyzer.beat_state().baseline, baseline);
    }

    #[test]
    fn test_set_params_and_reset() {
        let mut analyzer = Analyzer::default();
        analyzer.update(Some(&[200u8; 64][..]));

        let params = AnalyzerParams {
            idle_level: 0.2,
            ..Default::default()
        };
        analyzer.set_params(params.clone());
        assert_eq!(analyzer.params(), &params);
        assert!(analyzer.beat_state().baseline > 0.0);

        analyzer.reset();
        assert_eq!(analyzer.frame_count(), 0);
        assert_eq!(*analyzer.beat_state(), BeatState::default());
        assert_eq!(analyzer.update(None).bands.bass, 0.2);
    }
}
