//! Per-frame chain: samples → spectrum → analysis → visual drive values.

use tracing::debug;

use crate::analyzer::{AnalysisFrame, Analyzer};
use crate::audio::{DecodedAudio, SpectrumAnalyser};
use crate::error::AudioResult;
use crate::params::VisualizerConfig;
use crate::reactive::{ReactiveDriver, VisualFrame};

/// Output of one pipeline step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineFrame {
    /// Animation time the step was driven with
    pub time_s: f32,
    pub analysis: AnalysisFrame,
    pub visual: VisualFrame,
}

/// Owns every stage for one visualizer session
pub struct Pipeline {
    spectrum: SpectrumAnalyser,
    analyzer: Analyzer,
    driver: ReactiveDriver,
    bins: Vec<u8>,
    bars: Vec<f32>,
}

impl Pipeline {
    pub fn new(config: &VisualizerConfig) -> AudioResult<Self> {
        let spectrum = SpectrumAnalyser::new(config.spectrum.clone())?;
        let bins = vec![0u8; spectrum.frequency_bin_count()];

        Ok(Self {
            spectrum,
            analyzer: Analyzer::new(config.analyzer.clone()),
            driver: ReactiveDriver::new(config.reactive.clone()),
            bins,
            bars: vec![0.0; config.reactive.bar_count],
        })
    }

    /// Advance one rendered frame.
    ///
    /// `samples` are the samples heard since the previous frame; `None`
    /// means no audio source is connected and idle values are produced.
    pub fn step(&mut self, samples: Option<&[f32]>, time_s: f32) -> PipelineFrame {
        let driver = &mut self.driver;

        let analysis = match samples {
            Some(samples) => {
                self.spectrum.push_samples(samples);
                self.spectrum.byte_frequency_data(&mut self.bins);
                let analysis = self
                    .analyzer
                    .update_with(Some(self.bins.as_slice()), |event| driver.on_beat(event));
                driver.update_bars(Some(self.bins.as_slice()), time_s, &mut self.bars);
                analysis
            }
            None => {
                let analysis = self.analyzer.update(None);
                driver.update_bars(None, time_s, &mut self.bars);
                analysis
            }
        };

        let visual = driver.update(&analysis, time_s);
        PipelineFrame {
            time_s,
            analysis,
            visual,
        }
    }

    /// Current bar heights
    pub fn bars(&self) -> &[f32] {
        &self.bars
    }

    /// Latest spectrum (empty bins until the first audio frame)
    pub fn spectrum(&self) -> &[u8] {
        &self.bins
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }
}

/// Run a decoded file through a fresh pipeline at `fps` frames per second.
///
/// Calls `on_frame` for every frame and returns the number of frames.
pub fn run_offline<F>(
    audio: &DecodedAudio,
    config: &VisualizerConfig,
    fps: f32,
    mut on_frame: F,
) -> AudioResult<u64>
where
    F: FnMut(&PipelineFrame),
{
    let mut pipeline = Pipeline::new(config)?;
    let hop = audio.hop_size(fps);

    debug!(
        "Offline run: {:.2}s @ {}Hz, {} FPS, hop={} samples, bin width {:.1}Hz",
        audio.duration_secs(),
        audio.sample_rate_hz,
        fps,
        hop,
        config.spectrum.bin_width_hz(audio.sample_rate_hz)
    );

    let mut frames = 0u64;
    for (i, chunk) in audio.samples.chunks(hop).enumerate() {
        let time_s = i as f32 / fps;
        let frame = pipeline.step(Some(chunk), time_s);
        on_frame(&frame);
        frames += 1;
    }

    Ok(frames)
}
