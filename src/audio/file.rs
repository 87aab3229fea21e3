//! WAV file input, downmixed to mono.

use std::path::Path;

use tracing::debug;

use crate::error::{AudioError, AudioResult};

/// Decoded mono audio
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Mono samples in [-1, 1]
    pub samples: Vec<f32>,
    pub sample_rate_hz: u32,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate_hz as f32
    }

    /// Samples advanced per rendered frame at `fps`
    pub fn hop_size(&self, fps: f32) -> usize {
        ((self.sample_rate_hz as f32 / fps).round() as usize).max(1)
    }
}

/// Read a float or integer PCM WAV file and average its channels
pub fn read_wav_mono(path: &Path) -> AudioResult<DecodedAudio> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    if channels == 0 {
        return Err(AudioError::UnsupportedWav("zero channels".to_string()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            if !(1..=32).contains(&spec.bits_per_sample) {
                return Err(AudioError::UnsupportedWav(format!(
                    "{} bits per sample",
                    spec.bits_per_sample
                )));
            }
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    let samples: Vec<f32> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    debug!(
        "Decoded {}: {} channels @ {}Hz, {} mono samples",
        path.display(),
        channels,
        spec.sample_rate,
        samples.len()
    );

    Ok(DecodedAudio {
        samples,
        sample_rate_hz: spec.sample_rate,
    })
}
