//! Live capture from the default input device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::error::{AudioError, AudioResult};

/// Running capture stream with a bounded mono sample buffer
pub struct LiveInput {
    /// Samples captured since the last drain (shared with the audio callback)
    buffer: Arc<Mutex<VecDeque<f32>>>,

    sample_rate_hz: u32,

    /// Input stream (kept alive)
    _stream: cpal::Stream,
}

impl LiveInput {
    /// Open the default input device and start capturing.
    ///
    /// At most `capacity` undrained samples are kept; older ones are dropped.
    pub fn start(capacity: usize) -> AudioResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AudioError::NoInputDevice)?;

        let supported = device.default_input_config()?;
        let sample_rate_hz = supported.sample_rate().0;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        info!(
            "Audio input: {} @ {}Hz, {} channels, {:?}",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate_hz,
            config.channels,
            sample_format
        );

        let buffer = Arc::new(Mutex::new(VecDeque::with_capacity(capacity)));

        let stream = match sample_format {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &config, Arc::clone(&buffer), capacity)?
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &config, Arc::clone(&buffer), capacity)?
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &config, Arc::clone(&buffer), capacity)?
            }
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        };

        stream.play()?;

        Ok(Self {
            buffer,
            sample_rate_hz,
            _stream: stream,
        })
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Move every captured sample into `out`; returns how many were moved
    pub fn drain_into(&self, out: &mut Vec<f32>) -> usize {
        let Ok(mut buffer) = self.buffer.lock() else {
            return 0;
        };
        let count = buffer.len();
        out.extend(buffer.drain(..));
        count
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    buffer: Arc<Mutex<VecDeque<f32>>>,
    capacity: usize,
) -> AudioResult<cpal::Stream>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = usize::from(config.channels.max(1));

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            if let Ok(mut buffer) = buffer.lock() {
                downmix_into(data, channels, &mut buffer, capacity);
            }
        },
        |err| warn!("Audio input stream error: {}", err),
        None,
    )?;

    Ok(stream)
}

/// Average interleaved frames to mono and append, keeping the newest
/// `capacity` samples.
fn downmix_into<T>(data: &[T], channels: usize, buffer: &mut VecDeque<f32>, capacity: usize)
where
    T: Sample,
    f32: FromSample<T>,
{
    for frame in data.chunks(channels) {
        let sum: f32 = frame.iter().map(|&s| s.to_sample::<f32>()).sum();
        buffer.push_back(sum / frame.len() as f32);
    }

    let excess = buffer.len().saturating_sub(capacity);
    buffer.drain(..excess);
}
