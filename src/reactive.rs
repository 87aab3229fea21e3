//! Visual drive values derived from analysis frames.
//!
//! Turns band energies and beat pulses into the numbers a renderer feeds to
//! its shapes, camera and particles. Nothing here touches a GPU; uniform
//! structs are `Pod` so they can be uploaded as-is.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use noise::{NoiseFn, Perlin};

use crate::analyzer::{AnalysisFrame, BeatEvent};
use crate::params::{ReactiveParams, MAX_BIN_MAGNITUDE};

/// Shake intensity below which the camera is considered settled
const SHAKE_EPSILON: f32 = 0.001;

/// Jitter speed for camera shake (noise units per second)
const SHAKE_JITTER_RATE: f64 = 23.0;

/// Uniform block for the displaced sphere shader
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SphereUniforms {
    pub time: f32,
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    pub beat: f32,
    pub reactivity: f32,
    pub _padding: [f32; 2],
}

/// Camera adjustments for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraDrive {
    /// Offset to add to the camera position this frame
    pub shake_offset: Vec3,
    pub fov_degrees: f32,
}

/// Everything the render layer needs for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualFrame {
    pub sphere: SphereUniforms,
    /// Uniform sphere scale (breathes while idle)
    pub sphere_scale: f32,
    /// Multiplier on base rotation speed
    pub rotation_factor: f32,
    /// Per-axis multiplier on particle velocity
    pub particle_speed: Vec3,
    /// Outward velocity kick for particles; non-zero once per beat
    pub particle_impulse: f32,
    pub camera: CameraDrive,
    /// True while band energy is low enough for idle animation
    pub idle: bool,
}

/// Stateful mapping from analysis frames to visual drive values
pub struct ReactiveDriver {
    params: ReactiveParams,
    perlin: Perlin,
    shake_intensity: f32,
    fov_degrees: f32,
    pending_impulse: f32,
}

impl ReactiveDriver {
    pub fn new(params: ReactiveParams) -> Self {
        Self {
            perlin: Perlin::new(7),
            shake_intensity: 0.0,
            fov_degrees: params.base_fov_degrees,
            pending_impulse: 0.0,
            params,
        }
    }

    /// One-shot reactions to a beat: camera shake and particle burst
    pub fn on_beat(&mut self, _event: &BeatEvent) {
        if self.params.camera_shake_on_beat {
            self.shake_intensity = self.params.shake_intensity;
        }
        if self.params.particles_on_beat {
            self.pending_impulse = self.params.particle_impulse;
        }
    }

    /// Map one analysis frame to drive values
    ///
    /// # Arguments
    /// * `frame` - Analyzer output for this frame
    /// * `time_s` - Seconds since start (drives idle animation and jitter)
    pub fn update(&mut self, frame: &AnalysisFrame, time_s: f32) -> VisualFrame {
        let bands = &frame.bands;
        let p = &self.params;

        let idle = bands.average < p.idle_threshold;
        let (sphere_scale, morph) = if idle {
            (
                1.0 + (time_s * p.idle_breath_rate).sin() * p.idle_breath_amplitude,
                (time_s * p.idle_morph_rate).sin() * p.idle_morph_amplitude,
            )
        } else {
            (1.0, 0.0)
        };

        let sphere = SphereUniforms {
            time: time_s,
            bass: bands.bass + morph,
            mid: bands.mid + morph * 0.5,
            treble: bands.treble,
            beat: frame.beat_strength,
            reactivity: p.reactivity,
            _padding: [0.0; 2],
        };

        let camera = self.update_camera(bands.bass, time_s);

        VisualFrame {
            sphere,
            sphere_scale,
            rotation_factor: 1.0 + bands.bass,
            particle_speed: Vec3::new(1.0 + bands.bass, 1.0 + bands.mid, 1.0 + bands.treble),
            particle_impulse: std::mem::take(&mut self.pending_impulse),
            camera,
            idle,
        }
    }

    fn update_camera(&mut self, bass: f32, time_s: f32) -> CameraDrive {
        let shake_offset = if self.shake_intensity > SHAKE_EPSILON {
            let t = time_s as f64 * SHAKE_JITTER_RATE;
            // Perlin is ~[-1, 1]; halve it to match a ±0.5 jitter
            let jitter = Vec3::new(
                self.perlin.get([t, 0.5]) as f32,
                self.perlin.get([0.5, t + 17.0]) as f32,
                0.0,
            ) * 0.5;
            let offset = jitter * self.shake_intensity;
            self.shake_intensity *= self.params.shake_decay;
            offset
        } else {
            Vec3::ZERO
        };

        if self.params.camera_pulse {
            let target = self.params.base_fov_degrees * (1.0 + bass * self.params.fov_bass_scale);
            self.fov_degrees += (target - self.fov_degrees) * self.params.fov_lerp;
        }

        CameraDrive {
            shake_offset,
            fov_degrees: self.fov_degrees,
        }
    }

    /// Ease bar heights toward the spectrum (or an idle wave when `None`).
    ///
    /// Bar `i` samples bin `i * floor(len / bars.len())`.
    pub fn update_bars(&self, spectrum: Option<&[u8]>, time_s: f32, bars: &mut [f32]) {
        let count = bars.len();
        match spectrum {
            Some(bins) if !bins.is_empty() => {
                let step = bins.len() / count.max(1);
                for (i, height) in bars.iter_mut().enumerate() {
                    let bin = bins[(i * step).min(bins.len() - 1)];
                    let value = bin as f32 / MAX_BIN_MAGNITUDE;
                    let target = 0.1 + value * 3.0 * self.params.reactivity;
                    *height += (target - *height) * 0.3;
                }
            }
            _ => {
                for (i, height) in bars.iter_mut().enumerate() {
                    let target = 0.3 + (time_s * 0.8 + i as f32 * 0.15).sin() * 0.15;
                    *height += (target - *height) * 0.1;
                }
            }
        }
    }

    pub fn shake_intensity(&self) -> f32 {
        self.shake_intensity
    }

    pub fn params(&self) -> &ReactiveParams {
        &self.params
    }
}
