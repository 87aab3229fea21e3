//! Mapping from analysis frames to visual drive values.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Scale factors and animation constants for the reactive driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactiveParams {
    /// Global reactivity passed to shape displacement and bar heights
    pub reactivity: f32,

    /// Below this average band energy the scene animates in idle mode
    pub idle_threshold: f32,

    /// Idle breathing: scale = 1 + sin(t * rate) * amplitude
    pub idle_breath_amplitude: f32,
    pub idle_breath_rate: f32,

    /// Idle morph: displacement offset = sin(t * rate) * amplitude
    pub idle_morph_amplitude: f32,
    pub idle_morph_rate: f32,

    /// Shake the camera when a beat fires
    pub camera_shake_on_beat: bool,

    /// Shake intensity armed by a beat (world units)
    pub shake_intensity: f32,

    /// Per-frame multiplier on shake intensity
    pub shake_decay: f32,

    /// Pulse the field of view with bass energy
    pub camera_pulse: bool,

    /// Resting field of view (degrees)
    pub base_fov_degrees: f32,

    /// Formula: target_fov = base_fov * (1 + bass * this_scale)
    pub fov_bass_scale: f32,

    /// Fraction of the remaining FOV distance covered per frame
    pub fov_lerp: f32,

    /// Kick particles outward when a beat fires
    pub particles_on_beat: bool,

    /// Velocity impulse applied to particles on a beat
    pub particle_impulse: f32,

    /// Number of spectrum bars
    pub bar_count: usize,
}

impl Default for ReactiveParams {
    fn default() -> Self {
        Self {
            reactivity: 1.0,
            idle_threshold: 0.1,
            idle_breath_amplitude: 0.08,
            idle_breath_rate: 0.5,
            idle_morph_amplitude: 0.05,
            idle_morph_rate: 0.3,
            camera_shake_on_beat: true,
            shake_intensity: 0.1,
            shake_decay: 0.9,
            camera_pulse: true,
            base_fov_degrees: 75.0,
            fov_bass_scale: 0.1,
            fov_lerp: 0.1,
            particles_on_beat: true,
            particle_impulse: 0.2,
            bar_count: 64,
        }
    }
}

impl ReactiveParams {
    /// Check ranges for values loaded from user presets
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("shake_decay", self.shake_decay),
            ("fov_lerp", self.fov_lerp),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.bar_count == 0 {
            return Err(ConfigError::Invalid("bar_count must be > 0".to_string()));
        }
        if !(self.base_fov_degrees > 0.0 && self.base_fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "base_fov_degrees must be in (0, 180), got {}",
                self.base_fov_degrees
            )));
        }
        Ok(())
    }
}
