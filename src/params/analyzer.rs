//! Band splitting and beat detection parameters.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Largest magnitude an 8-bit spectrum bin can hold
pub const MAX_BIN_MAGNITUDE: f32 = 255.0;

/// Band layout and reactivity for the frequency analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerParams {
    /// End of the bass band, as a fraction of spectrum length
    /// Bass covers bins [0, floor(N * this))
    pub bass_end_fraction: f32,

    /// End of the mid band, as a fraction of spectrum length
    /// Treble covers the remaining bins up to N
    pub mid_end_fraction: f32,

    /// Multiplier applied to normalized bass energy
    pub bass_reactivity: f32,

    /// Multiplier applied to normalized mid energy
    pub mid_reactivity: f32,

    /// Multiplier applied to normalized treble energy
    pub treble_reactivity: f32,

    /// Constant band level reported while no spectrum is available
    pub idle_level: f32,

    /// Beat detector tuning
    pub beat: BeatParams,
}

impl Default for AnalyzerParams {
    fn default() -> Self {
        Self {
            bass_end_fraction: 0.1,
            mid_end_fraction: 0.5,
            bass_reactivity: 1.5,
            mid_reactivity: 1.0,
            treble_reactivity: 1.0,
            idle_level: 0.05,
            beat: BeatParams::default(),
        }
    }
}

impl AnalyzerParams {
    /// Set the same multiplier on every band
    pub fn with_uniform_reactivity(mut self, reactivity: f32) -> Self {
        self.bass_reactivity = reactivity;
        self.mid_reactivity = reactivity;
        self.treble_reactivity = reactivity;
        self
    }

    /// Check ranges for values loaded from user presets.
    ///
    /// The analyzer itself tolerates anything; this is for the config loader.
    pub fn validate(&self) -> ConfigResult<()> {
        let fractions_ok = (0.0..=1.0).contains(&self.bass_end_fraction)
            && (0.0..=1.0).contains(&self.mid_end_fraction)
            && self.bass_end_fraction <= self.mid_end_fraction;
        if !fractions_ok {
            return Err(ConfigError::Invalid(format!(
                "band fractions must satisfy 0 <= bass ({}) <= mid ({}) <= 1",
                self.bass_end_fraction, self.mid_end_fraction
            )));
        }
        for (name, value) in [
            ("bass_reactivity", self.bass_reactivity),
            ("mid_reactivity", self.mid_reactivity),
            ("treble_reactivity", self.treble_reactivity),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be finite and >= 0, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.idle_level) {
            return Err(ConfigError::Invalid(format!(
                "idle_level must be in [0, 1], got {}",
                self.idle_level
            )));
        }
        self.beat.validate()
    }
}

/// Beat detector tuning (all values are per rendered frame)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeatParams {
    /// Multiplier on the running baseline that bass energy must exceed
    pub sensitivity: f32,

    /// Frames during which no new beat may fire after a trigger
    /// 10 frames ≈ 166ms at 60 FPS
    pub refractory_frames: u32,

    /// Baseline smoothing: baseline = baseline * decay + energy * (1 - decay)
    pub baseline_decay: f32,

    /// Per-frame multiplier on beat strength
    pub strength_decay: f32,

    /// Bass energy must also exceed this absolute level to trigger
    pub energy_floor: f32,
}

impl Default for BeatParams {
    fn default() -> Self {
        Self {
            sensitivity: 1.2,
            refractory_frames: 10,
            baseline_decay: 0.98,
            strength_decay: 0.9,
            energy_floor: 0.3,
        }
    }
}

impl BeatParams {
    /// Check ranges for values loaded from user presets
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.sensitivity.is_finite() && self.sensitivity >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "sensitivity must be finite and >= 0, got {}",
                self.sensitivity
            )));
        }
        for (name, value) in [
            ("baseline_decay", self.baseline_decay),
            ("strength_decay", self.strength_decay),
            ("energy_floor", self.energy_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
