//! Bass onset detection against an adaptive baseline.
//!
//! A beat fires when bass energy rises above `baseline * sensitivity` and an
//! absolute floor while the detector is armed. Firing starts a refractory
//! cooldown so one sustained hit cannot retrigger every frame.

use serde::Serialize;

use crate::params::BeatParams;

/// Persistent detector state, updated once per frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BeatState {
    /// Exponential moving average of bass energy
    pub baseline: f32,
    /// Pulse strength, 1.0 at a trigger and decaying toward 0
    pub strength: f32,
    /// Frames remaining before the detector re-arms
    pub cooldown: u32,
}

/// A detected beat, handed to the on-beat notification
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BeatEvent {
    /// Analyzer frame on which the beat fired
    pub frame_index: u64,
    /// Bass drive that triggered it (reactivity-scaled, may exceed 1.0)
    pub energy: f32,
    /// Dynamic threshold it exceeded (baseline * sensitivity)
    pub threshold: f32,
}

/// Frame-driven beat detector
#[derive(Debug, Clone)]
pub struct BeatDetector {
    params: BeatParams,
    state: BeatState,
}

impl BeatDetector {
    pub fn new(params: BeatParams) -> Self {
        Self {
            params,
            state: BeatState::default(),
        }
    }

    /// Feed one frame of bass energy; returns the beat if one fired
    pub fn process(&mut self, energy: f32, frame_index: u64) -> Option<BeatEvent> {
        self.state.cooldown = self.state.cooldown.saturating_sub(1);

        let threshold = self.state.baseline * self.params.sensitivity;
        let armed = self.state.cooldown == 0;

        let beat = if armed && energy > threshold && energy > self.params.energy_floor {
            self.state.strength = 1.0;
            self.state.cooldown = self.params.refractory_frames;
            Some(BeatEvent {
                frame_index,
                energy,
                threshold,
            })
        } else {
            None
        };

        self.state.strength *= self.params.strength_decay;
        let decay = self.params.baseline_decay;
        self.state.baseline = self.state.baseline * decay + energy * (1.0 - decay);

        beat
    }

    /// Advance a frame with no audio: cooldown and pulse run down, the
    /// baseline keeps the last heard loudness.
    pub fn tick_idle(&mut self) {
        self.state.cooldown = self.state.cooldown.saturating_sub(1);
        self.state.strength *= self.params.strength_decay;
    }

    /// Current pulse strength in [0, 1]
    pub fn strength(&self) -> f32 {
        self.state.strength.clamp(0.0, 1.0)
    }

    pub fn state(&self) -> &BeatState {
        &self.state
    }

    pub fn params(&self) -> &BeatParams {
        &self.params
    }

    /// Swap tuning without losing the baseline
    pub fn set_params(&mut self, params: BeatParams) {
        self.params = params;
    }

    pub fn reset(&mut self) {
        self.state = BeatState::default();
    }
}
