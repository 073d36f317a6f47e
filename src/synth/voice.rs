// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! A single voice: the signal chain for one sounding note.
//!
//! Handles the idle/sounding/releasing lifecycle and applies, in order, pitch
//! bend, the amplitude envelope, pan and gain to the samples of its sampler.

use std::fmt;

use super::error::SynthError;
use super::params::VoiceParameters;
use crate::sampler::Sampler;

/// Lifecycle state of a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    /// No sampler bound, available for allocation.
    Idle,
    /// Playing, key still held.
    Sounding,
    /// Key released, envelope in its release stage.
    Releasing,
}

/// Synth-wide settings a voice needs while rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceContext {
    /// Seconds per rendered sample.
    pub time_step: f64,
    /// Semitones of bend at a pitch offset of 1.0.
    pub max_pitch_bend: f32,
}

impl VoiceContext {
    /// Creates a context for the given sample rate and pitch bend range.
    pub fn new(sample_rate: u32, max_pitch_bend: f32) -> VoiceContext {
        VoiceContext {
            time_step: 1.0 / f64::from(sample_rate),
            max_pitch_bend,
        }
    }
}

/// One slot in the synth's voice pool.
///
/// A voice is active exactly while it holds a sampler. It gives the sampler up
/// when its release stage completes, which is the only way it becomes free again.
pub struct Voice {
    /// The sampler producing raw samples, if a note is bound.
    sampler: Option<Box<dyn Sampler>>,
    /// The parameters of the bound note.
    params: VoiceParameters,
    /// Overall gain of this voice.
    volume: f32,
    /// Samples rendered since the last trigger or release.
    samples_since_trigger: u64,
    /// Whether the bound note has been released.
    released: bool,
    /// The velocity gain the note was first played with.
    velocity: f32,
}

impl Default for Voice {
    fn default() -> Self {
        Voice::new()
    }
}

impl Voice {
    /// Creates a new idle voice.
    pub fn new() -> Voice {
        Voice {
            sampler: None,
            params: VoiceParameters::default(),
            volume: 1.0,
            samples_since_trigger: 0,
            released: false,
            velocity: 1.0,
        }
    }

    /// Starts (or restarts) playing a note with the given sampler and parameters.
    pub fn note_on(&mut self, sampler: Box<dyn Sampler>, params: VoiceParameters) {
        self.sampler = Some(sampler);
        self.params = params;
        self.velocity = params.velocity;
        self.samples_since_trigger = 0;
        self.released = false;
    }

    /// Releases the note. Release timing is measured from this call.
    pub fn note_off(&mut self) {
        self.released = true;
        self.samples_since_trigger = 0;
    }

    /// Renders the next stereo sample of this voice.
    ///
    /// Sampling an idle voice is a bookkeeping bug and fails with
    /// [`SynthError::InvalidState`].
    pub fn sample(&mut self, ctx: &VoiceContext) -> Result<(i16, i16), SynthError> {
        let sampler = self
            .sampler
            .as_mut()
            .ok_or(SynthError::InvalidState("cannot sample an idle voice"))?;

        let raw = sampler.sample(self.params.pitch * ctx.max_pitch_bend);
        let enveloped = self.apply_envelope(raw, ctx.time_step);
        let panned = self.apply_pan(enveloped);
        let output = self.apply_volume(panned);

        self.samples_since_trigger += 1;
        Ok(output)
    }

    /// Returns true if a note is bound to this voice.
    pub fn is_active(&self) -> bool {
        self.sampler.is_some()
    }

    /// Gets the lifecycle state of this voice.
    pub fn state(&self) -> VoiceState {
        match (self.sampler.is_some(), self.released) {
            (false, _) => VoiceState::Idle,
            (true, false) => VoiceState::Sounding,
            (true, true) => VoiceState::Releasing,
        }
    }

    /// Gets the parameters of the bound note.
    pub fn params(&self) -> &VoiceParameters {
        &self.params
    }

    /// Updates the pitch offset of the bound note.
    pub fn set_pitch(&mut self, pitch: f32) {
        self.params.pitch = pitch;
    }

    /// Updates the pan of the bound note.
    pub fn set_pan(&mut self, pan: f32) {
        self.params.pan = pan;
    }

    /// Gets the overall gain of this voice.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Sets the overall gain of this voice.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    /// Gets the number of samples rendered since the last trigger or release.
    pub fn samples_since_trigger(&self) -> u64 {
        self.samples_since_trigger
    }

    fn apply_envelope(&mut self, (left, right): (i16, i16), time_step: f64) -> (i16, i16) {
        let elapsed = self.samples_since_trigger as f64 * time_step;
        let envelope = self.params.envelope;
        let gain = envelope.gain(elapsed, self.released);

        if envelope.is_complete(elapsed, self.released) {
            // Fully released: give up the sampler so the synth can reclaim this slot.
            self.sampler = None;
            self.samples_since_trigger = 0;
        }

        (scale(left, gain), scale(right, gain))
    }

    fn apply_pan(&self, (left, right): (i16, i16)) -> (i16, i16) {
        let (left_gain, right_gain) = self.params.pan_multipliers();
        (
            scale(left, f64::from(left_gain)),
            scale(right, f64::from(right_gain)),
        )
    }

    fn apply_volume(&self, (left, right): (i16, i16)) -> (i16, i16) {
        let gain = self.volume * self.velocity * self.params.volume;
        (scale(left, f64::from(gain)), scale(right, f64::from(gain)))
    }
}

/// Scales a sample, truncating toward zero and saturating at the 16-bit range.
fn scale(sample: i16, gain: f64) -> i16 {
    (f64::from(sample) * gain) as i16
}

impl fmt::Debug for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Voice")
            .field("state", &self.state())
            .field("params", &self.params)
            .field("samples_since_trigger", &self.samples_since_trigger)
            .finish()
    }
}
