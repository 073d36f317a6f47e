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

//! The polyphonic synth.
//!
//! This module provides:
//! - A fixed-size voice pool, allocated once and reused across notes
//! - A per-instrument registry of program, pitch bend and pan
//! - The note control surface (note on/off, pitch bend, pan, program change)
//! - Mixing of all active voices with a soft clipper

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::sampler::velocity_to_gain;
use crate::soundbank::Soundbank;

pub mod envelope;
pub mod error;
pub mod params;
pub mod voice;

#[cfg(test)]
mod tests;

pub use envelope::EnvelopeAdsr;
pub use error::SynthError;
pub use params::VoiceParameters;
pub use voice::{Voice, VoiceContext, VoiceState};

/// Default output sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Default size of the voice pool.
pub const DEFAULT_MAX_VOICES: usize = 28;

/// Default pitch bend range in semitones.
pub const DEFAULT_MAX_PITCH_BEND_SEMITONES: f32 = 2.0;

/// Attenuation applied to the mix before soft clipping.
const MIX_ATTENUATION: f64 = 0.5;

/// Identifies an instrument. Equivalent to a MIDI channel, but unbounded.
pub type InstrumentId = u32;

/// The live state of one instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentData {
    /// The soundbank program the instrument plays.
    pub program: u32,
    /// Current pitch bend (-1.0 to 1.0, fraction of the maximum bend).
    pub pitch: f32,
    /// Current pan (-1.0 left to 1.0 right).
    pub pan: f32,
}

impl InstrumentData {
    /// Defaults for an instrument seen for the first time: its program is its own
    /// ID, so unknown instruments still make a sound.
    fn for_id(id: InstrumentId) -> InstrumentData {
        InstrumentData {
            program: id,
            pitch: 0.0,
            pan: 0.0,
        }
    }
}

/// A polyphonic synth rendering one stereo sample at a time.
pub struct Synth {
    /// The soundbank providing samplers for notes.
    soundbank: Box<dyn Soundbank>,
    /// The output sample rate.
    sample_rate: u32,
    /// The pitch bend range in semitones.
    max_pitch_bend: f32,
    /// The voice pool. Its size never changes.
    voices: Vec<Voice>,
    /// Instrument state by instrument ID, created on first use.
    instruments: HashMap<InstrumentId, InstrumentData>,
    /// Voice pool slots currently sounding each (instrument, note).
    active: HashMap<(InstrumentId, u8), usize>,
}

impl Synth {
    /// Creates a new synth. The soundbank is told the sample rate before any note
    /// is requested from it.
    pub fn new(mut soundbank: Box<dyn Soundbank>, sample_rate: u32, max_voices: usize) -> Synth {
        soundbank.set_sample_rate(sample_rate);

        Synth {
            soundbank,
            sample_rate,
            max_pitch_bend: DEFAULT_MAX_PITCH_BEND_SEMITONES,
            voices: (0..max_voices).map(|_| Voice::new()).collect(),
            instruments: HashMap::new(),
            active: HashMap::new(),
        }
    }

    /// Sets the pitch bend range in semitones.
    pub fn with_max_pitch_bend(mut self, semitones: f32) -> Synth {
        self.max_pitch_bend = semitones;
        self
    }

    /// Gets the output sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Gets the seconds represented by one sample.
    pub fn time_step(&self) -> f64 {
        1.0 / f64::from(self.sample_rate)
    }

    /// Gets the size of the voice pool.
    pub fn max_voices(&self) -> usize {
        self.voices.len()
    }

    /// Gets the pitch bend range in semitones.
    pub fn max_pitch_bend(&self) -> f32 {
        self.max_pitch_bend
    }

    /// Sets the pitch bend range in semitones.
    pub fn set_max_pitch_bend(&mut self, semitones: f32) {
        self.max_pitch_bend = semitones;
    }

    /// Gets the number of notes currently sounding.
    pub fn active_voices(&self) -> usize {
        self.active.len()
    }

    /// Returns true if the given note is sounding on the given instrument.
    pub fn is_sounding(&self, id: InstrumentId, note: u8) -> bool {
        self.active.contains_key(&(id, note))
    }

    /// Gets the pool slot sounding the given note, if any.
    pub fn voice_slot(&self, id: InstrumentId, note: u8) -> Option<usize> {
        self.active.get(&(id, note)).copied()
    }

    /// Gets the voice pool.
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Gets the state of an instrument, if it has been used.
    pub fn instrument(&self, id: InstrumentId) -> Option<&InstrumentData> {
        self.instruments.get(&id)
    }

    /// Switches an instrument to a different soundbank program.
    pub fn use_program(&mut self, id: InstrumentId, program: u32) {
        self.ensure_instrument(id).program = program;
    }

    /// Bends the pitch of an instrument. Applies to future notes and to every note
    /// the instrument is already playing.
    pub fn pitch_bend(&mut self, id: InstrumentId, pitch: f32) {
        self.ensure_instrument(id).pitch = pitch;
        for (&(instrument, _), &slot) in self.active.iter() {
            if instrument == id {
                self.voices[slot].set_pitch(pitch);
            }
        }
    }

    /// Pans an instrument. Applies to future notes and to every note the
    /// instrument is already playing.
    pub fn adjust_pan(&mut self, id: InstrumentId, pan: f32) {
        self.ensure_instrument(id).pan = pan;
        for (&(instrument, _), &slot) in self.active.iter() {
            if instrument == id {
                self.voices[slot].set_pan(pan);
            }
        }
    }

    /// Starts a note. A velocity of zero releases the note instead.
    ///
    /// Notes are dropped without error if the soundbank has nothing to play for
    /// them or if every voice is busy. Playing a note that is already sounding
    /// restarts it on the same voice.
    pub fn note_on(&mut self, id: InstrumentId, note: u8, velocity: u8) {
        if velocity == 0 {
            self.note_off(id, note);
            return;
        }

        let instrument = *self.ensure_instrument(id);
        let (sampler, mut params) =
            match self
                .soundbank
                .sampler_for(instrument.program, note, velocity)
            {
                Some(found) => found,
                None => {
                    debug!(
                        id,
                        note,
                        program = instrument.program,
                        "Soundbank declined note"
                    );
                    return;
                }
            };
        params.velocity = velocity_to_gain(velocity);
        params.pitch = instrument.pitch;
        params.pan = instrument.pan;

        if let Some(&slot) = self.active.get(&(id, note)) {
            self.voices[slot].note_on(sampler, params);
            return;
        }

        let Some(slot) = self.voices.iter().position(|voice| !voice.is_active()) else {
            debug!(
                id,
                note,
                max_voices = self.voices.len(),
                "No free voice, dropping note"
            );
            return;
        };

        self.voices[slot].note_on(sampler, params);
        self.active.insert((id, note), slot);
    }

    /// Releases a note. Notes that aren't sounding are ignored.
    pub fn note_off(&mut self, id: InstrumentId, note: u8) {
        if let Some(&slot) = self.active.get(&(id, note)) {
            self.voices[slot].note_off();
        }
    }

    /// Renders one stereo sample by mixing every active voice, then frees the
    /// voices whose envelopes completed.
    pub fn sample(&mut self) -> Result<(i16, i16), SynthError> {
        if self.active.is_empty() {
            return Ok((0, 0));
        }

        let ctx = VoiceContext::new(self.sample_rate, self.max_pitch_bend);
        let mut mixed_left: i32 = 0;
        let mut mixed_right: i32 = 0;
        for &slot in self.active.values() {
            let (left, right) = self.voices[slot].sample(&ctx)?;
            mixed_left += i32::from(left);
            mixed_right += i32::from(right);
        }

        let voices = &self.voices;
        self.active.retain(|_, slot| voices[*slot].is_active());

        Ok((soft_clip(mixed_left), soft_clip(mixed_right)))
    }

    fn ensure_instrument(&mut self, id: InstrumentId) -> &mut InstrumentData {
        self.instruments
            .entry(id)
            .or_insert_with(|| InstrumentData::for_id(id))
    }
}

/// Attenuates a mixed sample and limits it with tanh into the 16-bit range.
pub fn soft_clip(mixed: i32) -> i16 {
    let normalized = f64::from(mixed) / 32768.0;
    let clipped = (normalized * MIX_ATTENUATION).tanh().clamp(-1.0, 1.0);
    (clipped * f64::from(i16::MAX)) as i16
}

impl fmt::Debug for Synth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synth")
            .field("sample_rate", &self.sample_rate)
            .field("max_voices", &self.voices.len())
            .field("active_voices", &self.active.len())
            .field("instruments", &self.instruments.len())
            .finish()
    }
}
