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
use super::envelope::EnvelopeAdsr;

/// Per-note playback parameters, produced by a soundbank at note-on and copied
/// into the voice that plays the note.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceParameters {
    /// The volume of the note (0.0 to 1.0).
    pub volume: f32,
    /// The stereo position of the note (-1.0 left to 1.0 right).
    pub pan: f32,
    /// Pitch offset as a fraction of the synth's maximum pitch bend (-1.0 to 1.0).
    pub pitch: f32,
    /// Gain derived from the note velocity (0.0 to 1.0).
    pub velocity: f32,
    /// The amplitude envelope.
    pub envelope: EnvelopeAdsr,
}

impl Default for VoiceParameters {
    fn default() -> Self {
        VoiceParameters {
            volume: 1.0,
            pan: 0.0,
            pitch: 0.0,
            velocity: 1.0,
            envelope: EnvelopeAdsr::default(),
        }
    }
}

impl VoiceParameters {
    /// Creates parameters with the given volume and envelope, centered and unbent.
    pub fn new(volume: f32, envelope: EnvelopeAdsr) -> VoiceParameters {
        VoiceParameters {
            volume,
            envelope,
            ..Default::default()
        }
    }

    /// The left and right channel multipliers for the current pan.
    ///
    /// This is a linear law: panning toward one side attenuates only the other
    /// side, and the center passes both channels at full level.
    pub fn pan_multipliers(&self) -> (f32, f32) {
        if self.pan < 0.0 {
            (1.0, 1.0 + self.pan)
        } else {
            (1.0 - self.pan, 1.0)
        }
    }
}
