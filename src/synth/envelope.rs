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

//! Linear ADSR amplitude envelope.
//!
//! The envelope is evaluated as a pure function of the time elapsed since the
//! note was last triggered (or released), so a voice only has to count samples.

use std::time::Duration;

/// Attack, decay, sustain and release settings for a note.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeAdsr {
    /// Seconds to ramp from silence to full level.
    pub attack: f32,
    /// Seconds to ramp from full level down to the sustain level.
    pub decay: f32,
    /// Level held while the note is down (0.0 to 1.0).
    pub sustain: f32,
    /// Seconds to ramp from the sustain level to silence after release.
    pub release: f32,
}

impl Default for EnvelopeAdsr {
    /// Instant attack, full sustain, instant release.
    fn default() -> Self {
        EnvelopeAdsr {
            attack: 0.0,
            decay: 0.0,
            sustain: 1.0,
            release: 0.0,
        }
    }
}

impl EnvelopeAdsr {
    /// Creates a new envelope from stage times in seconds and a sustain level.
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> EnvelopeAdsr {
        EnvelopeAdsr {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Creates a new envelope from stage durations.
    pub fn from_durations(
        attack: Duration,
        decay: Duration,
        sustain: f32,
        release: Duration,
    ) -> EnvelopeAdsr {
        EnvelopeAdsr::new(
            attack.as_secs_f32(),
            decay.as_secs_f32(),
            sustain,
            release.as_secs_f32(),
        )
    }

    /// The envelope gain, clamped to [0, 1], `elapsed` seconds after the last
    /// trigger (or, when `released`, after the release).
    ///
    /// Zero-length stages are skipped: each stage is only entered while `elapsed`
    /// is strictly inside it, so no stage ever divides by its own zero length.
    pub fn gain(&self, elapsed: f64, released: bool) -> f64 {
        let attack = f64::from(self.attack);
        let decay = f64::from(self.decay);
        let sustain = f64::from(self.sustain);
        let release = f64::from(self.release);

        let gain = if !released {
            if elapsed < attack {
                elapsed / attack
            } else if elapsed < attack + decay {
                let into_decay = elapsed - attack;
                sustain + (1.0 - sustain) * (1.0 - into_decay / decay)
            } else {
                sustain
            }
        } else if elapsed < release {
            sustain * (1.0 - elapsed / release)
        } else {
            0.0
        };

        gain.clamp(0.0, 1.0)
    }

    /// Returns true once a released note has run through its whole release stage.
    pub fn is_complete(&self, elapsed: f64, released: bool) -> bool {
        released && elapsed >= f64::from(self.release)
    }
}
