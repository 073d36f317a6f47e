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

//! Wavetable samplers.
//!
//! A sampler turns a stored waveform into a stream of PCM samples at an arbitrary
//! pitch. Samplers are stateful: every call to [`Sampler::sample`] advances the
//! sampler's phase accumulator.

pub mod sine;
pub mod wavetable;

pub use sine::SineSampler;
pub use wavetable::WavetableSampler;

/// The MIDI note used as the tuning reference (A4).
pub const CONCERT_A_NOTE: u8 = 69;

/// The frequency of the tuning reference in Hz.
pub const CONCERT_A_HZ: f64 = 440.0;

/// A source of stereo PCM samples played at a requested pitch.
pub trait Sampler: Send {
    /// Produces the next stereo sample pair, bending the playing note by the given
    /// number of semitones (positive or negative).
    fn sample(&mut self, pitch_bend_semitones: f32) -> (i16, i16);

    /// Converts the underlying waveform to the given sample rate. Intended to be
    /// called once before a note starts sounding; playback phase is not reset.
    fn resample_to(&mut self, sample_rate_hz: u32);
}

/// Blanket implementation so boxed samplers can be used wherever a sampler is expected.
impl Sampler for Box<dyn Sampler> {
    fn sample(&mut self, pitch_bend_semitones: f32) -> (i16, i16) {
        (**self).sample(pitch_bend_semitones)
    }

    fn resample_to(&mut self, sample_rate_hz: u32) {
        (**self).resample_to(sample_rate_hz)
    }
}

/// Converts a MIDI note number to its frequency in Hz (equal temperament, A4 = 440Hz).
pub fn note_to_frequency(note: u8) -> f64 {
    CONCERT_A_HZ * 2f64.powf((f64::from(note) - f64::from(CONCERT_A_NOTE)) / 12.0)
}

/// Converts a frequency in Hz to the nearest MIDI note number, saturating at the
/// ends of the MIDI range.
pub fn frequency_to_note(frequency: f64) -> u8 {
    if frequency <= 0.0 || !frequency.is_finite() {
        return 0;
    }

    let note = (f64::from(CONCERT_A_NOTE) + 12.0 * (frequency / CONCERT_A_HZ).log2()).round();
    note.clamp(0.0, 127.0) as u8
}

/// Converts a MIDI velocity (0-127) to a linear gain in [0, 1].
pub fn velocity_to_gain(velocity: u8) -> f32 {
    (f32::from(velocity) / 127.0).clamp(0.0, 1.0)
}
