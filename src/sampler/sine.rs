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
use std::f64::consts::PI;
use std::sync::Arc;

use super::{note_to_frequency, Sampler, WavetableSampler, CONCERT_A_NOTE};

/// Generates one second of a concert A sine wave at the given sample rate.
///
/// A whole number of cycles fits in the table, so it loops without a phase jump.
pub fn sine_wavetable(sample_rate: u32) -> Arc<[i16]> {
    let frequency = note_to_frequency(CONCERT_A_NOTE);
    (0..sample_rate)
        .map(|i| {
            let t = f64::from(i) / f64::from(sample_rate);
            ((2.0 * PI * frequency * t).sin() * f64::from(i16::MAX)) as i16
        })
        .collect()
}

/// A pure sine sampler. Unlike a plain [`WavetableSampler`], resampling regenerates
/// the sine table at the new rate instead of interpolating the old one.
#[derive(Clone, Debug)]
pub struct SineSampler {
    inner: WavetableSampler,
}

impl SineSampler {
    /// Creates a sine sampler playing the given note, generating a fresh table.
    pub fn new(sample_rate: u32, playing_note: u8) -> SineSampler {
        SineSampler::from_shared(sine_wavetable(sample_rate), sample_rate, playing_note)
    }

    /// Creates a sine sampler over a table previously built by [`sine_wavetable`]
    /// for the same sample rate.
    pub fn from_shared(table: Arc<[i16]>, sample_rate: u32, playing_note: u8) -> SineSampler {
        SineSampler {
            inner: WavetableSampler::new(table, sample_rate)
                .with_root_note(CONCERT_A_NOTE)
                .with_playing_note(playing_note),
        }
    }

    /// Gets the underlying wavetable sampler.
    pub fn wavetable(&self) -> &WavetableSampler {
        &self.inner
    }
}

impl Sampler for SineSampler {
    fn sample(&mut self, pitch_bend_semitones: f32) -> (i16, i16) {
        self.inner.sample(pitch_bend_semitones)
    }

    fn resample_to(&mut self, sample_rate_hz: u32) {
        if sample_rate_hz == 0 || sample_rate_hz == self.inner.sample_rate() {
            return;
        }
        self.inner
            .replace_wavetable(sine_wavetable(sample_rate_hz), sample_rate_hz);
    }
}
