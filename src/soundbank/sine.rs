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
use std::sync::Arc;

use tracing::debug;

use super::Soundbank;
use crate::sampler::sine::sine_wavetable;
use crate::sampler::{Sampler, SineSampler};
use crate::synth::{EnvelopeAdsr, VoiceParameters, DEFAULT_SAMPLE_RATE};

const SINE_VOLUME: f32 = 0.7;
const SINE_ATTACK: f32 = 0.5;
const SINE_DECAY: f32 = 1.0;
const SINE_SUSTAIN: f32 = 0.75;
const SINE_RELEASE: f32 = 1.0;

/// A soundbank that plays a sine wave for every program and note.
///
/// The sine table is generated once per sample rate and shared by every voice.
#[derive(Clone, Debug)]
pub struct SineBank {
    sample_rate: u32,
    table: Arc<[i16]>,
    params: VoiceParameters,
}

impl Default for SineBank {
    fn default() -> Self {
        SineBank::new()
    }
}

impl SineBank {
    /// Creates a sine bank with a slow attack and a long release.
    pub fn new() -> SineBank {
        SineBank {
            sample_rate: DEFAULT_SAMPLE_RATE,
            table: sine_wavetable(DEFAULT_SAMPLE_RATE),
            params: VoiceParameters::new(
                SINE_VOLUME,
                EnvelopeAdsr::new(SINE_ATTACK, SINE_DECAY, SINE_SUSTAIN, SINE_RELEASE),
            ),
        }
    }

    /// Replaces the voice parameters every note starts with.
    pub fn with_parameters(mut self, params: VoiceParameters) -> SineBank {
        self.params = params;
        self
    }

    /// Gets the voice parameters every note starts with.
    pub fn parameters(&self) -> &VoiceParameters {
        &self.params
    }
}

impl Soundbank for SineBank {
    fn sampler_for(
        &self,
        _program: u32,
        note: u8,
        _velocity: u8,
    ) -> Option<(Box<dyn Sampler>, VoiceParameters)> {
        Some((
            Box::new(SineSampler::from_shared(
                self.table.clone(),
                self.sample_rate,
                note,
            )),
            self.params,
        ))
    }

    fn set_sample_rate(&mut self, sample_rate_hz: u32) {
        if sample_rate_hz == 0 || sample_rate_hz == self.sample_rate {
            return;
        }
        debug!(sample_rate = sample_rate_hz, "Regenerating sine table");
        self.sample_rate = sample_rate_hz;
        self.table = sine_wavetable(sample_rate_hz);
    }
}
