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

//! Shared helpers for tests: deterministic samplers and soundbanks, and a small
//! standard MIDI file builder.

use std::sync::{Arc, Mutex};

use crate::sampler::Sampler;
use crate::soundbank::Soundbank;
use crate::synth::envelope::EnvelopeAdsr;
use crate::synth::params::VoiceParameters;

/// A sampler that always outputs the same level and records the pitch bends it
/// was asked for.
pub struct ConstantSampler {
    level: i16,
    bends: Arc<Mutex<Vec<f32>>>,
}

impl ConstantSampler {
    pub fn new(level: i16) -> ConstantSampler {
        ConstantSampler {
            level,
            bends: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A handle to the recorded pitch bends.
    pub fn bends(&self) -> Arc<Mutex<Vec<f32>>> {
        self.bends.clone()
    }
}

impl Sampler for ConstantSampler {
    fn sample(&mut self, pitch_bend_semitones: f32) -> (i16, i16) {
        if let Ok(mut bends) = self.bends.lock() {
            bends.push(pitch_bend_semitones);
        }
        (self.level, self.level)
    }

    fn resample_to(&mut self, _sample_rate_hz: u32) {}
}

/// A note request seen by a [`ConstantBank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteRequest {
    pub program: u32,
    pub note: u8,
    pub velocity: u8,
}

/// A soundbank handing out constant samplers, with a fixed envelope and volume.
/// Programs listed in `declined` produce no sampler.
pub struct ConstantBank {
    pub level: i16,
    pub volume: f32,
    pub envelope: EnvelopeAdsr,
    pub declined: Vec<u32>,
    pub requests: Arc<Mutex<Vec<NoteRequest>>>,
    pub sample_rate: Arc<Mutex<Option<u32>>>,
}

impl ConstantBank {
    pub fn new(level: i16, envelope: EnvelopeAdsr) -> ConstantBank {
        ConstantBank {
            level,
            volume: 1.0,
            envelope,
            declined: Vec::new(),
            requests: Arc::new(Mutex::new(Vec::new())),
            sample_rate: Arc::new(Mutex::new(None)),
        }
    }

    /// Makes the bank decline the given program.
    pub fn declining(mut self, program: u32) -> ConstantBank {
        self.declined.push(program);
        self
    }

    /// Returns every request made so far.
    pub fn requests(&self) -> Arc<Mutex<Vec<NoteRequest>>> {
        self.requests.clone()
    }
}

impl Soundbank for ConstantBank {
    fn sampler_for(
        &self,
        program: u32,
        note: u8,
        velocity: u8,
    ) -> Option<(Box<dyn Sampler>, VoiceParameters)> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(NoteRequest {
                program,
                note,
                velocity,
            });
        }

        if self.declined.contains(&program) {
            return None;
        }

        Some((
            Box::new(ConstantSampler::new(self.level)),
            VoiceParameters::new(self.volume, self.envelope),
        ))
    }

    fn set_sample_rate(&mut self, sample_rate_hz: u32) {
        if let Ok(mut sample_rate) = self.sample_rate.lock() {
            *sample_rate = Some(sample_rate_hz);
        }
    }
}

/// Encodes a variable-length quantity as used by standard MIDI files.
fn write_vlq(out: &mut Vec<u8>, mut value: u32) {
    let mut bytes = vec![(value & 0x7f) as u8];
    value >>= 7;
    while value > 0 {
        bytes.push(((value & 0x7f) as u8) | 0x80);
        value >>= 7;
    }
    bytes.reverse();
    out.extend_from_slice(&bytes);
}

/// Builds the bytes of a standard MIDI file. Each track is a list of
/// (delta ticks, raw event bytes); end-of-track markers are added automatically.
pub fn smf_bytes(format: u16, ticks_per_beat: u16, tracks: &[Vec<(u32, Vec<u8>)>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"MThd");
    out.extend_from_slice(&6u32.to_be_bytes());
    out.extend_from_slice(&format.to_be_bytes());
    out.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
    out.extend_from_slice(&ticks_per_beat.to_be_bytes());

    for track in tracks {
        let mut body = Vec::new();
        for (delta, event) in track {
            write_vlq(&mut body, *delta);
            body.extend_from_slice(event);
        }
        write_vlq(&mut body, 0);
        body.extend_from_slice(&[0xff, 0x2f, 0x00]);

        out.extend_from_slice(b"MTrk");
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(&body);
    }

    out
}

/// Raw bytes for a tempo meta event.
pub fn tempo_event(micros_per_beat: u32) -> Vec<u8> {
    let bytes = micros_per_beat.to_be_bytes();
    vec![0xff, 0x51, 0x03, bytes[1], bytes[2], bytes[3]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vlq_encoding() {
        let mut out = Vec::new();
        write_vlq(&mut out, 0);
        write_vlq(&mut out, 0x7f);
        write_vlq(&mut out, 0x80);
        write_vlq(&mut out, 0x3fff);
        assert_eq!(out, vec![0x00, 0x7f, 0x81, 0x00, 0xff, 0x7f]);
    }
}
