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

//! An offline polyphonic wavetable synthesizer.
//!
//! A [`sequencer::Sequencer`] walks a tick-indexed [`sequencer::Sequence`] and
//! drives a [`synth::Synth`], which plays notes from a [`soundbank::Soundbank`]
//! through a fixed pool of voices and mixes them into 16-bit stereo.

pub mod config;
pub mod midi;
pub mod sampler;
pub mod sequencer;
pub mod soundbank;
pub mod synth;
pub mod wav;

#[cfg(test)]
mod testutil;
