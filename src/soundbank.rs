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

//! Soundbanks supply the synth with a sampler and voice parameters for each note.
//!
//! This module provides:
//! - The [`Soundbank`] trait the synth plays through
//! - [`SineBank`], a sine wave for every program and note
//! - [`SampleKit`], programs built from WAV samples described by a kit config

use crate::sampler::Sampler;
use crate::synth::VoiceParameters;

pub mod error;
pub mod kit;
pub mod loader;
pub mod sine;

pub use error::SoundbankError;
pub use kit::SampleKit;
pub use loader::{LoadedWavetable, WavetableLoader};
pub use sine::SineBank;

/// A source of playable notes.
pub trait Soundbank: Send {
    /// Gets a sampler and the starting voice parameters for a note. Returns `None`
    /// when the bank has nothing to play for this program, note and velocity; the
    /// note is then dropped.
    fn sampler_for(
        &self,
        program: u32,
        note: u8,
        velocity: u8,
    ) -> Option<(Box<dyn Sampler>, VoiceParameters)>;

    /// Tells the bank the rate it will be rendered at. Called once, before any
    /// note is requested.
    fn set_sample_rate(&mut self, sample_rate_hz: u32);
}
