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
use tracing::debug;

use super::TempoClock;
use crate::synth::{InstrumentId, Synth};

/// The controller number that pans an instrument.
pub const PAN_CONTROLLER: u8 = 10;

/// The center of the 0-127 controller range.
const CONTROLLER_CENTER: f32 = 64.0;

/// A timeline event and the change it makes when applied.
#[derive(Clone, Debug, PartialEq)]
pub enum SequenceEvent {
    /// Starts a note, or releases it when the velocity is zero.
    Note {
        instrument: InstrumentId,
        note: u8,
        velocity: u8,
    },
    /// A controller change. Only the pan controller has an effect.
    ControlChange {
        instrument: InstrumentId,
        controller: u8,
        value: u8,
    },
    /// Bends an instrument's pitch, from -1.0 to 1.0 of the bend range.
    PitchBend {
        instrument: InstrumentId,
        amount: f32,
    },
    /// Switches an instrument's program.
    ProgramChange {
        instrument: InstrumentId,
        program: u32,
    },
    /// Changes the tempo.
    SetTempo { seconds_per_beat: f64 },
}

/// Program changes on `channel` select `program` instead of the requested one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrumRemap {
    pub channel: InstrumentId,
    pub program: u32,
}

impl SequenceEvent {
    /// Applies this event to the synth, or to the clock for tempo changes.
    pub fn apply(&self, synth: &mut Synth, clock: &mut TempoClock, drums: Option<DrumRemap>) {
        match *self {
            SequenceEvent::Note {
                instrument,
                note,
                velocity,
            } => synth.note_on(instrument, note, velocity),
            SequenceEvent::ControlChange {
                instrument,
                controller: PAN_CONTROLLER,
                value,
            } => synth.adjust_pan(instrument, controller_to_pan(value)),
            SequenceEvent::ControlChange {
                instrument,
                controller,
                value,
            } => {
                debug!(instrument, controller, value, "Ignoring controller");
            }
            SequenceEvent::PitchBend { instrument, amount } => {
                synth.pitch_bend(instrument, amount)
            }
            SequenceEvent::ProgramChange {
                instrument,
                program,
            } => {
                let program = match drums {
                    Some(drums) if drums.channel == instrument => drums.program,
                    _ => program,
                };
                synth.use_program(instrument, program);
            }
            SequenceEvent::SetTempo { seconds_per_beat } => {
                debug!(seconds_per_beat, "Tempo change");
                clock.set_seconds_per_beat(seconds_per_beat);
            }
        }
    }
}

/// Scales a 0-127 controller value to a pan position in [-1, 1).
pub fn controller_to_pan(value: u8) -> f32 {
    (f32::from(value) - CONTROLLER_CENTER) / CONTROLLER_CENTER
}
