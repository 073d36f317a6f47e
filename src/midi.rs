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

//! Standard MIDI files as sequences.
//!
//! Channels become instrument IDs. Tracks are merged by absolute tick; at the
//! same tick, events keep track order and then their order within the track.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use tracing::{debug, info};

use crate::sequencer::{EventTimeline, Sequence, SequenceEvent, DEFAULT_SECONDS_PER_BEAT};

/// The center of the 14-bit pitch bend range.
const PITCH_BEND_CENTER: f32 = 8192.0;

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Error types for MIDI file loading.
#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("Unable to read MIDI file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse MIDI file: {0}")]
    Parse(#[from] midly::Error),

    #[error("Unsupported MIDI timing: SMPTE timecode")]
    UnsupportedTiming,

    #[error("MIDI file has zero ticks per beat")]
    ZeroResolution,
}

/// A sequence read from a standard MIDI file.
#[derive(Clone, Debug)]
pub struct MidiSequence {
    timeline: EventTimeline,
    /// (tick, seconds per beat) for every tempo change, in tick order.
    tempo_changes: Vec<(u64, f64)>,
    /// The tick of the last event of any kind, including end of track markers.
    end_tick: u64,
    track_count: usize,
}

impl MidiSequence {
    /// Reads a MIDI file.
    pub fn load(path: &Path) -> Result<MidiSequence, MidiError> {
        let buf = fs::read(path).map_err(|source| MidiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let sequence = MidiSequence::parse(&buf)?;
        info!(
            path = ?path,
            resolution = sequence.resolution(),
            tracks = sequence.track_count,
            events = sequence.event_count(),
            duration_ms = sequence.duration().as_millis(),
            "MIDI file loaded"
        );
        Ok(sequence)
    }

    /// Parses the bytes of a MIDI file.
    pub fn parse(bytes: &[u8]) -> Result<MidiSequence, MidiError> {
        MidiSequence::from_smf(&Smf::parse(bytes)?)
    }

    /// Converts a parsed MIDI file.
    pub fn from_smf(smf: &Smf) -> Result<MidiSequence, MidiError> {
        let resolution = match smf.header.timing {
            Timing::Metrical(ticks_per_beat) => u32::from(ticks_per_beat.as_int()),
            Timing::Timecode(_, _) => return Err(MidiError::UnsupportedTiming),
        };
        if resolution == 0 {
            return Err(MidiError::ZeroResolution);
        }

        let mut timeline = EventTimeline::new(resolution);
        let mut tempo_changes = Vec::new();
        let mut end_tick = 0;
        let mut ignored = 0usize;

        for track in &smf.tracks {
            let mut tick: u64 = 0;
            for event in track {
                tick += u64::from(event.delta.as_int());
                end_tick = end_tick.max(tick);

                match convert(event.kind) {
                    Some(converted) => {
                        if let SequenceEvent::SetTempo { seconds_per_beat } = converted {
                            tempo_changes.push((tick, seconds_per_beat));
                        }
                        timeline.push(tick, converted);
                    }
                    None => ignored += 1,
                }
            }
        }
        // Stable, so changes at the same tick stay in track order.
        tempo_changes.sort_by_key(|&(tick, _)| tick);

        debug!(ignored, "Skipped MIDI events with no synth counterpart");
        Ok(MidiSequence {
            timeline,
            tempo_changes,
            end_tick,
            track_count: smf.tracks.len(),
        })
    }

    /// Gets the number of tracks in the file.
    pub fn track_count(&self) -> usize {
        self.track_count
    }

    /// Gets the number of events the synth will see.
    pub fn event_count(&self) -> usize {
        self.timeline.len()
    }

    /// Gets the tick of the last event in the file.
    pub fn end_tick(&self) -> u64 {
        self.end_tick
    }

    /// Gets the tempo changes as (tick, seconds per beat).
    pub fn tempo_changes(&self) -> &[(u64, f64)] {
        &self.tempo_changes
    }

    /// The time at which the given tick starts at 120 BPM, following the file's
    /// tempo changes.
    pub fn seconds_at(&self, tick: u64) -> f64 {
        self.seconds_at_from(tick, DEFAULT_SECONDS_PER_BEAT)
    }

    /// The time at which the given tick starts when playback begins at the given
    /// tempo, following the file's tempo changes.
    pub fn seconds_at_from(&self, tick: u64, initial_seconds_per_beat: f64) -> f64 {
        let resolution = f64::from(self.timeline.resolution());
        let mut seconds = 0.0;
        let mut last_tick = 0;
        let mut seconds_per_beat = initial_seconds_per_beat;

        for &(change_tick, change_seconds_per_beat) in &self.tempo_changes {
            if change_tick >= tick {
                break;
            }
            seconds += (change_tick - last_tick) as f64 * seconds_per_beat / resolution;
            last_tick = change_tick;
            seconds_per_beat = change_seconds_per_beat;
        }

        seconds + (tick - last_tick) as f64 * seconds_per_beat / resolution
    }

    /// The play time of the whole file at 120 BPM.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.seconds_at(self.end_tick))
    }
}

impl Sequence for MidiSequence {
    fn resolution(&self) -> u32 {
        self.timeline.resolution()
    }

    /// The tick duration sets the starting tempo. The file's own tempo changes
    /// take over from there.
    fn length_seconds(&self, seconds_per_tick: f64) -> f64 {
        let resolution = f64::from(self.timeline.resolution());
        self.seconds_at_from(self.end_tick, seconds_per_tick * resolution)
    }

    fn events_at_tick(&self, tick: u64) -> &[SequenceEvent] {
        self.timeline.events_at_tick(tick)
    }
}

/// Converts a track event into a sequence event, if the synth has a use for it.
fn convert(kind: TrackEventKind) -> Option<SequenceEvent> {
    match kind {
        TrackEventKind::Midi { channel, message } => {
            let instrument = u32::from(channel.as_int());
            match message {
                MidiMessage::NoteOn { key, vel } => Some(SequenceEvent::Note {
                    instrument,
                    note: key.as_int(),
                    velocity: vel.as_int(),
                }),
                MidiMessage::NoteOff { key, .. } => Some(SequenceEvent::Note {
                    instrument,
                    note: key.as_int(),
                    velocity: 0,
                }),
                MidiMessage::Controller { controller, value } => {
                    Some(SequenceEvent::ControlChange {
                        instrument,
                        controller: controller.as_int(),
                        value: value.as_int(),
                    })
                }
                MidiMessage::PitchBend { bend } => Some(SequenceEvent::PitchBend {
                    instrument,
                    amount: (f32::from(bend.0.as_int()) - PITCH_BEND_CENTER) / PITCH_BEND_CENTER,
                }),
                MidiMessage::ProgramChange { program } => Some(SequenceEvent::ProgramChange {
                    instrument,
                    program: u32::from(program.as_int()),
                }),
                _ => None,
            }
        }
        TrackEventKind::Meta(MetaMessage::Tempo(micros_per_beat)) => {
            Some(SequenceEvent::SetTempo {
                seconds_per_beat: f64::from(micros_per_beat.as_int()) / MICROS_PER_SECOND,
            })
        }
        _ => None,
    }
}
