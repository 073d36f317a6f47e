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

//! Drives a synth through a tick-indexed timeline, one sample at a time.
//!
//! Ticks are detected with a rate limiter: a tick fires on the first sample at
//! least one tick's duration after the previous firing, and the events applied
//! are those of the tick the current time falls in. When the tick length isn't a
//! whole number of samples, the firing drifts against the tick grid and the odd
//! tick is skipped. Renders depend on this, so it is kept as is.

use std::fmt;
use std::time::Instant;

use tracing::{debug, info};

use crate::synth::{Synth, SynthError};

pub mod event;
pub mod sequence;

pub use event::{DrumRemap, SequenceEvent, PAN_CONTROLLER};
pub use sequence::{EventTimeline, Sequence};

/// Default number of frames rendered per chunk.
pub const DEFAULT_BUFFER_SIZE: usize = 2048;

/// Default program drum channel program changes are remapped to.
pub const DEFAULT_DRUM_PROGRAM: u32 = 128;

/// Default seconds per beat (120 BPM).
pub const DEFAULT_SECONDS_PER_BEAT: f64 = 0.5;

/// Output channels. Rendered audio is interleaved left/right.
pub const CHANNELS: usize = 2;

/// The time of the last processed tick before playback starts. Any value more
/// than a tick before zero makes the first sample fire.
const TICK_SENTINEL: f64 = -1.0;

/// Maps ticks to seconds at the current tempo.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TempoClock {
    seconds_per_beat: f64,
    resolution: u32,
}

impl TempoClock {
    /// Creates a clock at 120 BPM for the given ticks per beat.
    pub fn new(resolution: u32) -> TempoClock {
        TempoClock {
            seconds_per_beat: DEFAULT_SECONDS_PER_BEAT,
            resolution,
        }
    }

    /// Gets the ticks per beat.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Gets the seconds per beat.
    pub fn seconds_per_beat(&self) -> f64 {
        self.seconds_per_beat
    }

    /// Sets the seconds per beat.
    pub fn set_seconds_per_beat(&mut self, seconds_per_beat: f64) {
        self.seconds_per_beat = seconds_per_beat;
    }

    /// Gets the tempo in beats per minute.
    pub fn tempo(&self) -> f64 {
        60.0 / self.seconds_per_beat
    }

    /// Sets the tempo in beats per minute.
    pub fn set_tempo(&mut self, bpm: f64) {
        self.seconds_per_beat = 60.0 / bpm;
    }

    /// Gets the duration of one tick at the current tempo.
    pub fn seconds_per_tick(&self) -> f64 {
        self.seconds_per_beat / f64::from(self.resolution)
    }
}

/// Renders a sequence through a synth.
pub struct Sequencer<Q: Sequence> {
    sequence: Q,
    synth: Synth,
    clock: TempoClock,
    buffer_size: usize,
    last_tick_time: f64,
    drums: Option<DrumRemap>,
}

impl<Q: Sequence> Sequencer<Q> {
    /// Creates a new sequencer at 120 BPM.
    pub fn new(sequence: Q, synth: Synth) -> Sequencer<Q> {
        let clock = TempoClock::new(sequence.resolution());
        Sequencer {
            sequence,
            synth,
            clock,
            buffer_size: DEFAULT_BUFFER_SIZE,
            last_tick_time: TICK_SENTINEL,
            drums: None,
        }
    }

    /// Sets the number of frames per rendered chunk.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Sequencer<Q> {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// Remaps program changes on the given channel to the given program. The
    /// channel also starts out on that program.
    pub fn with_drum_remap(mut self, channel: u32, program: u32) -> Sequencer<Q> {
        self.drums = Some(DrumRemap { channel, program });
        self
    }

    /// Gets the sequence.
    pub fn sequence(&self) -> &Q {
        &self.sequence
    }

    /// Gets the synth.
    pub fn synth(&self) -> &Synth {
        &self.synth
    }

    /// Gets the synth for direct control.
    pub fn synth_mut(&mut self) -> &mut Synth {
        &mut self.synth
    }

    /// Gets the tempo clock.
    pub fn clock(&self) -> &TempoClock {
        &self.clock
    }

    /// Gets the frames per rendered chunk.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Gets the seconds per beat.
    pub fn seconds_per_beat(&self) -> f64 {
        self.clock.seconds_per_beat()
    }

    /// Sets the seconds per beat.
    pub fn set_seconds_per_beat(&mut self, seconds_per_beat: f64) {
        self.clock.set_seconds_per_beat(seconds_per_beat);
    }

    /// Gets the tempo in beats per minute.
    pub fn tempo(&self) -> f64 {
        self.clock.tempo()
    }

    /// Sets the tempo in beats per minute.
    pub fn set_tempo(&mut self, bpm: f64) {
        self.clock.set_tempo(bpm);
    }

    /// Gets the duration of one tick at the current tempo.
    pub fn seconds_per_tick(&self) -> f64 {
        self.clock.seconds_per_tick()
    }

    /// The number of frames a render produces at the current tempo. A sequence
    /// with no finite length renders nothing.
    pub fn total_frames(&self) -> usize {
        let seconds = self.sequence.length_seconds(self.seconds_per_tick());
        if !seconds.is_finite() || seconds <= 0.0 {
            return 0;
        }
        (seconds * f64::from(self.synth.sample_rate())).ceil() as usize
    }

    /// Renders the whole sequence into one interleaved stereo buffer.
    pub fn render(&mut self) -> Result<Vec<i16>, SynthError> {
        let mut output = Vec::with_capacity(self.total_frames() * CHANNELS);
        self.render_chunked(|chunk| {
            output.extend_from_slice(chunk);
            Ok::<(), SynthError>(())
        })?;
        Ok(output)
    }

    /// Renders the whole sequence, handing each completed chunk of interleaved
    /// stereo samples to `on_chunk`. Every chunk holds `buffer_size` frames except
    /// possibly the last. Returns the number of frames rendered.
    pub fn render_chunked<F, E>(&mut self, mut on_chunk: F) -> Result<usize, E>
    where
        F: FnMut(&[i16]) -> Result<(), E>,
        E: From<SynthError>,
    {
        let sample_rate = self.synth.sample_rate();
        let total_frames = self.total_frames();
        info!(
            frames = total_frames,
            sample_rate,
            tempo = self.tempo(),
            buffer_size = self.buffer_size,
            "Rendering sequence"
        );
        let start = Instant::now();

        self.last_tick_time = TICK_SENTINEL;
        if let Some(drums) = self.drums {
            self.synth.use_program(drums.channel, drums.program);
        }

        let mut chunk = Vec::with_capacity(self.buffer_size * CHANNELS);
        for frame in 0..total_frames {
            let time = frame as f64 / f64::from(sample_rate);
            self.process_tick(time);

            let (left, right) = self.synth.sample()?;
            chunk.push(left);
            chunk.push(right);

            if chunk.len() == self.buffer_size * CHANNELS {
                on_chunk(&chunk)?;
                chunk.clear();
            }
        }
        if !chunk.is_empty() {
            on_chunk(&chunk)?;
        }

        info!(
            frames = total_frames,
            elapsed_ms = start.elapsed().as_millis(),
            "Render complete"
        );
        Ok(total_frames)
    }

    /// Applies the events of the current tick if at least a tick has passed since
    /// the last one fired.
    fn process_tick(&mut self, time: f64) {
        let seconds_per_tick = self.clock.seconds_per_tick();
        if time - self.last_tick_time <= seconds_per_tick {
            return;
        }

        let tick = (time / seconds_per_tick).floor() as u64;
        let events = self.sequence.events_at_tick(tick);
        if !events.is_empty() {
            debug!(tick, time, events = events.len(), "Applying events");
        }
        for event in events {
            event.apply(&mut self.synth, &mut self.clock, self.drums);
        }
        self.last_tick_time = time;
    }
}

impl<Q: Sequence> fmt::Debug for Sequencer<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequencer")
            .field("synth", &self.synth)
            .field("clock", &self.clock)
            .field("buffer_size", &self.buffer_size)
            .field("drums", &self.drums)
            .finish()
    }
}
