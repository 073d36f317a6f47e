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
use std::collections::BTreeMap;

use super::event::SequenceEvent;

/// A tick-indexed timeline of events.
pub trait Sequence {
    /// Ticks per beat.
    fn resolution(&self) -> u32;

    /// The length of the timeline in seconds, given the duration of a tick.
    fn length_seconds(&self, seconds_per_tick: f64) -> f64;

    /// The events due at a tick, in the order they must be applied.
    fn events_at_tick(&self, tick: u64) -> &[SequenceEvent];
}

/// An in-memory sequence built up event by event.
#[derive(Clone, Debug, Default)]
pub struct EventTimeline {
    resolution: u32,
    events: BTreeMap<u64, Vec<SequenceEvent>>,
}

impl EventTimeline {
    /// Creates an empty timeline with the given ticks per beat. A resolution of
    /// zero has no tick length and is raised to one tick per beat.
    pub fn new(resolution: u32) -> EventTimeline {
        EventTimeline {
            resolution: resolution.max(1),
            events: BTreeMap::new(),
        }
    }

    /// Adds an event at a tick, after any events already at that tick.
    pub fn push(&mut self, tick: u64, event: SequenceEvent) {
        self.events.entry(tick).or_default().push(event);
    }

    /// Builder form of [`EventTimeline::push`].
    pub fn with_event(mut self, tick: u64, event: SequenceEvent) -> EventTimeline {
        self.push(tick, event);
        self
    }

    /// The last tick holding an event.
    pub fn last_tick(&self) -> Option<u64> {
        self.events.keys().next_back().copied()
    }

    /// The total number of events.
    pub fn len(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    /// Returns true if the timeline has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Sequence for EventTimeline {
    fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Runs through the end of the last tick holding an event.
    fn length_seconds(&self, seconds_per_tick: f64) -> f64 {
        match self.last_tick() {
            Some(tick) => (tick + 1) as f64 * seconds_per_tick,
            None => 0.0,
        }
    }

    fn events_at_tick(&self, tick: u64) -> &[SequenceEvent] {
        self.events.get(&tick).map(Vec::as_slice).unwrap_or(&[])
    }
}
