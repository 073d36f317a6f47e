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

use super::{note_to_frequency, Sampler, CONCERT_A_NOTE};

/// Plays a mono 16-bit wavetable at an arbitrary pitch using a fractional phase
/// accumulator and linear interpolation.
///
/// The wavetable is shared, so many voices can play the same waveform without
/// copying it. Only the phase is per-sampler state.
#[derive(Clone, Debug)]
pub struct WavetableSampler {
    /// The waveform, one mono sample per entry.
    wavetable: Arc<[i16]>,
    /// The rate the wavetable was recorded (or resampled) at.
    sample_rate: u32,
    /// The note at which the wavetable plays back at native speed.
    root_note: u8,
    /// The note this sampler is currently playing.
    playing_note: u8,
    /// Whether playback wraps around at the end of the wavetable.
    looping: bool,
    /// Fractional read position into the wavetable.
    phase: f64,
}

impl WavetableSampler {
    /// Creates a new sampler over the given wavetable. The root and playing notes
    /// default to concert A and the sample loops.
    pub fn new(wavetable: impl Into<Arc<[i16]>>, sample_rate: u32) -> WavetableSampler {
        WavetableSampler {
            wavetable: wavetable.into(),
            sample_rate,
            root_note: CONCERT_A_NOTE,
            playing_note: CONCERT_A_NOTE,
            looping: true,
            phase: 0.0,
        }
    }

    /// Sets the root note of the wavetable.
    pub fn with_root_note(mut self, root_note: u8) -> WavetableSampler {
        self.root_note = root_note;
        self
    }

    /// Sets the note to play.
    pub fn with_playing_note(mut self, playing_note: u8) -> WavetableSampler {
        self.playing_note = playing_note;
        self
    }

    /// Sets whether the wavetable loops. One-shot samples (drums) should not loop.
    pub fn with_looping(mut self, looping: bool) -> WavetableSampler {
        self.looping = looping;
        self
    }

    /// Gets the wavetable.
    pub fn wavetable(&self) -> &Arc<[i16]> {
        &self.wavetable
    }

    /// Gets the sample rate of the wavetable.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Gets the root note.
    pub fn root_note(&self) -> u8 {
        self.root_note
    }

    /// Gets the playing note.
    pub fn playing_note(&self) -> u8 {
        self.playing_note
    }

    /// Gets whether the wavetable loops.
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Gets the current phase.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Returns true if this is a one-shot sampler that has played past its end.
    pub fn is_finished(&self) -> bool {
        !self.looping && self.phase > self.wavetable.len() as f64
    }

    /// Replaces the wavetable and its sample rate, keeping the current phase.
    pub(crate) fn replace_wavetable(&mut self, wavetable: Arc<[i16]>, sample_rate: u32) {
        self.wavetable = wavetable;
        self.sample_rate = sample_rate;
    }

    /// How far to advance the phase per output sample for the given pitch bend.
    fn phase_increment(&self, pitch_bend_semitones: f32) -> f64 {
        let bend_ratio = 2f64.powf(f64::from(pitch_bend_semitones) / 12.0);
        let playing_frequency = note_to_frequency(self.playing_note) * bend_ratio;
        playing_frequency / note_to_frequency(self.root_note)
    }

    /// Reads the wavetable at a fractional position, interpolating linearly between
    /// the two neighbouring entries. Positions wrap around the table.
    fn read(&self, position: f64) -> i16 {
        let len = self.wavetable.len();
        if len == 0 {
            return 0;
        }

        let fraction = position - position.floor();
        let index_a = (position as usize) % len;
        let index_b = (index_a + 1) % len;
        let a = f64::from(self.wavetable[index_a]);
        let b = f64::from(self.wavetable[index_b]);

        (a * (1.0 - fraction) + b * fraction) as i16
    }

    /// Builds a copy of the wavetable resampled from the current rate to the given rate.
    pub(crate) fn resampled(&self, sample_rate_hz: u32) -> Arc<[i16]> {
        let ratio = f64::from(sample_rate_hz) / f64::from(self.sample_rate);
        let new_len = (self.wavetable.len() as f64 * ratio) as usize;
        let step = f64::from(self.sample_rate) / f64::from(sample_rate_hz);

        (0..new_len).map(|i| self.read(i as f64 * step)).collect()
    }
}

impl Sampler for WavetableSampler {
    fn sample(&mut self, pitch_bend_semitones: f32) -> (i16, i16) {
        if self.is_finished() {
            return (0, 0);
        }

        let increment = self.phase_increment(pitch_bend_semitones);
        let sample = self.read(self.phase);
        self.phase += increment;

        (sample, sample)
    }

    fn resample_to(&mut self, sample_rate_hz: u32) {
        if sample_rate_hz == 0 || sample_rate_hz == self.sample_rate || self.sample_rate == 0 {
            return;
        }

        let resampled = self.resampled(sample_rate_hz);
        self.replace_wavetable(resampled, sample_rate_hz);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(sampler: &mut WavetableSampler, bend: f32, count: usize) -> Vec<i16> {
        (0..count).map(|_| sampler.sample(bend).0).collect()
    }

    #[test]
    fn test_native_speed_reads_table_in_order() {
        let mut sampler = WavetableSampler::new(vec![0i16, 1000, 2000, 3000], 44100);

        assert_eq!(
            collect(&mut sampler, 0.0, 6),
            vec![0, 1000, 2000, 3000, 0, 1000]
        );
    }

    #[test]
    fn test_stereo_channels_are_identical() {
        let mut sampler = WavetableSampler::new(vec![100i16, -200, 300], 44100);
        for _ in 0..10 {
            let (left, right) = sampler.sample(0.3);
            assert_eq!(left, right);
        }
    }

    #[test]
    fn test_octave_down_interpolates() {
        let mut sampler = WavetableSampler::new(vec![0i16, 1000], 44100)
            .with_root_note(69)
            .with_playing_note(57);

        assert_eq!(collect(&mut sampler, 0.0, 5), vec![0, 500, 1000, 500, 0]);
    }

    #[test]
    fn test_pitch_bend_octave_up_skips_entries() {
        let mut sampler = WavetableSampler::new(vec![0i16, 10, 20, 30, 40, 50], 44100);

        assert_eq!(collect(&mut sampler, 12.0, 4), vec![0, 20, 40, 0]);
    }

    #[test]
    fn test_phase_increment_follows_note_ratio() {
        let sampler = WavetableSampler::new(vec![0i16; 8], 44100)
            .with_root_note(60)
            .with_playing_note(72);
        assert!((sampler.phase_increment(0.0) - 2.0).abs() < 1e-9);
        assert!((sampler.phase_increment(-12.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_one_shot_goes_silent() {
        let mut sampler = WavetableSampler::new(vec![7i16, 7, 7, 7], 44100).with_looping(false);

        // The end check is strict, so the position equal to the length still wraps
        // to the first entry before playback stops.
        assert_eq!(collect(&mut sampler, 0.0, 5), vec![7, 7, 7, 7, 7]);
        assert!(sampler.is_finished());
        assert_eq!(collect(&mut sampler, 0.0, 10), vec![0; 10]);
    }

    #[test]
    fn test_looping_never_finishes() {
        let mut sampler = WavetableSampler::new(vec![7i16, 7], 44100);
        assert_eq!(collect(&mut sampler, 0.0, 100), vec![7; 100]);
        assert!(!sampler.is_finished());
    }

    #[test]
    fn test_empty_wavetable_is_silent() {
        let mut sampler = WavetableSampler::new(Vec::<i16>::new(), 44100);
        assert_eq!(sampler.sample(0.0), (0, 0));
        sampler.resample_to(48000);
        assert!(sampler.wavetable().is_empty());
    }

    #[test]
    fn test_resample_upsamples_with_interpolation() {
        let original: Vec<i16> = (0..100).map(|i| (i * 100) as i16).collect();
        let mut sampler = WavetableSampler::new(original.clone(), 22050);
        sampler.resample_to(44100);

        assert_eq!(sampler.sample_rate(), 44100);
        assert_eq!(sampler.wavetable().len(), 200);
        for (i, value) in original.iter().enumerate() {
            assert_eq!(sampler.wavetable()[i * 2], *value);
        }
        assert_eq!(sampler.wavetable()[1], 50);
    }

    #[test]
    fn test_resample_downsamples() {
        let original: Vec<i16> = (0..300).map(|i| i as i16).collect();
        let mut sampler = WavetableSampler::new(original, 48000);
        sampler.resample_to(24000);

        assert_eq!(sampler.wavetable().len(), 150);
        assert_eq!(sampler.wavetable()[10], 20);
    }

    #[test]
    fn test_resample_keeps_phase() {
        let mut sampler = WavetableSampler::new(vec![0i16; 64], 22050);
        collect(&mut sampler, 0.0, 5);
        sampler.resample_to(44100);
        assert_eq!(sampler.phase(), 5.0);
    }

    #[test]
    fn test_resample_same_rate_is_noop() {
        let mut sampler = WavetableSampler::new(vec![1i16, 2, 3], 44100);
        let before = sampler.wavetable().clone();
        sampler.resample_to(44100);
        assert!(Arc::ptr_eq(&before, sampler.wavetable()));
    }
}
