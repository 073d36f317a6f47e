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
use crate::synth::{soft_clip, EnvelopeAdsr, Synth, VoiceState, DEFAULT_MAX_VOICES};
use crate::testutil::ConstantBank;

const SAMPLE_RATE: u32 = 1000;
const LEVEL: i16 = 10_000;

fn synth_with(envelope: EnvelopeAdsr, max_voices: usize) -> Synth {
    Synth::new(
        Box::new(ConstantBank::new(LEVEL, envelope)),
        SAMPLE_RATE,
        max_voices,
    )
}

fn render(synth: &mut Synth, count: usize) -> Vec<(i16, i16)> {
    (0..count)
        .map(|_| synth.sample().expect("sample should succeed"))
        .collect()
}

/// Asserts a mixed sample is the soft-clipped version of the given voice level,
/// within a couple of steps of truncation error.
fn assert_mixed_level(actual: (i16, i16), level: i32) {
    let expected = i32::from(soft_clip(level));
    assert!(
        (i32::from(actual.0) - expected).abs() <= 2 && (i32::from(actual.1) - expected).abs() <= 2,
        "expected ~{}, got {:?}",
        expected,
        actual
    );
}

#[test]
fn test_silence_when_idle() {
    let mut synth = synth_with(EnvelopeAdsr::default(), DEFAULT_MAX_VOICES);
    assert_eq!(synth.max_voices(), DEFAULT_MAX_VOICES);
    assert!(render(&mut synth, 10).iter().all(|&s| s == (0, 0)));
}

#[test]
fn test_soundbank_is_told_sample_rate() {
    let bank = ConstantBank::new(LEVEL, EnvelopeAdsr::default());
    let sample_rate = bank.sample_rate.clone();
    let _synth = Synth::new(Box::new(bank), 22050, 4);
    assert_eq!(*sample_rate.lock().expect("lock"), Some(22050));
}

#[test]
fn test_first_note_wins_when_pool_is_full() {
    let envelope = EnvelopeAdsr::new(0.01, 0.0, 1.0, 0.05);
    let mut synth = synth_with(envelope, 1);
    synth.note_on(0, 60, 100);
    synth.note_on(0, 64, 100);

    let mut reference = synth_with(envelope, 1);
    reference.note_on(0, 60, 100);

    assert!(synth.is_sounding(0, 60));
    assert!(!synth.is_sounding(0, 64));
    for _ in 0..200 {
        assert_eq!(synth.sample().expect("sample"), reference.sample().expect("sample"));
        assert!(!synth.is_sounding(0, 64));
    }
    assert_eq!(synth.active_voices(), 1);
}

#[test]
fn test_envelope_shape_end_to_end() {
    let mut synth = synth_with(EnvelopeAdsr::new(0.1, 0.1, 0.5, 0.2), 4);
    synth.note_on(0, 60, 127);

    let held = render(&mut synth, 1000);
    assert_eq!(held[0], (0, 0));
    assert_mixed_level(held[50], 5000);
    assert_mixed_level(held[100], 10_000);
    assert_mixed_level(held[150], 7500);
    assert_mixed_level(held[200], 5000);
    assert_mixed_level(held[999], 5000);

    synth.note_off(0, 60);
    let released = render(&mut synth, 250);
    assert_mixed_level(released[0], 5000);
    assert_mixed_level(released[100], 2500);
    assert_eq!(released[249], (0, 0));
    assert_eq!(synth.active_voices(), 0);
    assert_eq!(synth.voices()[0].state(), VoiceState::Idle);
}

#[test]
fn test_zero_velocity_releases_like_note_off() {
    let envelope = EnvelopeAdsr::new(0.0, 0.0, 0.8, 0.1);
    let mut by_velocity = synth_with(envelope, 4);
    let mut by_note_off = synth_with(envelope, 4);

    by_velocity.note_on(2, 60, 90);
    by_note_off.note_on(2, 60, 90);
    assert_eq!(render(&mut by_velocity, 10), render(&mut by_note_off, 10));

    by_velocity.note_on(2, 60, 0);
    by_note_off.note_off(2, 60);
    assert_eq!(
        by_velocity.voices()[0].state(),
        by_note_off.voices()[0].state()
    );
    assert_eq!(by_velocity.voices()[0].state(), VoiceState::Releasing);
    assert_eq!(render(&mut by_velocity, 200), render(&mut by_note_off, 200));
    assert_eq!(by_velocity.active_voices(), 0);
}

#[test]
fn test_zero_velocity_for_silent_note_is_ignored() {
    let bank = ConstantBank::new(LEVEL, EnvelopeAdsr::default());
    let requests = bank.requests();
    let mut synth = Synth::new(Box::new(bank), SAMPLE_RATE, 4);

    synth.note_on(0, 60, 0);
    assert_eq!(synth.active_voices(), 0);
    assert!(requests.lock().expect("lock").is_empty());
}

#[test]
fn test_active_voices_never_exceed_pool() {
    let mut synth = synth_with(EnvelopeAdsr::new(0.0, 0.0, 1.0, 0.5), 4);
    for note in 40..60 {
        synth.note_on(note as u32 % 3, note, 100);
        assert!(synth.active_voices() <= 4);
        render(&mut synth, 3);
    }
    assert_eq!(synth.active_voices(), 4);
    assert!(synth.voices().iter().all(|voice| voice.is_active()));

    // Releasing frees slots for new notes once the release completes.
    for note in 40..60 {
        synth.note_off(note as u32 % 3, note);
    }
    render(&mut synth, 600);
    assert_eq!(synth.active_voices(), 0);
    synth.note_on(0, 80, 100);
    assert!(synth.is_sounding(0, 80));
}

#[test]
fn test_retrigger_reuses_slot() {
    let mut synth = synth_with(EnvelopeAdsr::new(0.0, 0.0, 1.0, 1.0), 8);
    synth.note_on(0, 50, 100);
    synth.note_on(1, 60, 100);
    let slot = synth.voice_slot(1, 60);
    assert_eq!(slot, Some(1));

    render(&mut synth, 5);
    synth.note_on(1, 60, 120);
    assert_eq!(synth.voice_slot(1, 60), slot);
    assert_eq!(synth.active_voices(), 2);
    assert_eq!(synth.voices()[1].samples_since_trigger(), 0);

    // Retriggering a releasing note picks the same slot back up.
    synth.note_off(1, 60);
    render(&mut synth, 5);
    assert_eq!(synth.voices()[1].state(), VoiceState::Releasing);
    synth.note_on(1, 60, 100);
    assert_eq!(synth.voice_slot(1, 60), slot);
    assert_eq!(synth.voices()[1].state(), VoiceState::Sounding);
    assert_eq!(synth.active_voices(), 2);
}

#[test]
fn test_output_stays_in_range() {
    let bank = ConstantBank::new(i16::MAX, EnvelopeAdsr::default());
    let mut synth = Synth::new(Box::new(bank), SAMPLE_RATE, DEFAULT_MAX_VOICES);
    for note in 0..DEFAULT_MAX_VOICES as u8 {
        synth.note_on(0, note, 127);
    }
    assert_eq!(synth.active_voices(), DEFAULT_MAX_VOICES);

    for (left, right) in render(&mut synth, 10) {
        assert!(left > 32_000 && right > 32_000);
        assert!(left <= i16::MAX && right <= i16::MAX);
    }
}

#[test]
fn test_soft_clip() {
    assert_eq!(soft_clip(0), 0);
    assert_eq!(soft_clip(1000), -soft_clip(-1000));
    assert!(soft_clip(1000) < 1000);
    assert_eq!(soft_clip(i32::MAX), i16::MAX);
    assert_eq!(soft_clip(i32::MIN), -i16::MAX);

    let mut previous = soft_clip(-100_000);
    for mixed in (-100_000..100_000).step_by(997) {
        let clipped = soft_clip(mixed);
        assert!(clipped >= previous);
        previous = clipped;
    }
}

#[test]
fn test_declined_program_is_dropped() {
    let bank = ConstantBank::new(LEVEL, EnvelopeAdsr::default()).declining(5);
    let requests = bank.requests();
    let mut synth = Synth::new(Box::new(bank), SAMPLE_RATE, 4);

    synth.use_program(0, 5);
    synth.note_on(0, 60, 100);
    assert!(!synth.is_sounding(0, 60));
    assert_eq!(synth.sample().expect("sample"), (0, 0));
    assert_eq!(requests.lock().expect("lock").len(), 1);
}

#[test]
fn test_note_off_for_silent_note_is_ignored() {
    let mut synth = synth_with(EnvelopeAdsr::default(), 4);
    synth.note_on(0, 60, 100);
    synth.note_off(0, 61);
    synth.note_off(3, 60);
    assert!(synth.is_sounding(0, 60));
    assert_eq!(synth.voices()[0].state(), VoiceState::Sounding);
    assert!(synth.instrument(3).is_none());
}

#[test]
fn test_instruments_are_created_lazily() {
    let bank = ConstantBank::new(LEVEL, EnvelopeAdsr::default());
    let requests = bank.requests();
    let mut synth = Synth::new(Box::new(bank), SAMPLE_RATE, 4);
    assert!(synth.instrument(7).is_none());

    synth.pitch_bend(7, 0.5);
    let instrument = synth.instrument(7).expect("instrument");
    assert_eq!(instrument.program, 7);
    assert_eq!(instrument.pitch, 0.5);

    synth.adjust_pan(8, -0.25);
    assert_eq!(synth.instrument(8).expect("instrument").program, 8);

    synth.note_on(9, 60, 64);
    synth.use_program(10, 33);
    synth.note_on(10, 61, 65);
    let requests = requests.lock().expect("lock");
    assert_eq!(requests[0].program, 9);
    assert_eq!((requests[1].program, requests[1].note, requests[1].velocity), (33, 61, 65));
}

#[test]
fn test_instrument_state_is_merged_at_note_on() {
    let mut synth = synth_with(EnvelopeAdsr::default(), 4);
    synth.pitch_bend(0, -1.0);
    synth.adjust_pan(0, 0.5);
    synth.note_on(0, 60, 127);

    let params = synth.voices()[0].params();
    assert_eq!(params.pitch, -1.0);
    assert_eq!(params.pan, 0.5);
    assert_eq!(params.velocity, 1.0);
}

#[test]
fn test_pitch_and_pan_are_live() {
    let mut synth = synth_with(EnvelopeAdsr::default(), 4);
    synth.note_on(0, 60, 100);
    synth.note_on(0, 64, 100);
    synth.note_on(1, 60, 100);

    synth.pitch_bend(0, 0.75);
    synth.adjust_pan(0, -1.0);

    for slot in [0, 1] {
        assert_eq!(synth.voices()[slot].params().pitch, 0.75);
        assert_eq!(synth.voices()[slot].params().pan, -1.0);
    }
    assert_eq!(synth.voices()[2].params().pitch, 0.0);
    assert_eq!(synth.voices()[2].params().pan, 0.0);

    // Hard left on instrument 0 leaves only instrument 1 in the right channel.
    let (left, right) = synth.sample().expect("sample");
    assert!(left > right);
    assert!(right > 0);
}

#[test]
fn test_max_pitch_bend() {
    let mut synth = synth_with(EnvelopeAdsr::default(), 4).with_max_pitch_bend(12.0);
    assert_eq!(synth.max_pitch_bend(), 12.0);
    synth.set_max_pitch_bend(7.0);
    assert_eq!(synth.max_pitch_bend(), 7.0);
    assert_eq!(synth.sample_rate(), SAMPLE_RATE);
    assert!((synth.time_step() - 0.001).abs() < 1e-12);
}
