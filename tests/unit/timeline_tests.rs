/*!
 * Tests for timeline construction and word count derivation
 */

use vocabreel::timeline::{
    CueRole, MAX_WORD_COUNT, TimedElement, TimingConfig, build_timeline, derive_word_count,
};
use vocabreel::voices::VoiceAssignment;

use crate::common::{cat_dog_pairs, numbered_pairs};

fn en_ar() -> VoiceAssignment {
    VoiceAssignment::for_languages("en", "ar")
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "expected {}, got {}", expected, actual);
}

/// Test the total duration formula for a range of inputs
#[test]
fn test_buildTimeline_withVariousInputs_shouldMatchDurationFormula() {
    for &repeat in &[false, true] {
        for &pause in &[0.0, 0.25, 1.0, 1.5, 10.0] {
            for &n in &[1usize, 2, 7, 100] {
                let timing = TimingConfig::new(pause, repeat).unwrap();
                let timeline = build_timeline(&numbered_pairs(n), &timing, &en_ar()).unwrap();
                let items = if repeat { 3.0 } else { 2.0 };
                assert_close(timeline.total_duration, n as f64 * items * (1.0 + pause));
            }
        }
    }
}

/// Test cue counts with and without the repeat
#[test]
fn test_buildTimeline_withRepeatFlag_shouldEmitFourOrFiveCuesPerPair() {
    let pairs = numbered_pairs(3);

    let timing = TimingConfig::new(1.0, false).unwrap();
    let timeline = build_timeline(&pairs, &timing, &en_ar()).unwrap();
    for i in 0..pairs.len() {
        let cues = timeline.pair_elements(i);
        assert_eq!(cues.len(), 4);
        assert_eq!(cues.iter().filter(|c| c.is_text()).count(), 2);
        assert_eq!(cues.iter().filter(|c| c.is_voice()).count(), 2);
    }

    let timing = TimingConfig::new(1.0, true).unwrap();
    let timeline = build_timeline(&pairs, &timing, &en_ar()).unwrap();
    for i in 0..pairs.len() {
        let cues = timeline.pair_elements(i);
        assert_eq!(cues.len(), 5);
        assert_eq!(cues.iter().filter(|c| c.is_text()).count(), 2);
        assert_eq!(cues.iter().filter(|c| c.is_voice()).count(), 3);
    }
}

/// Test the target text covers the remainder of the pair slot
#[test]
fn test_buildTimeline_targetText_shouldLastPairMinusItem() {
    for &repeat in &[false, true] {
        let timing = TimingConfig::new(0.75, repeat).unwrap();
        let timeline = build_timeline(&numbered_pairs(4), &timing, &en_ar()).unwrap();
        let expected = timing.pair_duration() - timing.item_duration();

        let target_texts: Vec<f64> = timeline
            .elements
            .iter()
            .filter_map(|e| match e {
                TimedElement::Text(cue) if cue.role == CueRole::Target => Some(cue.duration),
                _ => None,
            })
            .collect();
        assert_eq!(target_texts.len(), 4);
        for duration in target_texts {
            assert_close(duration, expected);
        }
    }
}

/// Test the two-pair English/Arabic scenario with a 1.5s pause
#[test]
fn test_buildTimeline_withCatDogScenario_shouldPlaceEveryCue() {
    let timing = TimingConfig::new(1.5, false).unwrap();
    let voices = en_ar();
    let timeline = build_timeline(&cat_dog_pairs(), &timing, &voices).unwrap();

    assert_close(timing.pair_duration(), 5.0);
    assert_close(timeline.total_duration, 10.0);

    for (index, (source, target)) in [("cat", "قطة"), ("dog", "كلب")].iter().enumerate() {
        let offset = index as f64 * 5.0;
        let cues = timeline.pair_elements(index);

        match &cues[0] {
            TimedElement::Text(cue) => {
                assert_eq!(cue.content, *source);
                assert_close(cue.start, offset);
                assert_close(cue.start + cue.duration, offset + 2.5);
            }
            other => panic!("expected source text, got {:?}", other),
        }
        match &cues[1] {
            TimedElement::Voice(cue) => {
                assert_eq!(cue.content, *source);
                assert_eq!(cue.voice, voices.source_voice_id);
                assert_close(cue.start, offset);
            }
            other => panic!("expected source voice, got {:?}", other),
        }
        match &cues[2] {
            TimedElement::Text(cue) => {
                assert_eq!(cue.content, *target);
                assert_close(cue.start, offset + 2.5);
                assert_close(cue.start + cue.duration, offset + 5.0);
            }
            other => panic!("expected target text, got {:?}", other),
        }
        match &cues[3] {
            TimedElement::Voice(cue) => {
                assert_eq!(cue.content, *target);
                assert_eq!(cue.voice, voices.target_voice_id);
                assert_close(cue.start, offset + 2.5);
            }
            other => panic!("expected target voice, got {:?}", other),
        }
    }
}

/// Test the repeat is spoken one item after the target
#[test]
fn test_buildTimeline_withRepeat_shouldSpeakTargetAgain() {
    let timing = TimingConfig::new(1.0, true).unwrap();
    let timeline = build_timeline(&cat_dog_pairs(), &timing, &en_ar()).unwrap();

    let repeat = &timeline.pair_elements(1)[4];
    assert!(repeat.is_voice());
    assert_eq!(repeat.content(), "كلب");
    // pair 1 starts at 6.0, repeat at pair start + 2 items
    assert_close(repeat.start(), 10.0);
}

/// Test empty input is rejected
#[test]
fn test_buildTimeline_withNoPairs_shouldFail() {
    let timing = TimingConfig::new(1.0, false).unwrap();
    assert!(build_timeline(&[], &timing, &en_ar()).is_err());
}

/// Test the one-minute derivation example
#[test]
fn test_deriveWordCount_withOneMinuteNoPause_shouldGiveThirty() {
    let timing = TimingConfig::new(0.0, false).unwrap();
    assert_eq!(derive_word_count(1.0, &timing), 30);
}

/// Test the derivation clamps into [1, 100]
#[test]
fn test_deriveWordCount_withExtremeDurations_shouldClamp() {
    let timing = TimingConfig::new(10.0, true).unwrap();
    assert_eq!(derive_word_count(0.01, &timing), 1);

    let timing = TimingConfig::new(0.0, false).unwrap();
    assert_eq!(derive_word_count(600.0, &timing), MAX_WORD_COUNT);
}

/// Test a finite duration whose seconds overflow still clamps to the maximum
#[test]
fn test_deriveWordCount_withOverflowingDuration_shouldClampToMax() {
    let timing = TimingConfig::new(0.0, false).unwrap();
    assert_eq!(derive_word_count(1e308, &timing), MAX_WORD_COUNT);
    assert_eq!(derive_word_count(f64::MAX, &timing), MAX_WORD_COUNT);
}

/// Test re-deriving the pair count from a built timeline
#[test]
fn test_deriveWordCount_fromBuiltTimeline_shouldRecoverPairCount() {
    for &repeat in &[false, true] {
        for &pause in &[0.0, 0.5, 1.5, 3.0] {
            for k in [1usize, 3, 10, 42] {
                let timing = TimingConfig::new(pause, repeat).unwrap();
                let timeline = build_timeline(&numbered_pairs(k), &timing, &en_ar()).unwrap();
                let minutes = timeline.total_duration / 60.0;
                assert_eq!(derive_word_count(minutes, &timing), k as u32, "pause {} repeat {}", pause, repeat);
            }
        }
    }
}
