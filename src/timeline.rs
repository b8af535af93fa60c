/*!
 * Timeline construction for vocabulary videos.
 *
 * A timeline turns an ordered list of word pairs into timed text and voice
 * cues. Every pair occupies the same slot length:
 *
 * ```text
 * item  = word_duration + pause
 * pair  = items_per_pair * item        (2 items, or 3 with the repeat)
 *
 * |<------ item ------>|<------------- pair - item -------------->|
 * [ source text       ][ target text                              ]
 * ^ source voice       ^ target voice       ^ target voice (repeat)
 * ```
 *
 * All offsets are seconds as `f64` and are never rounded here; the renderer
 * quantizes them.
 */

use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;
use crate::voices::VoiceAssignment;

/// Seconds a single spoken word is given
pub const WORD_DURATION_SECONDS: f64 = 1.0;

/// Smallest accepted pause between words
pub const MIN_PAUSE_SECONDS: f64 = 0.0;

/// Largest accepted pause between words
pub const MAX_PAUSE_SECONDS: f64 = 10.0;

/// Smallest number of word pairs in one video
pub const MIN_WORD_COUNT: u32 = 1;

/// Largest number of word pairs in one video
pub const MAX_WORD_COUNT: u32 = 100;

/// A source-language word and its translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    /// Word in the learner's language
    pub source: String,
    /// Word in the language being learned
    pub target: String,
}

impl WordPair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Pacing of the video
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    /// Silence after each spoken word, in seconds
    pub pause_between_words: f64,
    /// Speak the target word a second time
    pub use_secondary_repeat: bool,
}

impl TimingConfig {
    /// Create a validated timing configuration
    pub fn new(pause_between_words: f64, use_secondary_repeat: bool) -> Result<Self, GenerationError> {
        let timing = Self {
            pause_between_words,
            use_secondary_repeat,
        };
        timing.validate()?;
        Ok(timing)
    }

    /// Check the pause lies in `[0, 10]` seconds
    pub fn validate(&self) -> Result<(), GenerationError> {
        let pause = self.pause_between_words;
        if !pause.is_finite() || !(MIN_PAUSE_SECONDS..=MAX_PAUSE_SECONDS).contains(&pause) {
            return Err(GenerationError::Validation(format!(
                "pauseBetweenWords must be between {} and {} seconds, got {}",
                MIN_PAUSE_SECONDS, MAX_PAUSE_SECONDS, pause
            )));
        }
        Ok(())
    }

    /// Fixed length of one spoken word
    pub fn word_duration(&self) -> f64 {
        WORD_DURATION_SECONDS
    }

    /// One word plus its pause
    pub fn item_duration(&self) -> f64 {
        self.word_duration() + self.pause_between_words
    }

    /// Source, target and the optional target repeat
    pub fn items_per_pair(&self) -> u32 {
        if self.use_secondary_repeat { 3 } else { 2 }
    }

    /// Seconds one word pair occupies
    pub fn pair_duration(&self) -> f64 {
        f64::from(self.items_per_pair()) * self.item_duration()
    }
}

/// Where a text cue sits in the pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueRole {
    Source,
    Target,
}

/// Word shown on screen
#[derive(Debug, Clone, PartialEq)]
pub struct TextCue {
    pub content: String,
    pub start: f64,
    pub duration: f64,
    /// Drives on-screen placement and styling
    pub role: CueRole,
}

/// Word spoken by the synthesizer
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceCue {
    pub content: String,
    pub start: f64,
    /// Slot reserved for the utterance
    pub duration: f64,
    pub voice: String,
}

/// A single timed element of the output
#[derive(Debug, Clone, PartialEq)]
pub enum TimedElement {
    Text(TextCue),
    Voice(VoiceCue),
}

impl TimedElement {
    pub fn start(&self) -> f64 {
        match self {
            Self::Text(cue) => cue.start,
            Self::Voice(cue) => cue.start,
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            Self::Text(cue) => cue.duration,
            Self::Voice(cue) => cue.duration,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Text(cue) => &cue.content,
            Self::Voice(cue) => &cue.content,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub fn is_voice(&self) -> bool {
        matches!(self, Self::Voice(_))
    }
}

/// Ordered cues plus the length of the whole video
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub elements: Vec<TimedElement>,
    pub total_duration: f64,
    /// Number of word pairs the timeline was built from
    pub pair_count: usize,
}

impl Timeline {
    /// Cues belonging to the `index`-th word pair
    pub fn pair_elements(&self, index: usize) -> &[TimedElement] {
        let per_pair = if self.pair_count == 0 { 0 } else { self.elements.len() / self.pair_count };
        let start = (index * per_pair).min(self.elements.len());
        let end = (start + per_pair).min(self.elements.len());
        &self.elements[start..end]
    }
}

/// Lay the word pairs out on a timeline.
///
/// # Errors
/// `GenerationError::Validation` when `pairs` is empty or the timing is out
/// of range.
pub fn build_timeline(
    pairs: &[WordPair],
    timing: &TimingConfig,
    voices: &VoiceAssignment,
) -> Result<Timeline, GenerationError> {
    if pairs.is_empty() {
        return Err(GenerationError::Validation(
            "at least one word pair is required to build a timeline".to_string(),
        ));
    }
    timing.validate()?;

    let item = timing.item_duration();
    let pair_duration = timing.pair_duration();
    let cues_per_pair = if timing.use_secondary_repeat { 5 } else { 4 };
    let mut elements = Vec::with_capacity(pairs.len() * cues_per_pair);

    for (index, pair) in pairs.iter().enumerate() {
        let pair_start = index as f64 * pair_duration;
        let target_start = pair_start + item;

        elements.push(TimedElement::Text(TextCue {
            content: pair.source.clone(),
            start: pair_start,
            duration: item,
            role: CueRole::Source,
        }));
        elements.push(TimedElement::Voice(VoiceCue {
            content: pair.source.clone(),
            start: pair_start,
            duration: item,
            voice: voices.source_voice_id.clone(),
        }));

        // Stays on screen through the repeat, if any
        elements.push(TimedElement::Text(TextCue {
            content: pair.target.clone(),
            start: target_start,
            duration: pair_duration - item,
            role: CueRole::Target,
        }));
        elements.push(TimedElement::Voice(VoiceCue {
            content: pair.target.clone(),
            start: target_start,
            duration: item,
            voice: voices.target_voice_id.clone(),
        }));

        if timing.use_secondary_repeat {
            elements.push(TimedElement::Voice(VoiceCue {
                content: pair.target.clone(),
                start: pair_start + 2.0 * item,
                duration: item,
                voice: voices.target_voice_id.clone(),
            }));
        }
    }

    Ok(Timeline {
        elements,
        total_duration: pairs.len() as f64 * pair_duration,
        pair_count: pairs.len(),
    })
}

// Absorbs float error so a duration built from whole pairs maps back to the same count
const FIT_EPSILON: f64 = 1e-9;

/// Number of word pairs that fit in `duration_minutes`, clamped to `[1, 100]`.
///
/// Uses the same item/pair arithmetic as [`build_timeline`] so the announced
/// word count and the rendered length agree.
pub fn derive_word_count(duration_minutes: f64, timing: &TimingConfig) -> u32 {
    let fitted = (duration_minutes * 60.0 / timing.pair_duration() + FIT_EPSILON).floor();
    if fitted.is_nan() {
        return MIN_WORD_COUNT;
    }
    // +inf from an overflowing duration clamps to the maximum
    fitted.clamp(f64::from(MIN_WORD_COUNT), f64::from(MAX_WORD_COUNT)) as u32
}
