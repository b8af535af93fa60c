/*!
 * Composition documents for the rendering service.
 *
 * This module maps a built [`Timeline`] onto the declarative movie format the
 * renderer accepts: global settings plus scenes made of typed elements. It
 * makes no timing decisions of its own.
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::timeline::{CueRole, TimedElement, Timeline};

/// Output frame size presets understood by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    Sd,
    Hd,
    #[default]
    FullHd,
    Squared,
    InstagramStory,
    InstagramFeed,
    TwitterLandscape,
    TwitterPortrait,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sd => "sd",
            Self::Hd => "hd",
            Self::FullHd => "full-hd",
            Self::Squared => "squared",
            Self::InstagramStory => "instagram-story",
            Self::InstagramFeed => "instagram-feed",
            Self::TwitterLandscape => "twitter-landscape",
            Self::TwitterPortrait => "twitter-portrait",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sd" => Ok(Self::Sd),
            "hd" => Ok(Self::Hd),
            "full-hd" | "fullhd" | "1080p" => Ok(Self::FullHd),
            "squared" => Ok(Self::Squared),
            "instagram-story" => Ok(Self::InstagramStory),
            "instagram-feed" => Ok(Self::InstagramFeed),
            "twitter-landscape" => Ok(Self::TwitterLandscape),
            "twitter-portrait" => Ok(Self::TwitterPortrait),
            other => Err(format!("Invalid resolution: {}", other)),
        }
    }
}

/// Encoding quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    #[default]
    High,
}

/// Global rendering options for one video
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub resolution: Resolution,
    pub quality: Quality,
    /// Let the renderer reuse a previous identical render
    pub cache: bool,
    /// `#rgb` or `#rrggbb`
    pub background_color: String,
    /// Speech synthesis engine the voices belong to
    pub voice_model: String,
    /// Free-form note stored with the job
    pub comment: String,
    /// Music played quietly under the whole video
    pub background_audio_url: Option<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            quality: Quality::default(),
            cache: true,
            background_color: "#1e1e2e".to_string(),
            voice_model: "azure".to_string(),
            comment: String::new(),
            background_audio_url: None,
        }
    }
}

/// Volume of the background music track
const BACKGROUND_AUDIO_VOLUME: f64 = 0.2;

/// The full movie description sent to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionDocument {
    pub comment: String,
    pub resolution: Resolution,
    pub quality: Quality,
    pub cache: bool,
    pub scenes: Vec<Scene>,
}

impl CompositionDocument {
    /// Sum of all scene durations
    pub fn total_duration(&self) -> f64 {
        self.scenes.iter().map(|s| s.duration).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub duration: f64,
    #[serde(rename = "background-color")]
    pub background_color: String,
    pub elements: Vec<Element>,
}

/// Renderer element, discriminated by its `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Text(TextElement),
    Voice(VoiceElement),
    Image(MediaElement),
    Video(MediaElement),
    Audio(AudioElement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub text: String,
    pub start: f64,
    pub duration: f64,
    pub settings: TextSettings,
}

/// Text styling, serialized with the renderer's CSS-like keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TextSettings {
    pub font_family: String,
    pub font_size: String,
    pub font_weight: String,
    pub font_color: String,
    pub vertical_position: String,
    pub horizontal_position: String,
}

impl TextSettings {
    /// Source words sit above the centre line, translations below it
    pub fn for_role(role: CueRole) -> Self {
        let (font_size, font_color, vertical_position) = match role {
            CueRole::Source => ("72px", "#ffffff", "top"),
            CueRole::Target => ("96px", "#f9e2af", "bottom"),
        };
        Self {
            font_family: "Roboto".to_string(),
            font_size: font_size.to_string(),
            font_weight: "700".to_string(),
            font_color: font_color.to_string(),
            vertical_position: vertical_position.to_string(),
            horizontal_position: "center".to_string(),
        }
    }
}

/// Spoken text. No duration is sent so the renderer keeps the natural length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceElement {
    pub text: String,
    pub voice: String,
    pub model: String,
    pub start: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaElement {
    pub src: String,
    pub start: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioElement {
    pub src: String,
    pub start: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// Wrap a timeline into a single-scene composition document
pub fn assemble(timeline: Timeline, settings: &RenderSettings) -> CompositionDocument {
    let mut elements: Vec<Element> = Vec::with_capacity(timeline.elements.len() + 1);

    if let Some(src) = &settings.background_audio_url {
        elements.push(Element::Audio(AudioElement {
            src: src.clone(),
            start: 0.0,
            duration: Some(timeline.total_duration),
            volume: Some(BACKGROUND_AUDIO_VOLUME),
        }));
    }

    elements.extend(timeline.elements.into_iter().map(|element| match element {
        TimedElement::Text(cue) => Element::Text(TextElement {
            settings: TextSettings::for_role(cue.role),
            text: cue.content,
            start: cue.start,
            duration: cue.duration,
        }),
        TimedElement::Voice(cue) => Element::Voice(VoiceElement {
            text: cue.content,
            voice: cue.voice,
            model: settings.voice_model.clone(),
            start: cue.start,
        }),
    }));

    CompositionDocument {
        comment: settings.comment.clone(),
        resolution: settings.resolution,
        quality: settings.quality,
        cache: settings.cache,
        scenes: vec![Scene {
            duration: timeline.total_duration,
            background_color: settings.background_color.clone(),
            elements,
        }],
    }
}
