/*!
 * Tests for composition document assembly
 */

use vocabreel::composition::{Element, RenderSettings, Resolution, assemble};
use vocabreel::timeline::{TimingConfig, build_timeline};
use vocabreel::voices::VoiceAssignment;

use crate::common::cat_dog_pairs;

fn cat_dog_document(settings: &RenderSettings) -> vocabreel::CompositionDocument {
    let timing = TimingConfig::new(1.5, false).unwrap();
    let timeline = build_timeline(&cat_dog_pairs(), &timing, &VoiceAssignment::for_languages("en", "ar")).unwrap();
    assemble(timeline, settings)
}

/// Test the document has one scene spanning the whole timeline
#[test]
fn test_assemble_withCatDogTimeline_shouldBuildSingleScene() {
    let settings = RenderSettings {
        background_color: "#000".to_string(),
        ..Default::default()
    };
    let document = cat_dog_document(&settings);

    assert_eq!(document.scenes.len(), 1);
    let scene = &document.scenes[0];
    assert_eq!(scene.duration, 10.0);
    assert_eq!(scene.background_color, "#000");
    assert_eq!(scene.elements.len(), 8);
    assert_eq!(document.total_duration(), 10.0);
}

/// Test cues keep their order and timing
#[test]
fn test_assemble_withCatDogTimeline_shouldPreserveCueTiming() {
    let document = cat_dog_document(&RenderSettings::default());
    let elements = &document.scenes[0].elements;

    match &elements[2] {
        Element::Text(text) => {
            assert_eq!(text.text, "قطة");
            assert_eq!(text.start, 2.5);
            assert_eq!(text.duration, 2.5);
            assert_eq!(text.settings.vertical_position, "bottom");
        }
        other => panic!("expected target text, got {:?}", other),
    }
    match &elements[7] {
        Element::Voice(voice) => {
            assert_eq!(voice.text, "كلب");
            assert_eq!(voice.start, 7.5);
            assert_eq!(voice.voice, "ar-SA-ZariyahNeural");
            assert_eq!(voice.model, "azure");
        }
        other => panic!("expected target voice, got {:?}", other),
    }
}

/// Test the wire format keys the renderer expects
#[test]
fn test_assemble_serialized_shouldUseRendererKeys() {
    let settings = RenderSettings {
        resolution: Resolution::InstagramStory,
        comment: "Vocabulary: animals".to_string(),
        ..Default::default()
    };
    let json = serde_json::to_value(cat_dog_document(&settings)).unwrap();

    assert_eq!(json["resolution"], "instagram-story");
    assert_eq!(json["quality"], "high");
    assert_eq!(json["comment"], "Vocabulary: animals");
    let scene = &json["scenes"][0];
    assert!(scene.get("background-color").is_some());

    let source_text = &scene["elements"][0];
    assert_eq!(source_text["type"], "text");
    assert_eq!(source_text["settings"]["font-size"], "72px");

    let source_voice = &scene["elements"][1];
    assert_eq!(source_voice["type"], "voice");
    assert!(source_voice.get("duration").is_none());
}

/// Test background music spans the scene at low volume
#[test]
fn test_assemble_withBackgroundAudio_shouldAddQuietTrack() {
    let settings = RenderSettings {
        background_audio_url: Some("https://cdn.example/music.mp3".to_string()),
        ..Default::default()
    };
    let document = cat_dog_document(&settings);
    let elements = &document.scenes[0].elements;

    assert_eq!(elements.len(), 9);
    match &elements[0] {
        Element::Audio(audio) => {
            assert_eq!(audio.src, "https://cdn.example/music.mp3");
            assert_eq!(audio.duration, Some(10.0));
            assert_eq!(audio.volume, Some(0.2));
        }
        other => panic!("expected audio, got {:?}", other),
    }
}
