/*!
 * Tests for generation request validation
 */

use vocabreel::app_config::DefaultsConfig;
use vocabreel::composition::Resolution;
use vocabreel::errors::GenerationError;
use vocabreel::orchestrator::{GenerationRequest, MAX_TOPIC_CHARS};

fn request() -> GenerationRequest {
    GenerationRequest {
        topic: "animals".to_string(),
        source_language: "en".to_string(),
        target_language: "ar".to_string(),
        ..Default::default()
    }
}

fn is_validation(result: Result<vocabreel::orchestrator::ValidatedRequest, GenerationError>) -> bool {
    matches!(result, Err(GenerationError::Validation(_)))
}

/// Test word count boundaries
#[test]
fn test_validate_withWordCountBounds_shouldAcceptOnlyOneToHundred() {
    let defaults = DefaultsConfig::default();
    for (count, accepted) in [(0, false), (1, true), (100, true), (101, false), (-5, false)] {
        let mut req = request();
        req.word_count = Some(count);
        let result = req.validate(&defaults);
        assert_eq!(result.is_ok(), accepted, "wordCount {}", count);
        if !accepted {
            assert!(is_validation(result));
        }
    }
}

/// Test pause boundaries
#[test]
fn test_validate_withPauseBounds_shouldAcceptOnlyZeroToTen() {
    let defaults = DefaultsConfig::default();
    for (pause, accepted) in [(-0.01, false), (0.0, true), (10.0, true), (10.01, false), (f64::NAN, false)] {
        let mut req = request();
        req.pause_between_words = Some(pause);
        assert_eq!(req.validate(&defaults).is_ok(), accepted, "pause {}", pause);
    }
}

/// Test blank and oversized topics
#[test]
fn test_validate_withBadTopic_shouldReject() {
    let defaults = DefaultsConfig::default();

    let mut req = request();
    req.topic = "   ".to_string();
    assert!(is_validation(req.validate(&defaults)));

    req.topic = "x".repeat(MAX_TOPIC_CHARS + 1);
    assert!(is_validation(req.validate(&defaults)));

    req.topic = "  kitchen  ".to_string();
    assert_eq!(req.validate(&defaults).unwrap().topic, "kitchen");
}

/// Test languages without a voice are rejected with their own error
#[test]
fn test_validate_withUnsupportedLanguage_shouldRejectAsUnsupported() {
    let mut req = request();
    req.target_language = "zz".to_string();
    let result = req.validate(&DefaultsConfig::default());
    assert!(matches!(result, Err(GenerationError::UnsupportedLanguage(_))));
    assert!(result.unwrap_err().is_rejection());
}

/// Test identical languages are rejected after normalisation
#[test]
fn test_validate_withSameLanguageDifferentSpelling_shouldReject() {
    let mut req = request();
    req.source_language = "en_GB".to_string();
    req.target_language = "en-gb".to_string();
    assert!(is_validation(req.validate(&DefaultsConfig::default())));

    req.target_language = "en-us".to_string();
    assert!(req.validate(&DefaultsConfig::default()).is_ok());
}

/// Test word count resolution order
#[test]
fn test_validate_withWordCountAndDuration_shouldPreferWordCount() {
    let defaults = DefaultsConfig::default();

    let mut req = request();
    req.word_count = Some(7);
    req.duration_minutes = Some(5.0);
    assert_eq!(req.validate(&defaults).unwrap().word_count, 7);

    req.word_count = None;
    req.pause_between_words = Some(0.0);
    req.use_secondary_repeat = Some(false);
    req.duration_minutes = Some(1.0);
    assert_eq!(req.validate(&defaults).unwrap().word_count, 30);

    req.duration_minutes = None;
    assert_eq!(req.validate(&defaults).unwrap().word_count, defaults.word_count);
}

/// Test non-positive or non-finite durations
#[test]
fn test_validate_withInvalidDuration_shouldReject() {
    let defaults = DefaultsConfig::default();
    for minutes in [0.0, -1.0, f64::INFINITY, f64::NAN] {
        let mut req = request();
        req.duration_minutes = Some(minutes);
        assert!(is_validation(req.validate(&defaults)), "duration {}", minutes);
    }
}

/// Test background color formats
#[test]
fn test_validate_withBackgroundColors_shouldAcceptShortAndLongHex() {
    let defaults = DefaultsConfig::default();
    for (color, accepted) in [("#fff", true), ("#1E1E2E", true), ("fff", false), ("#ggg", false), ("#abcd", false)] {
        let mut req = request();
        req.background_color = Some(color.to_string());
        assert_eq!(req.validate(&defaults).is_ok(), accepted, "color {}", color);
    }
}

/// Test per-request overrides land in the render settings
#[test]
fn test_validate_withOverrides_shouldApplyToSettings() {
    let mut req = request();
    req.resolution = Some(Resolution::Squared);
    req.background_color = Some("#112233".to_string());
    req.use_secondary_repeat = Some(true);

    let validated = req.validate(&DefaultsConfig::default()).unwrap();
    assert_eq!(validated.settings.resolution, Resolution::Squared);
    assert_eq!(validated.settings.background_color, "#112233");
    assert!(validated.timing.use_secondary_repeat);
    assert!(validated.settings.comment.contains("animals"));
}

/// Test the camelCase request body
#[test]
fn test_generationRequest_deserialize_shouldReadCamelCase() {
    let req: GenerationRequest = serde_json::from_str(
        r##"{"topic":"food","wordCount":12,"sourceLanguage":"en","targetLanguage":"fr",
            "pauseBetweenWords":0.5,"useSecondaryRepeat":true,"resolution":"hd","backgroundColor":"#000"}"##,
    )
    .unwrap();
    assert_eq!(req.word_count, Some(12));
    assert_eq!(req.pause_between_words, Some(0.5));
    assert_eq!(req.use_secondary_repeat, Some(true));
    assert_eq!(req.resolution, Some(Resolution::Hd));
}
