/*!
 * Tests for application configuration functionality
 */

use vocabreel::app_config::{Config, LogLevel, WordProvider};
use vocabreel::composition::{Quality, Resolution};
use vocabreel::retry::RetryPolicy;
use std::time::Duration;

use crate::common::{create_temp_dir, create_test_file};

fn valid_config() -> Config {
    let mut config = Config::default();
    config.rendering.api_key = "render-key".to_string();
    config
}

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert!(config.server.cors);

    assert_eq!(config.word_generation.provider, WordProvider::Ollama);
    assert_eq!(config.word_generation.get_model(), "llama3.2:3b");
    assert_eq!(config.word_generation.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.word_generation.retry.max_retries, 3);

    assert_eq!(config.rendering.endpoint, "https://api.json2video.com/v2");
    assert_eq!(config.rendering.timeout_secs, 30);

    assert_eq!(config.defaults.word_count, 10);
    assert_eq!(config.defaults.pause_between_words, 1.0);
    assert!(!config.defaults.use_secondary_repeat);
    assert_eq!(config.defaults.resolution, Resolution::FullHd);
    assert_eq!(config.defaults.quality, Quality::High);
    assert_eq!(config.defaults.background_color, "#1e1e2e");

    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = valid_config();
    assert!(config.validate().is_ok());

    // Rendering needs a key
    config.rendering.api_key = " ".to_string();
    assert!(config.validate().is_err());
    config.rendering.api_key = "render-key".to_string();

    // Hosted providers need a key, local ones don't
    config.word_generation.provider = WordProvider::Anthropic;
    assert!(config.validate().is_err());
    config.word_generation.set_api_key("sk-ant".to_string());
    assert!(config.validate().is_ok());
    config.word_generation.provider = WordProvider::LMStudio;
    assert!(config.validate().is_ok());

    config.defaults.word_count = 0;
    assert!(config.validate().is_err());
    config.defaults.word_count = 101;
    assert!(config.validate().is_err());
    config.defaults.word_count = 10;

    config.defaults.pause_between_words = 10.5;
    assert!(config.validate().is_err());
    config.defaults.pause_between_words = 1.0;

    config.defaults.background_color = "navy".to_string();
    assert!(config.validate().is_err());
}

/// Test a missing file is created with defaults
#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();
    assert!(path.exists());
    assert_eq!(config.defaults.word_count, 10);

    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.server.port, config.server.port);
    assert_eq!(reloaded.word_generation.available_providers.len(), 4);
}

/// Test partial files fall back to defaults field by field
#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(
        dir.path(),
        "conf.json",
        r#"{
            "word_generation": {
                "provider": "openai",
                "available_providers": [{"type": "openai", "model": "gpt-4o", "api_key": "sk-test"}]
            },
            "rendering": {"api_key": "render-key"},
            "defaults": {"pause_between_words": 2.0, "resolution": "squared"},
            "log_level": "debug"
        }"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();
    assert_eq!(config.word_generation.provider, WordProvider::OpenAI);
    assert_eq!(config.word_generation.get_model(), "gpt-4o");
    assert_eq!(config.word_generation.get_api_key(), "sk-test");
    assert_eq!(config.word_generation.get_endpoint(), "https://api.openai.com/v1");
    assert_eq!(config.word_generation.get_timeout_secs(), 30);
    assert_eq!(config.defaults.pause_between_words, 2.0);
    assert_eq!(config.defaults.resolution, Resolution::Squared);
    assert_eq!(config.defaults.word_count, 10);
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
}

/// Test malformed JSON is reported as a config error
#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(dir.path(), "conf.json", "{ not json").unwrap();
    assert!(Config::load_or_create(&path).is_err());
}

/// Test the provider name round trip used by the CLI
#[test]
fn test_wordProvider_fromStr_withKnownNames_shouldParse() {
    assert_eq!("LMStudio".parse::<WordProvider>().unwrap(), WordProvider::LMStudio);
    assert_eq!(WordProvider::Anthropic.to_string(), "anthropic");
    assert!("gemini".parse::<WordProvider>().is_err());
}

/// Test the retry section becomes a policy
#[test]
fn test_retryConfig_policy_shouldCarryTimeout() {
    let config = Config::default();
    let policy = config.rendering.retry.policy(config.rendering.timeout_secs);
    assert_eq!(policy, RetryPolicy::new(3, 1000, Duration::from_secs(30)));
}
