use anyhow::{Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::composition::{Quality, RenderSettings, Resolution};
use crate::errors::AppError;
use crate::retry::RetryPolicy;
use crate::timeline::{MAX_PAUSE_SECONDS, MAX_WORD_COUNT, MIN_PAUSE_SECONDS, MIN_WORD_COUNT};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Word pair generation (language model) settings
    #[serde(default)]
    pub word_generation: WordGenerationConfig,

    /// Rendering service settings
    #[serde(default)]
    pub rendering: RenderingConfig,

    /// Values used when a request leaves them out
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Word generation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WordProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl WordProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    /// Whether the hosted API refuses requests without a key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }
}

// Implement Display trait for WordProvider
impl std::fmt::Display for WordProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for WordProvider
impl std::str::FromStr for WordProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: WordProvider) -> Self {
        let (model, endpoint, timeout_secs) = match provider_type {
            WordProvider::Ollama => (default_ollama_model(), default_ollama_endpoint(), default_ollama_timeout_secs()),
            WordProvider::OpenAI => (default_openai_model(), default_openai_endpoint(), default_timeout_secs()),
            WordProvider::Anthropic => (default_anthropic_model(), default_anthropic_endpoint(), default_timeout_secs()),
            WordProvider::LMStudio => (default_lmstudio_model(), default_lmstudio_endpoint(), default_ollama_timeout_secs()),
        };

        Self {
            provider_type: provider_type.to_lowercase_string(),
            model,
            api_key: String::new(),
            endpoint,
            timeout_secs,
        }
    }
}

/// Retry settings shared by both collaborators
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub max_retries: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_retry_count(),
            backoff_base_ms: default_retry_backoff_ms(),
        }
    }
}

impl RetryConfig {
    /// Retry policy bounding each attempt by `timeout_secs`
    pub fn policy(&self, timeout_secs: u64) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            self.backoff_base_ms,
            std::time::Duration::from_secs(timeout_secs),
        )
    }
}

/// HTTP server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin requests from any origin
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: true,
        }
    }
}

/// Word generation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WordGenerationConfig {
    /// Provider to use
    #[serde(default)]
    pub provider: WordProvider,

    /// Available providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Retry behaviour around each call
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for WordGenerationConfig {
    fn default() -> Self {
        Self {
            provider: WordProvider::default(),
            available_providers: vec![
                ProviderConfig::new(WordProvider::Ollama),
                ProviderConfig::new(WordProvider::OpenAI),
                ProviderConfig::new(WordProvider::Anthropic),
                ProviderConfig::new(WordProvider::LMStudio),
            ],
            temperature: default_temperature(),
            retry: RetryConfig::default(),
        }
    }
}

/// Rendering service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RenderingConfig {
    /// API base URL
    #[serde(default = "default_render_endpoint")]
    pub endpoint: String,

    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry behaviour around each call
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_render_endpoint(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            retry: RetryConfig::default(),
        }
    }
}

/// Defaults applied to requests
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DefaultsConfig {
    /// Used when neither a word count nor a duration is given
    #[serde(default = "default_word_count")]
    pub word_count: u32,

    #[serde(default = "default_pause_between_words")]
    pub pause_between_words: f64,

    #[serde(default)]
    pub use_secondary_repeat: bool,

    #[serde(default)]
    pub resolution: Resolution,

    #[serde(default)]
    pub quality: Quality,

    /// Let the renderer reuse identical movies
    #[serde(default = "default_true")]
    pub cache: bool,

    #[serde(default = "default_background_color")]
    pub background_color: String,

    /// Speech engine the voice ids belong to
    #[serde(default = "default_voice_model")]
    pub voice_model: String,

    /// Optional music bed under every video
    #[serde(default)]
    pub background_audio_url: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            word_count: default_word_count(),
            pause_between_words: default_pause_between_words(),
            use_secondary_repeat: false,
            resolution: Resolution::default(),
            quality: Quality::default(),
            cache: true,
            background_color: default_background_color(),
            voice_model: default_voice_model(),
            background_audio_url: None,
        }
    }
}

impl DefaultsConfig {
    /// Render settings before per-request overrides
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            resolution: self.resolution,
            quality: self.quality,
            cache: self.cache,
            background_color: self.background_color.clone(),
            voice_model: self.voice_model.clone(),
            comment: String::new(),
            background_audio_url: self.background_audio_url.clone(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ollama_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.7
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_word_count() -> u32 {
    10
}

fn default_pause_between_words() -> f64 {
    1.0
}

fn default_background_color() -> String {
    "#1e1e2e".to_string()
}

fn default_voice_model() -> String {
    "azure".to_string()
}

fn default_render_endpoint() -> String {
    "https://api.json2video.com/v2".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_lmstudio_endpoint() -> String {
    // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
    "http://localhost:1234/v1".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_lmstudio_model() -> String {
    // Placeholder; users should set to the loaded model name in LM Studio
    "local-model".to_string()
}

/// Whether `color` is `#rgb` or `#rrggbb`
pub fn is_hex_color(color: &str) -> bool {
    let Some(digits) = color.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

impl Config {
    /// Load the configuration file, writing a default one if it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self, AppError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            return serde_json::from_str(&contents).map_err(|e| {
                AppError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
            });
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .map_err(|e| AppError::Config(format!("Failed to serialize default config: {}", e)))?;
        std::fs::write(path, config_json)?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let provider = &self.word_generation.provider;
        if provider.requires_api_key() && self.word_generation.get_api_key().is_empty() {
            return Err(anyhow!("An API key is required for the {} provider", provider.display_name()));
        }

        if self.rendering.api_key.trim().is_empty() {
            return Err(anyhow!("Rendering API key is required"));
        }

        let defaults = &self.defaults;
        if !(MIN_WORD_COUNT..=MAX_WORD_COUNT).contains(&defaults.word_count) {
            return Err(anyhow!(
                "Default word count must be between {} and {}",
                MIN_WORD_COUNT, MAX_WORD_COUNT
            ));
        }

        if !(MIN_PAUSE_SECONDS..=MAX_PAUSE_SECONDS).contains(&defaults.pause_between_words) {
            return Err(anyhow!(
                "Default pause must be between {} and {} seconds",
                MIN_PAUSE_SECONDS, MAX_PAUSE_SECONDS
            ));
        }

        if !is_hex_color(&defaults.background_color) {
            return Err(anyhow!("Invalid default background color: {}", defaults.background_color));
        }

        Ok(())
    }
}

impl WordGenerationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        // Default fallback based on provider type
        match self.provider {
            WordProvider::Ollama => default_ollama_model(),
            WordProvider::OpenAI => default_openai_model(),
            WordProvider::Anthropic => default_anthropic_model(),
            WordProvider::LMStudio => default_lmstudio_model(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        // Default fallback based on provider type
        match self.provider {
            WordProvider::Ollama => default_ollama_endpoint(),
            WordProvider::OpenAI => default_openai_endpoint(),
            WordProvider::Anthropic => default_anthropic_endpoint(),
            WordProvider::LMStudio => default_lmstudio_endpoint(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(default_timeout_secs)
    }

    /// Replace the API key of the active provider
    pub fn set_api_key(&mut self, api_key: String) {
        let provider_str = self.provider.to_lowercase_string();
        match self.available_providers.iter_mut().find(|p| p.provider_type == provider_str) {
            Some(provider_config) => provider_config.api_key = api_key,
            None => {
                let mut provider_config = ProviderConfig::new(self.provider.clone());
                provider_config.api_key = api_key;
                self.available_providers.push(provider_config);
            }
        }
    }
}
