/*!
 * Word pair generation.
 *
 * Word pairs come from a language model asked for a JSON array of
 * `{"source": .., "target": ..}` objects. Models like to wrap their answer in
 * prose or code fences, so only the text between the first `[` and the last
 * `]` is parsed.
 */

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;

use crate::app_config::{WordGenerationConfig, WordProvider};
use crate::errors::ProviderError;
use crate::language_utils::get_display_name;
use crate::providers::Provider;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::timeline::WordPair;

/// What to ask the text generator for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordQuery {
    pub topic: String,
    pub count: u32,
    pub source_language: String,
    pub target_language: String,
}

/// Something that can produce ordered word pairs
#[async_trait]
pub trait WordPairSource: Send + Sync {
    /// Generate up to `query.count` word pairs about `query.topic`
    async fn generate_pairs(&self, query: &WordQuery) -> Result<Vec<WordPair>, ProviderError>;
}

/// Language model backend variants
#[derive(Debug)]
enum CompletionBackend {
    /// Ollama LLM service
    Ollama(Ollama),
    /// OpenAI API or an OpenAI-compatible server such as LM Studio
    OpenAI(OpenAI),
    /// Anthropic API service
    Anthropic(Anthropic),
}

/// Word pair source backed by a language model
#[derive(Debug)]
pub struct LlmWordSource {
    backend: CompletionBackend,
    model: String,
    temperature: f32,
}

const SYSTEM_PROMPT: &str = "You are a vocabulary teacher building flash cards. \
Answer with a JSON array only, no explanations.";

/// Rough token budget per requested pair
const TOKENS_PER_PAIR: u32 = 40;

impl LlmWordSource {
    /// Create a word source for the configured provider
    pub fn from_config(config: &WordGenerationConfig) -> Self {
        let model = config.get_model();
        let endpoint = config.get_endpoint();
        let timeout_secs = config.get_timeout_secs();

        let backend = match config.provider {
            WordProvider::Ollama => CompletionBackend::Ollama(Ollama::from_url(endpoint, timeout_secs)),
            WordProvider::OpenAI => CompletionBackend::OpenAI(OpenAI::new(
                config.get_api_key(),
                endpoint,
                model.clone(),
                timeout_secs,
            )),
            WordProvider::LMStudio => {
                // LM Studio often doesn't require an API key; use a default if empty
                let api_key = {
                    let k = config.get_api_key();
                    if k.is_empty() { "lm-studio".to_string() } else { k }
                };
                CompletionBackend::OpenAI(OpenAI::with_service_name(
                    "LM Studio",
                    api_key,
                    endpoint,
                    model.clone(),
                    timeout_secs,
                ))
            }
            WordProvider::Anthropic => CompletionBackend::Anthropic(Anthropic::new(
                config.get_api_key(),
                endpoint,
                model.clone(),
                timeout_secs,
            )),
        };

        Self {
            backend,
            model,
            temperature: config.temperature,
        }
    }

    /// Check the provider is reachable
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        match &self.backend {
            CompletionBackend::Ollama(client) => client.test_connection().await,
            CompletionBackend::OpenAI(client) => client.test_connection().await,
            CompletionBackend::Anthropic(client) => client.test_connection().await,
        }
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        match &self.backend {
            CompletionBackend::Ollama(client) => {
                let request = GenerationRequest::new(self.model.clone(), prompt)
                    .system(SYSTEM_PROMPT)
                    .temperature(self.temperature)
                    .num_predict(max_tokens);
                let response = client.complete(request).await?;
                Ok(Ollama::extract_text(&response))
            }
            CompletionBackend::OpenAI(client) => {
                let request = OpenAIRequest::new(self.model.clone())
                    .add_message("system", SYSTEM_PROMPT)
                    .add_message("user", prompt)
                    .temperature(self.temperature)
                    .max_tokens(max_tokens);
                let response = client.complete(request).await?;
                Ok(OpenAI::extract_text(&response))
            }
            CompletionBackend::Anthropic(client) => {
                let request = AnthropicRequest::new(self.model.clone(), max_tokens)
                    .system(SYSTEM_PROMPT)
                    .add_message("user", prompt)
                    .temperature(self.temperature);
                let response = client.complete(request).await?;
                Ok(Anthropic::extract_text(&response))
            }
        }
    }
}

#[async_trait]
impl WordPairSource for LlmWordSource {
    async fn generate_pairs(&self, query: &WordQuery) -> Result<Vec<WordPair>, ProviderError> {
        let prompt = build_prompt(query);
        let max_tokens = (query.count * TOKENS_PER_PAIR).max(256);
        debug!("Requesting {} word pairs about '{}' from {}", query.count, query.topic, self.model);

        let raw = self.complete(&prompt, max_tokens).await?;
        parse_word_pairs(&raw, query.count)
    }
}

/// Prompt asking for `query.count` pairs as a JSON array
pub fn build_prompt(query: &WordQuery) -> String {
    let source_name = get_display_name(&query.source_language);
    let target_name = get_display_name(&query.target_language);

    format!(
        "Give me {count} common {source} words about the topic \"{topic}\" together with \
         their {target} translation.\n\
         Return exactly {count} items as a JSON array of objects with the keys \"source\" \
         ({source} word) and \"target\" ({target} word), for example:\n\
         [{{\"source\": \"...\", \"target\": \"...\"}}]\n\
         Use single words or very short expressions, no duplicates, no numbering.",
        count = query.count,
        source = source_name,
        target = target_name,
        topic = query.topic.trim(),
    )
}

/// Case-insensitive string field lookup
fn field<'a>(object: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .and_then(|(_, v)| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Recover word pairs from a raw model answer.
///
/// At most `requested` pairs are returned. A shortfall is logged but
/// accepted; no pairs at all is a `ParseError`.
pub fn parse_word_pairs(raw: &str, requested: u32) -> Result<Vec<WordPair>, ProviderError> {
    let (Some(start), Some(end)) = (raw.find('['), raw.rfind(']')) else {
        return Err(ProviderError::ParseError(
            "no JSON array found in the word list response".to_string(),
        ));
    };
    if end < start {
        return Err(ProviderError::ParseError(
            "no JSON array found in the word list response".to_string(),
        ));
    }

    let items: Vec<Value> = serde_json::from_str(&raw[start..=end])
        .map_err(|e| ProviderError::ParseError(format!("invalid word list JSON: {}", e)))?;

    let mut pairs = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let parsed = item
            .as_object()
            .and_then(|object| Some(WordPair::new(field(object, "source")?, field(object, "target")?)));

        match parsed {
            Some(pair) => pairs.push(pair),
            None => warn!("Skipping malformed word list entry #{}: {}", index, item),
        }
    }

    if pairs.is_empty() {
        return Err(ProviderError::ParseError(
            "the word list response contained no usable word pairs".to_string(),
        ));
    }

    let requested = requested as usize;
    if pairs.len() < requested {
        warn!("Requested {} word pairs but only {} were generated", requested, pairs.len());
    } else if pairs.len() > requested {
        debug!("Dropping {} surplus word pairs", pairs.len() - requested);
        pairs.truncate(requested);
    }

    Ok(pairs)
}
