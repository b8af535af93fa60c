/*!
 * # vocabreel - bilingual vocabulary videos
 *
 * A Rust library and service that turns a topic and a language pair into a
 * vocabulary-learning video. A language model proposes word pairs, the pairs
 * are laid out on a spoken and captioned timeline, and the resulting
 * composition document is handed to a remote video renderer.
 *
 * ## Features
 *
 * - Word pair generation using various AI providers:
 *   - Ollama (local LLM)
 *   - OpenAI API (and OpenAI-compatible servers such as LM Studio)
 *   - Anthropic API
 * - Deterministic timeline layout with configurable pauses and an optional
 *   repeat of the target word
 * - Neural voice selection for 40+ languages and regional variants
 * - Remote rendering with job status polling
 * - HTTP API and command line interface
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `voices`: Language code to voice id table
 * - `language_utils`: ISO language code names and the language catalog
 * - `timeline`: Cue timing for a list of word pairs
 * - `composition`: Renderer document assembly
 * - `word_source`: Word pair generation and response parsing
 * - `render_service`: Rendering collaborator interface and wire types
 * - `providers`: Client implementations for the external services:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::render`: Movie rendering API client
 * - `retry`: Timeout and retry decorator for collaborators
 * - `orchestrator`: Request validation and the generation pipeline
 * - `server`: HTTP routes
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod composition;
pub mod errors;
pub mod language_utils;
pub mod orchestrator;
pub mod providers;
pub mod render_service;
pub mod retry;
pub mod server;
pub mod timeline;
pub mod voices;
pub mod word_source;

// Re-export main types for easier usage
pub use app_config::Config;
pub use composition::{CompositionDocument, RenderSettings, Resolution, assemble};
pub use errors::{AppError, GenerationError, ProviderError};
pub use language_utils::{get_language_name, language_catalog};
pub use orchestrator::{CancelHandle, CancelSignal, GenerationOutcome, GenerationRequest, Orchestrator};
pub use render_service::{MovieStatus, RenderJobHandle, RenderService, RenderState};
pub use timeline::{Timeline, TimingConfig, WordPair, build_timeline, derive_word_count};
pub use voices::{VoiceAssignment, is_supported, resolve_voice};
pub use word_source::{WordPairSource, WordQuery};
