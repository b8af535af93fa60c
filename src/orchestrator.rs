/*!
 * Request orchestration.
 *
 * One generation request runs through a fixed pipeline:
 *
 * 1. validate the request (no network call before this succeeds)
 * 2. ask the word source for word pairs          (network, cancellable)
 * 3. build the timeline and assemble the document (local, pure)
 * 4. submit the document to the renderer          (network, cancellable)
 *
 * Once the renderer has accepted a document the remote job keeps running;
 * cancelling afterwards only stops the local request.
 */

use log::{error, info, warn};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

use crate::app_config::{Config, DefaultsConfig, is_hex_color};
use crate::composition::{RenderSettings, Resolution, assemble};
use crate::errors::{GenerationError, ProviderError};
use crate::language_utils::{get_display_name, same_language};
use crate::providers::render::RenderClient;
use crate::render_service::{MovieStatus, RenderJobHandle, RenderService};
use crate::timeline::{
    MAX_WORD_COUNT, MIN_WORD_COUNT, TimingConfig, WordPair, build_timeline, derive_word_count,
};
use crate::voices::{VoiceAssignment, is_supported};
use crate::retry::Retrying;
use crate::word_source::{LlmWordSource, WordPairSource, WordQuery};

/// Longest accepted topic, in characters
pub const MAX_TOPIC_CHARS: usize = 200;

const WORD_SERVICE: &str = "Word generation";
const RENDER_SERVICE: &str = "Rendering service";

/// A video generation request as sent by a caller
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub topic: String,
    /// Explicit number of word pairs; wins over `duration_minutes`
    #[serde(default)]
    pub word_count: Option<i64>,
    /// Target video length, converted to a word count
    #[serde(default)]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub source_language: String,
    #[serde(default)]
    pub target_language: String,
    #[serde(default)]
    pub pause_between_words: Option<f64>,
    #[serde(default)]
    pub use_secondary_repeat: Option<bool>,
    #[serde(default)]
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub background_color: Option<String>,
}

/// A request that passed validation, with defaults filled in
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub topic: String,
    pub word_count: u32,
    pub source_language: String,
    pub target_language: String,
    pub timing: TimingConfig,
    pub voices: VoiceAssignment,
    pub settings: RenderSettings,
}

impl GenerationRequest {
    /// Check every field and resolve defaults
    pub fn validate(&self, defaults: &DefaultsConfig) -> Result<ValidatedRequest, GenerationError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(GenerationError::Validation("topic must not be empty".to_string()));
        }
        if topic.chars().count() > MAX_TOPIC_CHARS {
            return Err(GenerationError::Validation(format!(
                "topic must be at most {} characters",
                MAX_TOPIC_CHARS
            )));
        }

        for (field, code) in [
            ("sourceLanguage", &self.source_language),
            ("targetLanguage", &self.target_language),
        ] {
            if code.trim().is_empty() {
                return Err(GenerationError::Validation(format!("{} must not be empty", field)));
            }
            if !is_supported(code) {
                return Err(GenerationError::UnsupportedLanguage(format!("{} '{}'", field, code.trim())));
            }
        }
        if same_language(&self.source_language, &self.target_language) {
            return Err(GenerationError::Validation(
                "sourceLanguage and targetLanguage must differ".to_string(),
            ));
        }

        let timing = TimingConfig::new(
            self.pause_between_words.unwrap_or(defaults.pause_between_words),
            self.use_secondary_repeat.unwrap_or(defaults.use_secondary_repeat),
        )?;

        let word_count = self.resolve_word_count(&timing, defaults)?;

        let mut settings = defaults.render_settings();
        if let Some(resolution) = self.resolution {
            settings.resolution = resolution;
        }
        if let Some(color) = &self.background_color {
            let color = color.trim();
            if !is_hex_color(color) {
                return Err(GenerationError::Validation(format!(
                    "backgroundColor must look like #rgb or #rrggbb, got '{}'",
                    color
                )));
            }
            settings.background_color = color.to_string();
        }
        settings.comment = format!(
            "Vocabulary: {} ({} -> {}), {} words",
            topic,
            get_display_name(&self.source_language),
            get_display_name(&self.target_language),
            word_count
        );

        Ok(ValidatedRequest {
            topic: topic.to_string(),
            word_count,
            source_language: self.source_language.trim().to_string(),
            target_language: self.target_language.trim().to_string(),
            voices: VoiceAssignment::for_languages(&self.source_language, &self.target_language),
            timing,
            settings,
        })
    }

    fn resolve_word_count(&self, timing: &TimingConfig, defaults: &DefaultsConfig) -> Result<u32, GenerationError> {
        if let Some(count) = self.word_count {
            if count < i64::from(MIN_WORD_COUNT) || count > i64::from(MAX_WORD_COUNT) {
                return Err(GenerationError::Validation(format!(
                    "wordCount must be between {} and {}, got {}",
                    MIN_WORD_COUNT, MAX_WORD_COUNT, count
                )));
            }
            return Ok(count as u32);
        }

        if let Some(minutes) = self.duration_minutes {
            if !minutes.is_finite() || minutes <= 0.0 {
                return Err(GenerationError::Validation(format!(
                    "durationMinutes must be a positive number, got {}",
                    minutes
                )));
            }
            return Ok(derive_word_count(minutes, timing));
        }

        Ok(defaults.word_count)
    }
}

/// A successfully submitted video
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    /// Short id tagging this request in the logs
    pub request_id: String,
    pub job: RenderJobHandle,
    pub word_pairs: Vec<WordPair>,
    /// Length of the submitted video in seconds
    pub timeline_duration: f64,
    /// Number of pairs asked for; `word_pairs` may be shorter
    pub word_count: u32,
}

/// Cancels the requests holding the matching [`CancelSignal`]
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

/// Caller-supplied cancellation, checked at every network call
#[derive(Debug, Clone)]
pub struct CancelSignal {
    receiver: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A linked handle/signal pair
    pub fn new() -> (CancelHandle, CancelSignal) {
        let (sender, receiver) = watch::channel(false);
        (CancelHandle { sender }, CancelSignal { receiver })
    }

    /// A signal that never fires
    pub fn never() -> Self {
        let (_sender, receiver) = watch::channel(false);
        Self { receiver }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once cancelled; pends forever if the handle is gone
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        let handle_dropped = receiver.wait_for(|cancelled| *cancelled).await.is_err();
        if handle_dropped {
            std::future::pending::<()>().await;
        }
    }
}

/// Race a collaborator call against cancellation
async fn until_cancelled<T>(
    cancel: &CancelSignal,
    stage: &'static str,
    service: &str,
    call: impl Future<Output = Result<T, ProviderError>>,
) -> Result<T, GenerationError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(GenerationError::Cancelled { stage }),
        result = call => result.map_err(|e| GenerationError::from_provider(service, e)),
    }
}

/// Runs generation requests against the two collaborators
pub struct Orchestrator {
    words: Arc<dyn WordPairSource>,
    renderer: Arc<dyn RenderService>,
    defaults: DefaultsConfig,
}

impl Orchestrator {
    pub fn new(
        words: Arc<dyn WordPairSource>,
        renderer: Arc<dyn RenderService>,
        defaults: DefaultsConfig,
    ) -> Self {
        Self {
            words,
            renderer,
            defaults,
        }
    }

    /// Wire the configured language model and renderer, each behind its retry policy
    pub fn from_config(config: &Config) -> Self {
        let word_config = &config.word_generation;
        let words = Retrying::new(
            LlmWordSource::from_config(word_config),
            word_config.retry.policy(word_config.get_timeout_secs()),
        );

        let rendering = &config.rendering;
        let renderer = Retrying::new(
            RenderClient::new(rendering.api_key.clone(), rendering.endpoint.clone(), rendering.timeout_secs),
            rendering.retry.policy(rendering.timeout_secs),
        );

        Self::new(Arc::new(words), Arc::new(renderer), config.defaults.clone())
    }

    pub fn defaults(&self) -> &DefaultsConfig {
        &self.defaults
    }

    /// Generate and submit a vocabulary video.
    ///
    /// Validation failures are returned before any network call. Collaborator
    /// failures are logged here and returned, never retried at this layer.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancelSignal,
    ) -> Result<GenerationOutcome, GenerationError> {
        let request_id = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();

        let result = self.run_pipeline(&request_id, request, cancel).await;
        match &result {
            Ok(outcome) => info!(
                "[{}] Render job {} submitted ({} words, {:.1}s)",
                request_id,
                outcome.job.job_id,
                outcome.word_pairs.len(),
                outcome.timeline_duration
            ),
            Err(e) if e.is_rejection() => warn!("[{}] Request rejected: {}", request_id, e),
            Err(GenerationError::Cancelled { stage }) => info!("[{}] Cancelled while {}", request_id, stage),
            Err(e) => error!("[{}] Generation failed: {}", request_id, e),
        }
        result
    }

    async fn run_pipeline(
        &self,
        request_id: &str,
        request: &GenerationRequest,
        cancel: &CancelSignal,
    ) -> Result<GenerationOutcome, GenerationError> {
        let validated = request.validate(&self.defaults)?;
        info!(
            "[{}] Generating {} words about '{}' ({} -> {})",
            request_id, validated.word_count, validated.topic, validated.source_language, validated.target_language
        );

        let query = WordQuery {
            topic: validated.topic.clone(),
            count: validated.word_count,
            source_language: validated.source_language.clone(),
            target_language: validated.target_language.clone(),
        };
        let word_pairs = until_cancelled(
            cancel,
            "generating words",
            WORD_SERVICE,
            self.words.generate_pairs(&query),
        )
        .await?;

        let timeline = build_timeline(&word_pairs, &validated.timing, &validated.voices)?;
        let timeline_duration = timeline.total_duration;
        let document = assemble(timeline, &validated.settings);

        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled { stage: "submitting the video" });
        }
        let job = until_cancelled(
            cancel,
            "submitting the video",
            RENDER_SERVICE,
            self.renderer.submit(&document),
        )
        .await?;

        Ok(GenerationOutcome {
            request_id: request_id.to_string(),
            job,
            word_pairs,
            timeline_duration,
            word_count: validated.word_count,
        })
    }

    /// Current state of a render job
    pub async fn status(&self, job_id: &str, cancel: &CancelSignal) -> Result<MovieStatus, GenerationError> {
        let job_id = job_id.trim();
        if job_id.is_empty() {
            return Err(GenerationError::Validation("job id must not be empty".to_string()));
        }

        until_cancelled(cancel, "querying the status", RENDER_SERVICE, self.renderer.status(job_id))
            .await
            .inspect_err(|e| error!("Status query for {} failed: {}", job_id, e))
    }
}
