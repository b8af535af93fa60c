/*!
 * Tests for cancellation and the retry decorator
 */

use std::sync::Arc;
use std::time::Duration;

use vocabreel::app_config::DefaultsConfig;
use vocabreel::errors::GenerationError;
use vocabreel::orchestrator::{CancelSignal, GenerationRequest, Orchestrator};
use vocabreel::render_service::RenderService;
use vocabreel::retry::{RetryPolicy, Retrying};
use vocabreel::word_source::{WordPairSource, WordQuery};

use crate::common::mock_services::{MockErrorType, MockRenderer, MockWordSource};
use crate::common::{cat_dog_pairs, init_logger};

fn request() -> GenerationRequest {
    GenerationRequest {
        topic: "animals".to_string(),
        word_count: Some(2),
        source_language: "en".to_string(),
        target_language: "ar".to_string(),
        ..Default::default()
    }
}

fn query() -> WordQuery {
    WordQuery {
        topic: "animals".to_string(),
        count: 2,
        source_language: "en".to_string(),
        target_language: "ar".to_string(),
    }
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(3, 1, Duration::from_millis(500))
}

/// Test cancelling while words are being generated
#[tokio::test]
async fn test_generate_withCancelDuringWordGeneration_shouldStopBeforeRendering() {
    init_logger();
    let words = Arc::new(MockWordSource::new(cat_dog_pairs()).with_delay(Duration::from_secs(5)));
    let renderer = Arc::new(MockRenderer::new("never"));
    let orchestrator = Orchestrator::new(words.clone(), renderer.clone(), DefaultsConfig::default());

    let (handle, cancel) = CancelSignal::new();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    });

    let started = std::time::Instant::now();
    let result = orchestrator.generate(&request(), &cancel).await;

    assert!(matches!(result, Err(GenerationError::Cancelled { stage: "generating words" })));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(renderer.submitted().is_empty());
}

/// Test cancelling while the renderer is answering the submission
#[tokio::test]
async fn test_generate_withCancelDuringSubmit_shouldReturnCancelledAtSubmitStage() {
    init_logger();
    let words = Arc::new(MockWordSource::new(cat_dog_pairs()));
    let renderer = Arc::new(MockRenderer::new("slow-job").with_submit_delay(Duration::from_secs(5)));
    let orchestrator = Orchestrator::new(words.clone(), renderer.clone(), DefaultsConfig::default());

    let (handle, cancel) = CancelSignal::new();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    });

    let started = std::time::Instant::now();
    let result = orchestrator.generate(&request(), &cancel).await;

    assert!(matches!(
        result,
        Err(GenerationError::Cancelled { stage: "submitting the video" })
    ));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(words.call_count(), 1);
    assert_eq!(renderer.submitted().len(), 1);
}

/// Test cancelling after the renderer accepted the job leaves the job in place
#[tokio::test]
async fn test_generate_withCancelAfterSubmit_shouldKeepAcceptedJob() {
    let words = Arc::new(MockWordSource::new(cat_dog_pairs()));
    let renderer = Arc::new(MockRenderer::new("job-7"));
    let orchestrator = Orchestrator::new(words, renderer.clone(), DefaultsConfig::default());

    let (handle, cancel) = CancelSignal::new();
    let outcome = orchestrator.generate(&request(), &cancel).await.unwrap();
    handle.cancel();

    assert_eq!(outcome.job.job_id, "job-7");
    assert_eq!(renderer.submitted().len(), 1);
    let status = orchestrator.status("job-7", &CancelSignal::never()).await.unwrap();
    assert_eq!(status.status, vocabreel::render_service::RenderState::Pending);
    assert_eq!(renderer.status_queries(), 1);
}

/// Test an already cancelled signal stops the request at the first network call
#[tokio::test]
async fn test_generate_withCancelledSignal_shouldReturnCancelled() {
    let words = Arc::new(MockWordSource::new(cat_dog_pairs()));
    let renderer = Arc::new(MockRenderer::new("never"));
    let orchestrator = Orchestrator::new(words, renderer.clone(), DefaultsConfig::default());

    let (handle, cancel) = CancelSignal::new();
    handle.cancel();

    let result = orchestrator.generate(&request(), &cancel).await;
    assert!(matches!(result, Err(GenerationError::Cancelled { .. })));
    assert!(renderer.submitted().is_empty());
}

/// Test validation still wins over cancellation
#[tokio::test]
async fn test_generate_withCancelledSignalAndBadRequest_shouldReportValidation() {
    let words = Arc::new(MockWordSource::new(cat_dog_pairs()));
    let renderer = Arc::new(MockRenderer::new("never"));
    let orchestrator = Orchestrator::new(words, renderer, DefaultsConfig::default());

    let (handle, cancel) = CancelSignal::new();
    handle.cancel();
    let mut bad = request();
    bad.topic.clear();

    let result = orchestrator.generate(&bad, &cancel).await;
    assert!(matches!(result, Err(GenerationError::Validation(_))));
}

/// Test a dropped handle never cancels
#[tokio::test]
async fn test_cancelSignal_withDroppedHandle_shouldNeverFire() {
    let (handle, cancel) = CancelSignal::new();
    drop(handle);

    let fired = tokio::time::timeout(Duration::from_millis(50), cancel.cancelled()).await;
    assert!(fired.is_err());
    assert!(!cancel.is_cancelled());
}

/// Test transient word source failures are retried
#[tokio::test]
async fn test_retrying_withFlakyWordSource_shouldSucceedAfterRetries() {
    let source = Retrying::new(
        MockWordSource::flaky(cat_dog_pairs(), MockErrorType::Connection, 2),
        fast_policy(),
    );

    let pairs = source.generate_pairs(&query()).await.unwrap();
    assert_eq!(pairs, cat_dog_pairs());
    assert_eq!(source.inner().call_count(), 3);
}

/// Test permanent failures are returned at once
#[tokio::test]
async fn test_retrying_withAuthFailure_shouldNotRetry() {
    let source = Retrying::new(MockWordSource::failing(MockErrorType::Auth), fast_policy());

    assert!(source.generate_pairs(&query()).await.is_err());
    assert_eq!(source.inner().call_count(), 1);
}

/// Test the attempt timeout applies to a hanging source
#[tokio::test]
async fn test_retrying_withHangingSource_shouldTimeOutEachAttempt() {
    let policy = RetryPolicy::new(1, 1, Duration::from_millis(20));
    let source = Retrying::new(
        MockWordSource::new(cat_dog_pairs()).with_delay(Duration::from_secs(5)),
        policy,
    );

    let result = source.generate_pairs(&query()).await;
    assert!(matches!(result, Err(vocabreel::ProviderError::Timeout(_))));
    assert_eq!(source.inner().call_count(), 2);
}

/// Test submissions that reached the renderer are not repeated
#[tokio::test]
async fn test_retrying_withRendererServerError_shouldSubmitOnce() {
    let renderer = Retrying::new(MockRenderer::failing(MockErrorType::Api), fast_policy());
    let document = vocabreel::CompositionDocument {
        comment: String::new(),
        resolution: Default::default(),
        quality: Default::default(),
        cache: true,
        scenes: Vec::new(),
    };

    assert!(renderer.submit(&document).await.is_err());
    assert_eq!(renderer.inner().submitted().len(), 1);
}

/// Test submissions that never connected are retried
#[tokio::test]
async fn test_retrying_withRendererConnectionError_shouldRetrySubmit() {
    let renderer = Retrying::new(MockRenderer::failing(MockErrorType::Connection), fast_policy());
    let document = vocabreel::CompositionDocument {
        comment: String::new(),
        resolution: Default::default(),
        quality: Default::default(),
        cache: true,
        scenes: Vec::new(),
    };

    assert!(renderer.submit(&document).await.is_err());
    assert_eq!(renderer.inner().submitted().len(), 4);
}
