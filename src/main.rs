// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use vocabreel::app_config::{self, Config, WordProvider};
use vocabreel::composition::Resolution;
use vocabreel::language_utils::language_catalog;
use vocabreel::orchestrator::{CancelSignal, GenerationRequest, Orchestrator};
use vocabreel::render_service::RenderState;
use vocabreel::server;
use vocabreel::word_source::LlmWordSource;

/// CLI Wrapper for WordProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliWordProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
}

impl From<CliWordProvider> for WordProvider {
    fn from(cli_provider: CliWordProvider) -> Self {
        match cli_provider {
            CliWordProvider::Ollama => WordProvider::Ollama,
            CliWordProvider::OpenAI => WordProvider::OpenAI,
            CliWordProvider::Anthropic => WordProvider::Anthropic,
            CliWordProvider::LMStudio => WordProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Generate one video and print its render job id
    Generate(GenerateArgs),

    /// Show the state of a render job
    Status {
        /// Job id printed by `generate`
        #[arg(value_name = "JOB_ID")]
        job_id: String,
    },

    /// List supported languages and their voices
    Languages,

    /// Check that the word generation provider is reachable
    Check,

    /// Generate shell completions for vocabreel
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Topic of the vocabulary, e.g. "kitchen"
    #[arg(value_name = "TOPIC")]
    topic: String,

    /// Source language code (e.g., 'en', 'en-gb')
    #[arg(short, long)]
    source_language: String,

    /// Target language code (e.g., 'fr', 'es')
    #[arg(short, long)]
    target_language: String,

    /// Number of word pairs (1-100)
    #[arg(short, long, conflicts_with = "duration_minutes")]
    word_count: Option<i64>,

    /// Target video length in minutes, converted to a word count
    #[arg(short, long)]
    duration_minutes: Option<f64>,

    /// Silence after each spoken item, in seconds (0-10)
    #[arg(long)]
    pause: Option<f64>,

    /// Speak the target word a second time
    #[arg(long)]
    repeat: bool,

    /// Output resolution (sd, hd, full-hd, squared, instagram-story, ...)
    #[arg(long)]
    resolution: Option<Resolution>,

    /// Background color as #rgb or #rrggbb
    #[arg(long)]
    background_color: Option<String>,

    /// Poll the render job until it is done
    #[arg(long)]
    wait: bool,

    /// Seconds between status polls with --wait
    #[arg(long, default_value_t = 5, requires = "wait")]
    poll_interval: u64,
}

impl GenerateArgs {
    fn to_request(&self) -> GenerationRequest {
        GenerationRequest {
            topic: self.topic.clone(),
            word_count: self.word_count,
            duration_minutes: self.duration_minutes,
            source_language: self.source_language.clone(),
            target_language: self.target_language.clone(),
            pause_between_words: self.pause,
            use_secondary_repeat: self.repeat.then_some(true),
            resolution: self.resolution,
            background_color: self.background_color.clone(),
        }
    }
}

/// vocabreel - bilingual vocabulary videos
///
/// Generates vocabulary-learning videos: a language model proposes word pairs
/// for a topic, and a rendering service turns them into a spoken, captioned video.
#[derive(Parser, Debug)]
#[command(name = "vocabreel")]
#[command(version)]
#[command(about = "Bilingual vocabulary video generator")]
#[command(long_about = "vocabreel asks a language model for word pairs about a topic and renders them into a vocabulary video.

EXAMPLES:
    vocabreel serve                                   # Run the HTTP API
    vocabreel generate kitchen -s en -t fr            # Generate a video with default settings
    vocabreel generate animals -s en -t ar -w 20      # Ask for 20 word pairs
    vocabreel generate travel -s en-gb -t es -d 3     # Aim for a three minute video
    vocabreel generate food -s de -t it --wait        # Wait for the render to finish
    vocabreel status 2xL8Sk1u                         # Show a render job's state
    vocabreel languages                               # List supported languages
    vocabreel completions bash > vocabreel.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama3.2:3b)
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Word generation provider to use
    #[arg(short, long, value_enum, global = true)]
    provider: Option<CliWordProvider>,

    /// Model name to use for word generation
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// API key for the word generation provider
    #[arg(long, env = "VOCABREEL_LLM_API_KEY", hide_env_values = true, global = true)]
    llm_api_key: Option<String>,

    /// API key for the rendering service
    #[arg(long, env = "VOCABREEL_RENDER_API_KEY", hide_env_values = true, global = true)]
    render_api_key: Option<String>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn get_style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::get_style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; log::set_max_level does the filtering
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&level));
    }

    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(*shell, &mut cmd, "vocabreel", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Languages => {
            print_languages();
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate().context("Configuration validation failed")?;

            info!(
                "Word generation: {} - {}",
                config.word_generation.provider.display_name(),
                config.word_generation.get_model()
            );
            server::serve(&config.server, Orchestrator::from_config(&config)).await
        }
        Commands::Generate(args) => {
            config.validate().context("Configuration validation failed")?;
            run_generate(&config, &args).await
        }
        Commands::Status { job_id } => {
            if config.rendering.api_key.trim().is_empty() {
                return Err(anyhow!("Rendering API key is required"));
            }
            let orchestrator = Orchestrator::from_config(&config);
            let movie = orchestrator.status(&job_id, &CancelSignal::never()).await?;
            println!("{}: {:?}", job_id, movie.status);
            if let Some(url) = movie.url {
                println!("{}", url);
            }
            if let Some(message) = movie.message {
                println!("{}", message);
            }
            Ok(())
        }
        Commands::Check => {
            let provider = &config.word_generation.provider;
            let source = LlmWordSource::from_config(&config.word_generation);
            source
                .test_connection()
                .await
                .with_context(|| format!("{} is not reachable", provider.display_name()))?;
            info!(
                "{} is reachable ({})",
                provider.display_name(),
                config.word_generation.get_model()
            );
            Ok(())
        }
        Commands::Completions { .. } | Commands::Languages => Ok(()),
    }
}

/// Load the config file and apply command line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let config_path = Path::new(&cli.config_path);
    let mut config = Config::load_or_create(config_path)
        .with_context(|| format!("Failed to load config file: {}", config_path.display()))?;

    if let Some(provider) = &cli.provider {
        config.word_generation.provider = provider.clone().into();
    }

    if let Some(model) = &cli.model {
        let provider_str = config.word_generation.provider.to_lowercase_string();
        if let Some(provider_config) = config
            .word_generation
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            provider_config.model = model.clone();
        }
    }

    if let Some(api_key) = &cli.llm_api_key {
        config.word_generation.set_api_key(api_key.clone());
    }

    if let Some(api_key) = &cli.render_api_key {
        config.rendering.api_key = api_key.clone();
    }

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(level_filter(&config.log_level));
    }

    Ok(config)
}

fn print_languages() {
    for language in language_catalog() {
        println!("{:<8} {:<28} {}", language.code, language.name, language.voice);
    }
}

async fn run_generate(config: &Config, args: &GenerateArgs) -> Result<()> {
    let orchestrator = Orchestrator::from_config(config);
    let (cancel_handle, cancel) = CancelSignal::new();

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            cancel_handle.cancel();
        }
    });

    let result = generate_and_wait(&orchestrator, args, &cancel).await;
    interrupt.abort();
    result
}

async fn generate_and_wait(orchestrator: &Orchestrator, args: &GenerateArgs, cancel: &CancelSignal) -> Result<()> {
    let outcome = orchestrator.generate(&args.to_request(), cancel).await?;

    for pair in &outcome.word_pairs {
        println!("{} - {}", pair.source, pair.target);
    }
    println!();
    println!(
        "Job {} submitted ({} words, {:.1}s)",
        outcome.job.job_id,
        outcome.word_pairs.len(),
        outcome.timeline_duration
    );

    if !args.wait {
        return Ok(());
    }

    let job_id = outcome.job.job_id;
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!("Rendering {}", job_id));

    let poll_interval = Duration::from_secs(args.poll_interval.max(1));
    loop {
        let movie = match orchestrator.status(&job_id, cancel).await {
            Ok(movie) => movie,
            Err(e) => {
                spinner.abandon_with_message("Status query failed");
                return Err(e.into());
            }
        };

        match movie.status {
            RenderState::Done => {
                spinner.finish_with_message("Rendering done");
                println!("{}", movie.url.unwrap_or_default());
                return Ok(());
            }
            RenderState::Error => {
                spinner.abandon_with_message("Rendering failed");
                let message = movie.message.unwrap_or_else(|| "no details".to_string());
                error!("Render job {} failed: {}", job_id, message);
                return Err(anyhow!("Render job {} failed: {}", job_id, message));
            }
            state => spinner.set_message(format!("Rendering {} ({:?})", job_id, state)),
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                spinner.abandon_with_message("Stopped waiting");
                info!("Render job {} keeps running remotely", job_id);
                return Ok(());
            }
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}
