use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sprachgenerator::cli::{format_accents, format_voices, Cli, Command, SpeakArgs};
use sprachgenerator::controllers::{catalog::CatalogController, speech::SpeechController};
use sprachgenerator::domain::catalog::Catalog;
use sprachgenerator::domain::speech::{GenerationOutcome, SpeechOrchestrator};
use sprachgenerator::infrastructure::audio::{AudioSink, CommandSink, WavFileSink};
use sprachgenerator::infrastructure::config::{Config, LogFormat};
use sprachgenerator::infrastructure::http::{create_router, start_http_server};
use sprachgenerator::infrastructure::repositories::GeminiSynthesisRepository;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    let catalog = Arc::new(load_catalog(&config)?);

    match cli.command {
        Command::Serve => serve(config, catalog).await,
        Command::Speak(args) => speak(config, catalog, args).await,
        Command::Voices { gender } => {
            println!("{}", format_voices(&catalog, gender.map(Into::into)));
            Ok(())
        }
        Command::Accents => {
            println!("{}", format_accents(&catalog));
            Ok(())
        }
    }
}

async fn serve(config: Config, catalog: Arc<Catalog>) -> anyhow::Result<()> {
    tracing::info!(
        "Starting sprachgenerator on {}:{}",
        config.host,
        config.port
    );

    let sink = create_sink(&config, config.output_dir.as_deref());
    let orchestrator = Arc::new(create_orchestrator(&config, sink)?);

    tracing::info!("Instantiating controllers...");
    let speech_controller = Arc::new(SpeechController::new(orchestrator, catalog.clone()));
    let catalog_controller = Arc::new(CatalogController::new(catalog));

    let app = create_router(speech_controller, catalog_controller);
    start_http_server(&config, app).await
}

async fn speak(config: Config, catalog: Arc<Catalog>, args: SpeakArgs) -> anyhow::Result<()> {
    let request = args.to_request(&catalog, &config.speaker_labels())?;
    let generation_config = request.resolve(&catalog)?;

    let output_dir = args.output.as_deref().or(config.output_dir.as_deref());
    let sink = create_sink(&config, output_dir);
    let orchestrator = create_orchestrator(&config, sink)?;

    match orchestrator.generate_speech(generation_config).await {
        Ok(GenerationOutcome::Playing { playback, .. }) => {
            tokio::select! {
                result = playback.finished() => result?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted, stopping playback");
                    playback.stop();
                }
            }
            Ok(())
        }
        Ok(GenerationOutcome::Superseded { .. }) => Ok(()),
        Err(e) => {
            eprintln!("{}", e.user_message());
            Err(e.into())
        }
    }
}

fn load_catalog(config: &Config) -> anyhow::Result<Catalog> {
    match &config.catalog_path {
        Some(path) => Catalog::from_json_file(path)
            .with_context(|| format!("failed to load catalog from {}", path.display())),
        None => Ok(Catalog::builtin()),
    }
}

fn create_sink(config: &Config, output_dir: Option<&Path>) -> Arc<dyn AudioSink> {
    match output_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Writing audio to WAV files");
            Arc::new(WavFileSink::new(dir))
        }
        None => {
            tracing::info!(
                program = %config.player_command,
                args = ?config.player_args,
                "Playing audio through external player"
            );
            Arc::new(CommandSink::new(
                config.player_command.clone(),
                config.player_args.clone(),
            ))
        }
    }
}

fn create_orchestrator(
    config: &Config,
    sink: Arc<dyn AudioSink>,
) -> anyhow::Result<SpeechOrchestrator> {
    let repository = GeminiSynthesisRepository::new(
        config.require_api_key()?.to_string(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
        config.synthesis_timeout,
    )?;
    tracing::info!(model = %config.gemini_model, "Gemini synthesis client initialized");

    Ok(SpeechOrchestrator::new(
        Arc::new(repository),
        sink,
        config.orchestrator_settings(),
    ))
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sprachgenerator=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}
