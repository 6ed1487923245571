//! Main Entrypoint for Viral or Fail
//!
//! This binary is responsible for:
//! 1. Parsing flags and loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Building the LLM client and the three game agents.
//! 4. Fetching trends and collecting the player's topic and platform.
//! 5. Playing one round and handling Ctrl+C.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use viral_core::{
    agent::{AlgorithmSimulator, AudiencePersona, ContentCreator},
    llm_client::{LLMClient, OpenAICompatibleClient},
    persona::Persona,
    platform::RubricTable,
    round::{GameLoop, GameSettings, RoundError},
    trends::{GoogleTrendsSource, OfflineSource, TrendSource, load_trends},
};
use viral_or_fail::{
    cli::Args,
    config::Config,
    terminal::{PromptError, TerminalUi},
};

/// Resolves when the player presses `Ctrl+C`. Never resolves if the handler
/// cannot be installed.
async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Received interrupt signal. Ending the game...");
}

async fn topic_from_trends(
    args: &Args,
    config: &Config,
    ui: &TerminalUi,
) -> Result<String, PromptError> {
    let source: Box<dyn TrendSource> = if args.offline {
        Box::new(OfflineSource)
    } else {
        match GoogleTrendsSource::new(config.trends_geo.clone(), config.request_timeout) {
            Ok(source) => Box::new(source),
            Err(e) => {
                warn!(error = %e, "Could not build trends client, using sample trends");
                Box::new(OfflineSource)
            }
        }
    };
    let trends = load_trends(source.as_ref(), args.trend_count).await;
    ui.select_trend(&trends)
}

async fn play(args: &Args, config: &Config, ui: &mut TerminalUi) -> anyhow::Result<()> {
    // --- 1. Build Agents ---
    let openai_config = OpenAIConfig::new()
        .with_api_key(&config.github_token)
        .with_api_base(&config.api_base);
    let llm_client: Arc<dyn LLMClient> = Arc::new(OpenAICompatibleClient::new(
        openai_config,
        config.chat_model.clone(),
        config.temperature,
        config.request_timeout,
    ));

    let settings = GameSettings {
        rubrics: RubricTable::builtin()
            .with_pass_threshold(config.pass_threshold)
            .context("Invalid pass threshold")?,
        ..GameSettings::default()
    };
    let game = GameLoop::new(
        settings,
        ContentCreator::new(llm_client.clone()),
        AlgorithmSimulator::new(llm_client.clone()),
        AudiencePersona::new(llm_client),
    );

    let persona = match args.persona {
        Some(kind) => Persona::of(kind),
        None => Persona::random(),
    };

    ui.banner();
    ui.agents_ready(persona);

    // --- 2. Player Choices ---
    let topic = match &args.topic {
        Some(topic) => topic.clone(),
        None => match topic_from_trends(args, config, ui).await {
            Ok(topic) => topic,
            Err(PromptError::Interrupted) => {
                ui.interrupted();
                return Ok(());
            }
            Err(e) => return Err(e).context("Failed to read trend selection"),
        },
    };
    let platform = match args.platform {
        Some(platform) => platform,
        None => match ui.select_platform(&game.settings().rubrics) {
            Ok(platform) => platform.context("No platforms are configured")?,
            Err(PromptError::Interrupted) => {
                ui.interrupted();
                return Ok(());
            }
            Err(e) => return Err(e).context("Failed to read platform selection"),
        },
    };
    let rubric = game.settings().rubrics.get(platform)?;
    ui.announce_choice(&topic, platform, &rubric.format_hint);

    // --- 3. Play the Round ---
    info!(
        topic = %topic,
        %platform,
        persona = persona.handle,
        model = %config.chat_model,
        "Starting round"
    );
    match game.run_round(&topic, platform, persona, ui).await {
        Ok(locked) => {
            info!(verdict = %locked.verdict(), "Round complete");
            ui.farewell();
        }
        Err(RoundError::Interrupted) => ui.interrupted(),
        Err(err) => {
            error!(error = %err, "Round aborted");
            ui.round_aborted(&err);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
    info!(
        model = %config.chat_model,
        api_base = %config.api_base,
        offline = args.offline,
        "Configuration loaded"
    );

    // --- 3. Run Until Done or Interrupted ---
    // The signal branch is polled first so the Ctrl+C handler is installed
    // before any menu blocks.
    let mut ui = TerminalUi::new();
    let finished = tokio::select! {
        biased;
        _ = interrupt_signal() => None,
        result = play(&args, &config, &mut ui) => Some(result),
    };

    match finished {
        Some(result) => result,
        None => {
            ui.interrupted();
            Ok(())
        }
    }
}
