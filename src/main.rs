use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use interview_agent::agent::{ChatAgent, ConversationalAgent, InterviewToolbox};
use interview_agent::session::{MemorySessionStore, SessionStore};
use interview_agent::stt::{AssemblyAiConnector, SttConfig, SttConnector};
use interview_agent::tts::{OpenAiSpeech, SpeechBackend};
use interview_agent::{create_router, AppState, Config};
use tracing::info;

#[derive(Parser)]
#[command(name = "interview-agent", about = "Real-time voice interview agent")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/interview-agent")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v0.1.0", cfg.service.name);

    let assemblyai_key = std::env::var("ASSEMBLYAI_API_KEY").unwrap_or_default();
    let openai_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();

    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());

    let agent: Arc<dyn ConversationalAgent> = Arc::new(ChatAgent::new(
        cfg.agent.base_url.clone(),
        openai_key.clone(),
        cfg.agent.model.clone(),
        InterviewToolbox::new(Arc::clone(&store)),
    )?);

    let speech: Arc<dyn SpeechBackend> =
        Arc::new(OpenAiSpeech::new(cfg.tts.base_url.clone(), openai_key)?);

    let stt: Arc<dyn SttConnector> = Arc::new(AssemblyAiConnector::new(SttConfig {
        url: cfg.stt.url.clone(),
        api_key: assemblyai_key,
        sample_rate: cfg.stt.sample_rate,
        format_turns: true,
    })?);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);

    let state = AppState {
        config: Arc::new(cfg),
        store,
        agent,
        speech,
        stt,
    };

    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP server listening on {addr}");

    axum::serve(listener, router)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
