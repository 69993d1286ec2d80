use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use voice_agent::providers::{
    AssemblyAiClient, GeminiClient, MurfClient, ReplyGenerator, SpeechSynthesizer, SpeechToText,
};
use voice_agent::{create_router, AppState, Config, ProviderKeys, SessionStore};

#[derive(Debug, Parser)]
#[command(name = "voice-agent", about = "Conversational voice assistant backend")]
struct Args {
    /// Configuration file (without extension)
    #[arg(long, default_value = "config/voice-agent")]
    config: String,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Provider API keys may come from a .env file in development
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config))?;
    let port = args.port.unwrap_or(cfg.service.http.port);

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let state = build_state(&cfg);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", cfg.service.http.bind, port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", cfg.service.http.bind, port))?;

    info!("listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}: is another process using this port?"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("voice agent shut down");

    Ok(())
}

/// Construct the provider clients and shared state.
///
/// A missing credential leaves that client unset rather than aborting: the
/// process still starts, `/health` reports the subsystem unavailable, and
/// chat requests short-circuit to the fallback clip.
fn build_state(cfg: &Config) -> AppState {
    let keys = ProviderKeys::from_env();
    let timeout = Duration::from_secs(cfg.providers.request_timeout_secs);

    let stt: Option<Arc<dyn SpeechToText>> = match &keys.assemblyai {
        Some(key) => match AssemblyAiClient::new(key, &cfg.providers.stt, timeout) {
            Ok(client) => Some(Arc::new(client) as Arc<dyn SpeechToText>),
            Err(e) => {
                warn!("transcription client unavailable: {}", e);
                None
            }
        },
        None => {
            warn!("ASSEMBLYAI_API_KEY not set; transcription unavailable");
            None
        }
    };

    let llm: Option<Arc<dyn ReplyGenerator>> = match &keys.gemini {
        Some(key) => match GeminiClient::new(key, &cfg.providers.llm, timeout) {
            Ok(client) => Some(Arc::new(client) as Arc<dyn ReplyGenerator>),
            Err(e) => {
                warn!("reply generation client unavailable: {}", e);
                None
            }
        },
        None => {
            warn!("GEMINI_API_KEY not set; reply generation unavailable");
            None
        }
    };

    let tts: Option<Arc<dyn SpeechSynthesizer>> = match &keys.murf {
        Some(key) => match MurfClient::new(key, &cfg.providers.tts, timeout) {
            Ok(client) => Some(Arc::new(client) as Arc<dyn SpeechSynthesizer>),
            Err(e) => {
                warn!("speech synthesis client unavailable: {}", e);
                None
            }
        },
        None => {
            warn!("MURF_API_KEY not set; speech synthesis unavailable");
            None
        }
    };

    if stt.is_some() && llm.is_some() && tts.is_some() {
        info!("all provider clients initialized");
    }

    let fallback_audio = match std::fs::read(&cfg.fallback.audio_path) {
        Ok(bytes) => {
            info!(
                "loaded fallback clip from {} ({} bytes)",
                cfg.fallback.audio_path,
                bytes.len()
            );
            bytes
        }
        Err(e) => {
            warn!(
                "failed to read fallback clip {}: {}; degraded turns will return an empty body",
                cfg.fallback.audio_path, e
            );
            Vec::new()
        }
    };

    AppState::new(stt, llm, tts, SessionStore::new(), fallback_audio)
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT, shutting down"); }
        () = terminate => { info!("received SIGTERM, shutting down"); }
    }
}
