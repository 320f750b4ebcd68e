mod archive;
mod config;
mod errors;
mod generation;
mod intake;
mod llm_client;
mod progress;
mod render;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::archive::{ApplicationLog, Archive};
use crate::config::Config;
use crate::generation::DocumentGenerator;
use crate::llm_client::LlmClient;
use crate::progress::ProgressChannel;
use crate::render::ChromiumRenderer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting airg v{}", env!("CARGO_PKG_VERSION"));

    // Archive root must exist before ServeDir and the first run
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;
    let archive = Archive::new(config.output_dir.clone());
    info!("Archiving generated documents under {}", config.output_dir.display());

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone(), &config.gemini_api_base)?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let renderer = ChromiumRenderer::new(config.chromium_bin.clone());
    info!("PDF renderer: {}", config.chromium_bin);

    let application_log = config.application_log.clone().map(ApplicationLog::new);
    if let Some(log) = &application_log {
        info!("Application log enabled at {}", log.path().display());
    }

    let generator = DocumentGenerator::new(
        Arc::new(llm),
        Arc::new(renderer),
        archive,
        config.resume_dir.clone(),
    );

    // Build app state
    let state = AppState {
        progress: Arc::new(ProgressChannel::new(config.message_queue_max_size)),
        generator: Arc::new(generator),
        application_log,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.port))?;
    info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
