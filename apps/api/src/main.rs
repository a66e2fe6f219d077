mod chart;
mod config;
mod errors;
mod layout;
mod llm_client;
mod models;
mod narrative;
mod report;
mod routes;
mod scoring;
mod state;
mod survey;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::survey::QuestionMap;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first: missing or malformed env vars abort startup
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Teams Diagnostic v{}", env!("CARGO_PKG_VERSION"));

    let question_map = QuestionMap::load(&config.question_map_path).with_context(|| {
        format!(
            "Failed to load question map from {}",
            config.question_map_path.display()
        )
    })?;
    info!("Question map loaded ({} questions)", question_map.len());

    let llm = LlmClient::new(config.llm_settings())?;
    info!("LLM client initialized (model: {})", llm.model());
    info!(
        "Status thresholds: strength >= {}, fragile >= {}",
        config.status_thresholds.strength(),
        config.status_thresholds.fragile()
    );

    tokio::fs::create_dir_all(&config.report_output_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create report output dir {}",
                config.report_output_dir.display()
            )
        })?;
    info!(
        "Reports written under {} (keep: {})",
        config.report_output_dir.display(),
        config.keep_reports
    );

    let state = AppState {
        config: config.clone(),
        question_map: Arc::new(question_map),
        generator: Arc::new(llm),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
