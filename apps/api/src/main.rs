mod auth;
mod chat;
mod config;
mod db;
mod diagnosis;
mod errors;
mod extract;
mod llm_client;
mod models;
mod pharmacy;
mod repository;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::AuthGate;
use crate::config::Config;
use crate::db::create_pool;
use crate::diagnosis::diagnoser::{Diagnoser, KeywordDiagnoser, LlmDiagnoser};
use crate::diagnosis::history::{log_history_failures, HistoryWriter};
use crate::llm_client::LlmClient;
use crate::pharmacy::places::PlacesClient;
use crate::repository::{MemoryRepository, PgRepository, Repository};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting symptom API v{}", env!("CARGO_PKG_VERSION"));

    // Storage: PostgreSQL when configured, in-memory otherwise
    let repo: Arc<dyn Repository> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            info!("PostgreSQL repository initialized");
            Arc::new(PgRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; users and history are kept in memory");
            Arc::new(MemoryRepository::new())
        }
    };

    // LLM client (diagnosis + chat) is optional
    let llm = match &config.openai_api_key {
        Some(key) => {
            let client = LlmClient::new(
                key.clone(),
                config.openai_base_url.clone(),
                config.openai_model.clone(),
            )?;
            info!("LLM client initialized (model: {})", client.model());
            Some(client)
        }
        None => {
            warn!("OPENAI_API_KEY not set; using keyword diagnoser and disabling chat");
            None
        }
    };

    let diagnoser: Arc<dyn Diagnoser> = match &llm {
        Some(client) => Arc::new(LlmDiagnoser(client.clone())),
        None => Arc::new(KeywordDiagnoser),
    };

    let places = PlacesClient::new(
        config.places_base_url.clone(),
        config.google_maps_api_key.clone(),
    )?;
    if places.api_key().is_none() {
        warn!("GOOGLE_MAPS_API_KEY not set; pharmacy lookups return fallback data");
    }

    let (history, failures) = HistoryWriter::new(Arc::clone(&repo));
    tokio::spawn(log_history_failures(failures));

    let auth = Arc::new(AuthGate::new(config.auth.clone(), Arc::clone(&repo))?);

    let state = AppState {
        repo,
        diagnoser,
        history,
        llm,
        places,
        auth,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
