mod archive;
mod backend;
mod config;
mod errors;
mod extract;
mod models;
mod orchestrator;
mod routes;
mod session;
mod state;
mod views;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::archive::Archive;
use crate::backend::{BackendClient, JobsClient, MentorBackend, ResumeParserClient};
use crate::config::Config;
use crate::orchestrator::{ConversationStore, Orchestrator};
use crate::routes::build_router;
use crate::session::SessionIdentity;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting mentor v{}", env!("CARGO_PKG_VERSION"));

    // Single creation point for the session identity
    let identity = Arc::new(SessionIdentity::load_or_create(
        &config.session_file,
        config.user_email.clone(),
        config.username.clone(),
    )?);
    info!("Session {} (user key {})", identity.session_id, identity.user_key());

    // Backend clients
    let client = BackendClient::new(&config.backend_url, config.http_timeout, identity.clone())?;
    let parser = ResumeParserClient::new(&config.resume_parser_url, config.http_timeout)?;
    let jobs = JobsClient::new(&config.backend_url, config.http_timeout)?;
    info!(
        "Backend at {}, resume parser at {}",
        config.backend_url, config.resume_parser_url
    );

    // Fire-and-forget identity sync
    let upsert_client = client.clone();
    tokio::spawn(async move {
        if let Err(e) = upsert_client.upsert_user().await {
            warn!("User upsert failed: {e}");
        }
    });

    // Restore archived conversations, if archiving is enabled
    let (store, archive) = match &config.conversations_file {
        Some(path) => {
            let archive = Archive::new(path);
            let store = archive
                .load()
                .map(ConversationStore::from_snapshot)
                .unwrap_or_default();
            let handle = archive.spawn_writer(store.snapshot());
            (store, Some(handle))
        }
        None => (ConversationStore::new(), None),
    };

    let orchestrator = Orchestrator::new(
        store,
        Arc::new(MentorBackend::new(client, parser)),
        config.resume_prompt_delay,
        archive,
    );

    let state = AppState {
        orchestrator,
        jobs,
        identity,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
