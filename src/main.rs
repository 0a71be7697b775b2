//! Main entry point for the Ollama Chat Gateway

use ollama_chat_gateway::{
    api,
    auth::AuthManager,
    backend::OllamaAdapter,
    config::Settings,
    gateway::ChatGateway,
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local env file, then real environment
    dotenvy::from_filename("config.env").ok();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .init();

    info!("Starting Ollama Chat Gateway");

    // Load and validate configuration; missing credentials are fatal
    let settings = Settings::load()?;
    settings.validate()?;
    info!(
        "Loaded configuration: server={}:{} backend={}",
        settings.server.host, settings.server.port, settings.backend.base_url
    );

    // Inference backend adapter
    let adapter: Arc<dyn ollama_chat_gateway::backend::InferenceBackend> =
        Arc::new(OllamaAdapter::new(&settings.backend)?);

    // Session authentication manager
    let auth = Arc::new(AuthManager::new(&settings));

    // Request serialization gateway: one worker, bounded queue
    let gateway = Arc::new(ChatGateway::start(
        adapter.clone(),
        settings.gateway.queue_capacity,
        Duration::from_secs(settings.gateway.reply_timeout_secs),
    ));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    // Create application state
    let app_state = Arc::new(AppState {
        settings: Arc::new(RwLock::new(settings)),
        adapter,
        auth,
        gateway: gateway.clone(),
    });

    // Build the router
    let app = api::routes::create_router(app_state);

    info!("Server listening on {}", addr);

    // Start the server; ctrl-c drains the gateway worker before exit
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(gateway))
        .await?;

    Ok(())
}

async fn shutdown_signal(gateway: Arc<ChatGateway>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received, stopping gateway worker");
    gateway.shutdown().await;
}
