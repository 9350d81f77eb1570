pub mod agent;
pub mod api;
pub mod cli;
pub mod config;
pub mod http;
pub mod llm;

use agent::{Dispatcher, PersonalityRegistry};
use anyhow::{Context, Result, anyhow};
use api::AppState;
use axum::Router;
use cli::CliArgs;
use config::AppConfig;
use http::client::HttpClient;
use http::debug::HttpDebugConfig;
use llm::openai::OpenAiProvider;
use std::sync::Arc;
use tokio::net::TcpListener;

pub async fn run(args: CliArgs) -> Result<()> {
    let config = AppConfig::load_with_path(args.config.as_deref())?;
    let app = build_app(&config, HttpDebugConfig::from_verbose(args.verbose))?;

    let host = args.host.unwrap_or_else(|| config.host.clone());
    let port = args.port.unwrap_or(config.port);
    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind to {host}:{port}"))?;

    tracing::info!(
        "persona_chat v{} listening on http://{}",
        env!("CARGO_PKG_VERSION"),
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("persona_chat shutdown complete");
    Ok(())
}

/// Wires the registry, the provider, and the router from a loaded config.
pub fn build_app(config: &AppConfig, debug: HttpDebugConfig) -> Result<Router> {
    let registry = Arc::new(PersonalityRegistry::with_builtins());
    for (name, prompt) in &config.personalities {
        registry
            .add(name, prompt)
            .map_err(|err| anyhow!("Failed to register personality '{name}': {err}"))?;
    }
    tracing::debug!(agents = ?registry.list_names(), "personality registry ready");

    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; chat replies will report the missing key");
    }

    let http = HttpClient::new(reqwest::Client::new(), debug);
    let provider = OpenAiProvider::new(
        http,
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.openai_base_url.clone(),
    );
    tracing::info!(model = provider.model(), "completion provider configured");

    let dispatcher = Dispatcher::new(registry, provider);
    Ok(api::router(AppState::new(dispatcher), &config.static_dir))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
