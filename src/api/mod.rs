//! HTTP surface: chat dispatch, runtime personality registration, and the
//! static frontend entry point.

pub mod chat;
pub mod health;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

use crate::agent::Dispatcher;
use crate::llm::provider::LlmProvider;

pub const FRONTEND_ENTRY_FILE: &str = "index.html";

pub struct AppState<P> {
    pub dispatcher: Arc<Dispatcher<P>>,
}

impl<P> AppState<P> {
    pub fn new(dispatcher: Dispatcher<P>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

pub fn router<P>(state: AppState<P>, static_dir: &Path) -> Router
where
    P: LlmProvider + Send + Sync + 'static,
{
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join(FRONTEND_ENTRY_FILE)))
        .route("/chat", post(chat::chat::<P>))
        .route("/add_personality", post(chat::add_personality::<P>))
        .route("/health", get(health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
