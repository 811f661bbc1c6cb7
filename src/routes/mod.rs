// src/routes/mod.rs
pub mod chat;
pub mod status;

use crate::state::SharedState;
use axum::{
    Router,
    routing::{get, post},
};
use chat::chat_handler;
use status::{health_handler, index_handler, ollama_status_handler};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(index_handler))
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .route("/ollama-status", get(ollama_status_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}
