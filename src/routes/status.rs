use axum::{Json, extract::State};

use crate::{
    message::HealthResponse,
    services::status::{StatusSnapshot, snapshot},
    state::SharedState,
};

pub const BANNER: &str = "Ollama relay server is running!";
pub const SERVICE_NAME: &str = "Axum Backend";

pub async fn index_handler() -> &'static str {
    BANNER
}

pub async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let backend = snapshot(&state.ollama, state.model_name()).await;
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        backend,
    })
}

pub async fn ollama_status_handler(State(state): State<SharedState>) -> Json<StatusSnapshot> {
    Json(snapshot(&state.ollama, state.model_name()).await)
}
