use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse},
    services::ollama::reply_for,
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    // An unreadable body is treated the same as a missing message.
    let message = match payload {
        Ok(Json(ChatRequest { message: Some(m) })) if !m.is_empty() => m,
        Ok(_) => return Err(AppError::no_message()),
        Err(rejection) => {
            warn!(error = %rejection, "rejected chat body");
            return Err(AppError::no_message());
        }
    };

    relay(&state, &message).await.map(Json)
}

#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), prompt_len = message.len()))]
async fn relay(state: &SharedState, message: &str) -> Result<ChatResponse, AppError> {
    let model = state.model_name();

    let reachability = state.ollama.probe().await;
    if !reachability.is_reachable() {
        warn!(?reachability, "backend unreachable, attempting launch");
        let outcome = state.launcher.attempt_start();
        if !outcome.spawn_requested() {
            return Err(AppError::BackendUnavailable);
        }
        // No re-probe here: the model check below is the next contact.
        tokio::time::sleep(state.config.startup_grace).await;
    }

    let availability = state.ollama.model_availability(model).await;
    if !availability.is_available() {
        warn!(model, ?availability, "model not available");
        return Err(AppError::ModelMissing(model.to_string()));
    }

    let outcome = state.ollama.generate(model, message).await;
    if let Err(e) = &outcome {
        warn!(error = %e, "generate call failed");
    } else {
        info!("generate call succeeded");
    }

    Ok(ChatResponse {
        reply: reply_for(outcome),
    })
}
