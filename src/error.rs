// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::message::ChatResponse;

pub const NO_MESSAGE_REPLY: &str = "No message provided";
pub const BACKEND_DOWN_REPLY: &str = "❌ Ollama is not running. Please start Ollama first.";

/// Errors that end a chat request early. Every variant still renders as `{"reply": ...}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("backend is not running and could not be launched")]
    BackendUnavailable,

    #[error("model {0} is not available")]
    ModelMissing(String),
}

impl AppError {
    pub fn no_message() -> Self {
        AppError::BadRequest(NO_MESSAGE_REPLY.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::BackendUnavailable | AppError::ModelMissing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn reply(&self) -> String {
        match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::BackendUnavailable => BACKEND_DOWN_REPLY.to_string(),
            AppError::ModelMissing(model) => {
                format!("❌ Model '{model}' not found. Please run: 'ollama pull {model}'")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(ChatResponse { reply: self.reply() })).into_response()
    }
}
