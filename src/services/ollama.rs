// src/services/ollama.rs
use std::error::Error as _;
use std::io;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const NO_RESPONSE_REPLY: &str = "No response from model";
pub const CONNECT_REPLY: &str =
    "❌ Cannot connect to Ollama. Please make sure Ollama is installed and running.";
pub const TIMEOUT_REPLY: &str =
    "❌ Ollama request timed out. The model might be loading or too slow. Try a simpler query.";
pub const INVALID_RESPONSE_REPLY: &str =
    "❌ Invalid response from Ollama. Please check if Ollama is functioning properly.";

/// Why a listing call did not produce a usable answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    #[error("timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("could not parse model list: {0}")]
    Decode(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Refused, reset, aborted or broken connections, including ones that fail after connecting.
fn is_connection_failure(err: &reqwest::Error) -> bool {
    if err.is_connect() {
        return true;
    }

    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<io::Error>() {
            if matches!(
                io.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::BrokenPipe
            ) {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

impl From<reqwest::Error> for ProbeFailure {
    fn from(err: reqwest::Error) -> Self {
        if is_connection_failure(&err) {
            ProbeFailure::Connect(err.to_string())
        } else if err.is_timeout() {
            ProbeFailure::Timeout
        } else if err.is_decode() {
            ProbeFailure::Decode(err.to_string())
        } else {
            ProbeFailure::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable { reason: ProbeFailure },
}

impl Reachability {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Reachability::Reachable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelAvailability {
    Available,
    Missing,
    Unknown { reason: ProbeFailure },
}

impl ModelAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, ModelAvailability::Available)
    }
}

/// Failures of the generate call. Each one maps to a fixed reply in [`reply_for`].
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("cannot connect to backend")]
    Connect,
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Request(String),
    #[error("backend body is not valid JSON")]
    Decode,
    #[error("{0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for GenerateError {
    fn from(err: reqwest::Error) -> Self {
        if is_connection_failure(&err) {
            GenerateError::Connect
        } else if err.is_timeout() {
            GenerateError::Timeout
        } else {
            GenerateError::Request(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelDescriptor>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Thin client over the two backend endpoints this relay consumes.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    probe_timeout: Duration,
    generate_timeout: Duration,
}

impl OllamaClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        probe_timeout: Duration,
        generate_timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            probe_timeout,
            generate_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url)
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    async fn list_response(&self) -> Result<reqwest::Response, ProbeFailure> {
        let response = self
            .http
            .get(self.tags_url())
            .timeout(self.probe_timeout)
            .send()
            .await?;

        // Only a plain 200 counts, not any 2xx.
        if response.status() != reqwest::StatusCode::OK {
            return Err(ProbeFailure::Status(response.status().as_u16()));
        }
        Ok(response)
    }

    pub async fn probe(&self) -> Reachability {
        match self.list_response().await {
            Ok(_) => Reachability::Reachable,
            Err(reason) => {
                debug!(url = %self.tags_url(), %reason, "backend probe failed");
                Reachability::Unreachable { reason }
            }
        }
    }

    pub async fn is_backend_reachable(&self) -> bool {
        self.probe().await.is_reachable()
    }

    /// Fetch the names of the models the backend has pulled.
    pub async fn list_models(&self) -> Result<Vec<ModelDescriptor>, ProbeFailure> {
        let response = self.list_response().await?;
        let body = response.bytes().await?;
        let tags: TagsResponse =
            serde_json::from_slice(&body).map_err(|e| ProbeFailure::Decode(e.to_string()))?;
        Ok(tags.models)
    }

    pub async fn model_availability(&self, model_name: &str) -> ModelAvailability {
        match self.list_models().await {
            Ok(models) if models.iter().any(|m| m.name == model_name) => {
                ModelAvailability::Available
            }
            Ok(_) => ModelAvailability::Missing,
            Err(reason) => {
                debug!(model = model_name, %reason, "model probe failed");
                ModelAvailability::Unknown { reason }
            }
        }
    }

    pub async fn is_model_available(&self, model_name: &str) -> bool {
        self.model_availability(model_name).await.is_available()
    }

    /// Send a single non-streaming prompt and return the generated text, if any.
    pub async fn generate(
        &self,
        model_name: &str,
        prompt: &str,
    ) -> Result<Option<String>, GenerateError> {
        let payload = GenerateRequest {
            model: model_name,
            prompt,
            stream: false,
        };

        let response = self
            .http
            .post(self.generate_url())
            .timeout(self.generate_timeout)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let parsed: GenerateResponse = serde_json::from_slice(&body).map_err(|e| {
            if e.is_syntax() || e.is_eof() {
                GenerateError::Decode
            } else {
                GenerateError::Unexpected(e.to_string())
            }
        })?;

        Ok(parsed.response)
    }
}

/// Collapse a generate outcome into the text shown to the user.
pub fn reply_for(outcome: Result<Option<String>, GenerateError>) -> String {
    match outcome {
        Ok(Some(text)) => text,
        Ok(None) => NO_RESPONSE_REPLY.to_string(),
        Err(GenerateError::Connect) => CONNECT_REPLY.to_string(),
        Err(GenerateError::Timeout) => TIMEOUT_REPLY.to_string(),
        Err(GenerateError::Request(e)) => format!("❌ Error connecting to Ollama: {e}"),
        Err(GenerateError::Decode) => INVALID_RESPONSE_REPLY.to_string(),
        Err(GenerateError::Unexpected(e)) => format!("❌ Unexpected error: {e}"),
    }
}
