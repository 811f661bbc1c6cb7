// src/services/status.rs
use serde::{Deserialize, Serialize};

use super::launcher::LaunchOutcome;
use super::ollama::{ModelAvailability, OllamaClient, Reachability};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub ollama_running: bool,
    pub model_available: bool,
    pub model_name: String,
}

/// Read-only view of the backend. The model probe is skipped when the backend is down.
pub async fn snapshot(client: &OllamaClient, model_name: &str) -> StatusSnapshot {
    let ollama_running = client.is_backend_reachable().await;
    let model_available = if ollama_running {
        client.is_model_available(model_name).await
    } else {
        false
    };

    StatusSnapshot {
        ollama_running,
        model_available,
        model_name: model_name.to_string(),
    }
}

/// What the one-off check before serving found and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    pub reachability: Reachability,
    /// Set only when the backend was unreachable and a launch was tried.
    pub launch: Option<LaunchOutcome>,
    pub model: ModelAvailability,
}

/// Probe the backend, launch it and wait the startup grace if absent, then check the model.
pub async fn startup_check(state: &AppState) -> StartupReport {
    let reachability = state.ollama.probe().await;

    let launch = if reachability.is_reachable() {
        None
    } else {
        let outcome = state.launcher.attempt_start();
        if outcome.spawn_requested() {
            tokio::time::sleep(state.config.startup_grace).await;
        }
        Some(outcome)
    };

    let model = state.ollama.model_availability(state.model_name()).await;

    StartupReport {
        reachability,
        launch,
        model,
    }
}
