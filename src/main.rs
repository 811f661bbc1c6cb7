use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ollama_relay::config::Config;
use ollama_relay::routes;
use ollama_relay::services::launcher::LaunchOutcome;
use ollama_relay::services::ollama::Reachability;
use ollama_relay::services::status::startup_check;
use ollama_relay::state::{AppState, SharedState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;
    let bind_addr = config.bind_addr;
    let state: SharedState =
        Arc::new(AppState::new(config).context("building HTTP client")?);

    check_backend(&state).await;

    let app = routes::create_router().with_state(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;

    info!("🚀 Ollama relay running at http://{bind_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    Ok(())
}

/// One-off backend check before serving. Only logs; never blocks startup.
async fn check_backend(state: &AppState) {
    info!(url = state.ollama.base_url(), "🔍 checking Ollama status");

    let report = startup_check(state).await;

    match (&report.reachability, &report.launch) {
        (Reachability::Reachable, _) => info!("✅ Ollama is running"),
        (Reachability::Unreachable { reason }, Some(LaunchOutcome::SpawnRequested { pid })) => {
            warn!(%reason, ?pid, "⚠️ Ollama was not running, launch requested");
        }
        (Reachability::Unreachable { reason }, launch) => {
            error!(
                %reason,
                ?launch,
                command = ?state.launcher.command(),
                "❌ failed to start Ollama, please start it manually"
            );
        }
    }

    let model = state.model_name();
    if report.model.is_available() {
        info!(model, "✅ model is available");
    } else {
        warn!(model, availability = ?report.model, "❌ model not found, please run: 'ollama pull {model}'");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down");
}
