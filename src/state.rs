// src/state.rs
use std::sync::Arc;

use crate::config::Config;
use crate::services::launcher::Launcher;
use crate::services::ollama::OllamaClient;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub ollama: OllamaClient,
    pub launcher: Launcher,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        let ollama = OllamaClient::new(
            http,
            config.ollama_url.clone(),
            config.probe_timeout,
            config.generate_timeout,
        );
        let launcher = Launcher::new(config.launch_command.clone());

        Ok(Self {
            config,
            ollama,
            launcher,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }
}
