pub mod launcher;
pub mod ollama;
pub mod status;
