#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use ollama_relay::config::Config;
use ollama_relay::routes::create_router;
use ollama_relay::state::AppState;
use serde_json::{Value, json};
use tower::util::ServiceExt;

/// What the fake backend does when `/api/generate` is hit.
#[derive(Clone)]
pub enum Generate {
    Reply(&'static str),
    Json(Value),
    Raw(&'static str),
    Status(u16),
    Delay(Duration),
}

struct FakeState {
    models: Vec<String>,
    generate: Generate,
    received: Mutex<Vec<Value>>,
}

pub struct FakeOllama {
    pub base_url: String,
    state: Arc<FakeState>,
}

impl FakeOllama {
    pub fn received(&self) -> Vec<Value> {
        self.state.received.lock().unwrap().clone()
    }
}

async fn tags(State(state): State<Arc<FakeState>>) -> Json<Value> {
    let models: Vec<Value> = state
        .models
        .iter()
        .map(|name| json!({ "name": name, "size": 3_338_801_804u64 }))
        .collect();
    Json(json!({ "models": models }))
}

async fn generate(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    state.received.lock().unwrap().push(body);
    match state.generate.clone() {
        Generate::Reply(text) => Json(json!({ "model": "m", "response": text, "done": true }))
            .into_response(),
        Generate::Json(value) => Json(value).into_response(),
        Generate::Raw(text) => (StatusCode::OK, text).into_response(),
        Generate::Status(code) => (StatusCode::from_u16(code).unwrap(), "boom").into_response(),
        Generate::Delay(wait) => {
            tokio::time::sleep(wait).await;
            Json(json!({ "response": "too late" })).into_response()
        }
    }
}

/// Start a fake model backend on an ephemeral port.
pub async fn spawn_fake(models: &[&str], behaviour: Generate) -> FakeOllama {
    let state = Arc::new(FakeState {
        models: models.iter().map(|m| m.to_string()).collect(),
        generate: behaviour,
        received: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .route("/api/tags", get(tags))
        .route("/api/generate", post(generate))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeOllama {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// Start a server that answers every path with the given status.
pub async fn spawn_status_only(code: u16) -> String {
    let app = Router::new().fallback(move || async move {
        (StatusCode::from_u16(code).unwrap(), "nope")
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub fn closed_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub const MISSING_BINARY: &str = "ollama-relay-test-no-such-binary";

pub fn test_config(base_url: &str) -> Config {
    Config {
        ollama_url: base_url.to_string(),
        launch_command: vec![MISSING_BINARY.to_string()],
        probe_timeout: Duration::from_secs(2),
        generate_timeout: Duration::from_secs(5),
        startup_grace: Duration::ZERO,
        ..Config::default()
    }
}

pub fn app(config: Config) -> Router {
    let state = Arc::new(AppState::new(config).unwrap());
    create_router().with_state(state)
}

pub async fn post_chat(app: Router, body: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub async fn get_raw(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

/// A backend that reads the request and then resets the connection.
pub async fn spawn_resetting() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = [0u8; 4096];
            let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;
            // Zero linger turns the close into an RST.
            #[allow(deprecated)]
            socket.set_linger(Some(Duration::ZERO)).unwrap();
            drop(socket);
        }
    });
    format!("http://{addr}")
}

pub fn state(config: Config) -> AppState {
    AppState::new(config).unwrap()
}
