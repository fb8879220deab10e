use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::config::CarescoutConfig;
use crate::engine::ChatEngine;
use crate::error::ChatError;

pub struct AppState {
    pub engine: ChatEngine,
}

/// One conversation turn. The caller supplies the full prior history on
/// every call; only the accumulated facts live server-side, keyed by
/// `session_id`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default = "default_session")]
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default = "default_session")]
    pub session_id: String,
}

impl Default for ResetRequest {
    fn default() -> Self {
        Self {
            session_id: default_session(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: String,
}

fn default_session() -> String {
    "main".into()
}

pub async fn run(config: CarescoutConfig, engine: ChatEngine) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.gateway.bind, config.gateway.port);
    let state = Arc::new(AppState { engine });

    let app = Router::new()
        .route("/chat", post(chat_handler))
        .route("/reset", post(reset_handler))
        .route("/health", get(health));

    let app = match &config.gateway.static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    let app = app.layer(CorsLayer::permissive()).with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("carescout gateway listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Response {
    match state
        .engine
        .chat(&req.session_id, &req.message, &req.history)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(ChatResponse { response })).into_response(),
        Err(e @ ChatError::IndexUnavailable(_)) => {
            warn!(session = %req.session_id, "turn aborted: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
        Err(e @ ChatError::GenerationFailed(_)) => {
            warn!(session = %req.session_id, "turn aborted: {e}");
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

/// Clear a session's accumulated facts. Idempotent; the body is optional and
/// defaults to the main session.
async fn reset_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Json<ResetResponse> {
    let req: ResetRequest = serde_json::from_slice(&body).unwrap_or_default();
    state.engine.reset(&req.session_id).await;
    Json(ResetResponse {
        status: "facts reset".into(),
    })
}
