//! HTTP boundary — webhook proxy, discovery, backend status and chat session
//!
//! `POST /api/webhook/:name` is the single surface the tool pages call.
//! Validation and unknown-name failures are reported precisely; everything
//! that goes wrong past validation collapses to a generic 500 and the
//! detail is only logged.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::{ApiError, WebhookError};
use crate::executor::Executor;
use crate::registry::Registry;
use crate::session;
use crate::status::{StatusHandle, StatusSnapshot};

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub executor: Arc<Executor>,
    pub status: StatusHandle,
}

/// Build the router
pub fn router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/api/webhook", get(list_webhooks))
        .route("/api/webhook/:name", post(execute_webhook))
        .route("/api/status", get(get_status))
        .route("/api/session", get(get_session))
        .route("/api/session/reset", post(reset_session))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

/// Serve `app` on `listener` until `cancel` fires
pub async fn serve(listener: TcpListener, app: Router, cancel: CancellationToken) -> anyhow::Result<()> {
    info!("Webhook gateway listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;
    Ok(())
}

// --- API Types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiscoveryResponse {
    available_webhooks: Vec<String>,
    message: String,
}

#[derive(Serialize)]
struct SessionResponse {
    uuid: String,
    issued: bool,
}

// --- Handlers ---

async fn list_webhooks(State(state): State<AppState>) -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        available_webhooks: state.registry.names(),
        message: "Use POST /api/webhook/[webhookName] to execute a webhook".into(),
    })
}

async fn execute_webhook(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let Some(definition) = state.registry.lookup(&name) else {
        warn!("Unknown webhook requested: {name}");
        return Err(WebhookError::NotFound(name).into());
    };

    let payload = parse_body(&body)?;

    match state.executor.execute(definition, &payload).await {
        Ok(data) => Ok(Json(data)),
        Err(e) => {
            if e.is_client_error() {
                info!("Rejected {name} request: {e}");
            } else {
                error!("Webhook {name} failed: {e}");
            }
            Err(e.into())
        }
    }
}

/// An empty body is treated as `{}`
fn parse_body(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| {
        info!("Rejected request body: {e}");
        ApiError::bad_request("Invalid JSON body")
    })
}

async fn get_status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.status.read().await.clone())
}

async fn get_session(headers: HeaderMap) -> impl IntoResponse {
    match session::extract_session_id(&headers) {
        Some(id) => (
            HeaderMap::new(),
            Json(SessionResponse {
                uuid: id.to_string(),
                issued: false,
            }),
        ),
        None => issue_session(),
    }
}

async fn reset_session() -> impl IntoResponse {
    issue_session()
}

fn issue_session() -> (HeaderMap, Json<SessionResponse>) {
    let id = session::new_session_id();
    let mut headers = HeaderMap::new();
    session::set_session_cookie(&mut headers, id);
    (
        headers,
        Json(SessionResponse {
            uuid: id.to_string(),
            issued: true,
        }),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {detail}");
    ApiError::internal().into_response()
}
