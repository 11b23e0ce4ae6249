//! HTTP API.
//!
//! Read-only routes (`/`, `/apps`, `/status`) sit at the root. Every route
//! that changes state is nested under the secret path segment.

use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::PanelConfig;
use crate::error::{Error, Result};
use crate::panel::ControlPanel;

const INDEX_HTML: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/index.html"));
const SECRET_PLACEHOLDER: &str = "{{SECRET_PATH}}";

struct ApiState {
    panel: Arc<ControlPanel>,
    index_html: String,
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
    kind: &'a str,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
struct StartResponse {
    message: String,
    pid: u32,
}

#[derive(Deserialize)]
struct AddRequest {
    name: Option<String>,
    path: Option<String>,
    #[serde(default)]
    port: Value,
}

#[derive(Deserialize)]
struct OrderRequest {
    order: Option<Vec<String>>,
}

/// Build the router. `secret_path` is the bare segment, without slashes.
pub fn router(panel: Arc<ControlPanel>, secret_path: &str) -> Router {
    let state = Arc::new(ApiState {
        panel,
        index_html: INDEX_HTML.replace(SECRET_PLACEHOLDER, secret_path),
    });

    let admin = Router::new()
        .route("/add", post(add_handler))
        .route("/delete/:name", post(delete_handler))
        .route("/save-order", post(save_order_handler))
        .route("/start/:name", post(start_handler))
        .route("/stop/:name", post(stop_handler));

    Router::new()
        .route("/", get(index_handler))
        .route("/apps", get(apps_handler))
        .route("/status", get(status_handler))
        .nest(&format!("/{}", secret_path), admin)
        .with_state(state)
}

/// Bind `config.listen` and serve until `shutdown` resolves.
pub async fn serve<F>(panel: Arc<ControlPanel>, config: &PanelConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(config.listen.as_str()).await?;
    let local = listener.local_addr()?;
    tracing::info!("Listening on http://{}", local);

    axum::serve(listener, router(panel, &config.secret_path))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// HTTP status for a core error.
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::DuplicateName(_) => StatusCode::CONFLICT,
        Error::InvalidPath { .. }
        | Error::PathNotFound(_)
        | Error::InvalidPort(_)
        | Error::OrderMismatch => StatusCode::BAD_REQUEST,
        Error::UnknownApplication(_) => StatusCode::NOT_FOUND,
        Error::LauncherMissing { .. }
        | Error::SpawnFailed { .. }
        | Error::TerminationFailed { .. }
        | Error::PersistenceFailed { .. }
        | Error::Config(_)
        | Error::Io(_)
        | Error::InvalidPid { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &Error) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::debug!("Request rejected: {}", err);
    }
    let message = err.to_string();
    (
        status,
        Json(ErrorResponse {
            error: &message,
            kind: err.kind(),
        }),
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message,
            kind: "bad_request",
        }),
    )
        .into_response()
}

/// A JSON port may arrive as a number, a string or null.
fn port_text(port: &Value) -> Option<String> {
    match port {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

async fn index_handler(State(state): State<Arc<ApiState>>) -> Response {
    Html(state.index_html.clone()).into_response()
}

async fn apps_handler(State(state): State<Arc<ApiState>>) -> Response {
    Json(state.panel.list_applications().await).into_response()
}

async fn status_handler(State(state): State<Arc<ApiState>>) -> Response {
    Json(state.panel.get_status().await).into_response()
}

async fn add_handler(State(state): State<Arc<ApiState>>, body: Bytes) -> Response {
    let request: AddRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(_) => return bad_request("Missing name or path in request"),
    };
    let (Some(name), Some(path)) = (request.name, request.path) else {
        return bad_request("Missing name or path in request");
    };
    if name.trim().is_empty() || path.trim().is_empty() {
        return bad_request("Missing name or path in request");
    }

    let port = port_text(&request.port);
    match state
        .panel
        .add_application(&name, &path, port.as_deref())
        .await
    {
        Ok(message) => (StatusCode::CREATED, Json(MessageResponse { message })).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn delete_handler(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> Response {
    match state.panel.delete_application(&name).await {
        Ok(message) => Json(MessageResponse { message }).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn save_order_handler(State(state): State<Arc<ApiState>>, body: Bytes) -> Response {
    let order = serde_json::from_slice::<OrderRequest>(&body)
        .ok()
        .and_then(|request| request.order);
    let Some(order) = order else {
        return bad_request("Missing order data");
    };

    match state.panel.save_order(order).await {
        Ok(()) => Json(serde_json::json!({"status": "success"})).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn start_handler(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> Response {
    match state.panel.start_application(&name).await {
        Ok(outcome) => Json(StartResponse {
            message: outcome.describe(&name),
            pid: outcome.pid(),
        })
        .into_response(),
        Err(err) => error_response(&err),
    }
}

async fn stop_handler(State(state): State<Arc<ApiState>>, Path(name): Path<String>) -> Response {
    match state.panel.stop_application(&name).await {
        Ok(outcome) => Json(MessageResponse {
            message: outcome.describe(&name),
        })
        .into_response(),
        Err(err) => error_response(&err),
    }
}
