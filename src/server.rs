//! HTTP API.
//!
//! Routes:
//! - `POST /count-words`: ground-truth top words
//! - `POST /llm-count`: model-reported counts for given words
//! - `GET /crawl-article`: a built-in sample article
//! - `POST /generate-article`: a model-written article
//! - `GET /models`: the model registry
//!
//! Every route answers `OPTIONS` preflight and carries permissive CORS
//! headers scoped to its own methods. Errors are `{ "error": message }`
//! with a status taken from [`LlmCountError::status_code`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::error::{LlmCountError, Result};
use crate::models::{self, ModelInfo};
use crate::provider::CompletionClient;
use crate::service::{CountWordsRequest, CounterService, LlmCountRequest};

const POST_METHODS: &str = "POST, OPTIONS";
const GET_METHODS: &str = "GET, OPTIONS";

pub struct AppState<C> {
    pub service: CounterService<C>,
}

#[derive(Serialize)]
struct ModelsResponse {
    models: &'static [ModelInfo],
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router<C: CompletionClient + 'static>(state: Arc<AppState<C>>) -> Router {
    let body_limit = state.service.limits().max_body_bytes;
    Router::new()
        .route(
            "/count-words",
            post(count_words::<C>).options(|| preflight(POST_METHODS)),
        )
        .route(
            "/llm-count",
            post(llm_count::<C>).options(|| preflight(POST_METHODS)),
        )
        .route(
            "/crawl-article",
            get(crawl_article::<C>).options(|| preflight(GET_METHODS)),
        )
        .route(
            "/generate-article",
            post(generate_article::<C>).options(|| preflight(POST_METHODS)),
        )
        .route(
            "/models",
            get(list_models).options(|| preflight(GET_METHODS)),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve<C: CompletionClient + 'static>(
    addr: SocketAddr,
    state: Arc<AppState<C>>,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| LlmCountError::io(format!("binding {addr}"), e))?;
    info!(%addr, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| LlmCountError::io("serving HTTP", e))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutting down");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn count_words<C: CompletionClient>(
    State(state): State<Arc<AppState<C>>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let result = read_body::<CountWordsRequest>(body, state.service.limits().max_body_bytes)
        .map(|req| state.service.count_words(&req.text));
    respond(POST_METHODS, result)
}

async fn llm_count<C: CompletionClient>(
    State(state): State<Arc<AppState<C>>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let req = match read_body::<LlmCountRequest>(body, state.service.limits().max_body_bytes) {
        Ok(req) => req,
        Err(e) => return respond::<()>(POST_METHODS, Err(e)),
    };
    respond(POST_METHODS, state.service.llm_count(&req).await)
}

async fn crawl_article<C: CompletionClient>(State(state): State<Arc<AppState<C>>>) -> Response {
    let article = state.service.crawl_article(&mut rand::thread_rng());
    respond(GET_METHODS, Ok(article))
}

async fn generate_article<C: CompletionClient>(
    State(state): State<Arc<AppState<C>>>,
) -> Response {
    respond(POST_METHODS, state.service.generate_article().await)
}

async fn list_models() -> Response {
    respond(
        GET_METHODS,
        Ok(ModelsResponse {
            models: models::all_models(),
        }),
    )
}

async fn preflight(methods: &'static str) -> Response {
    with_cors(methods, StatusCode::NO_CONTENT.into_response())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a JSON body, turning extractor rejections into crate errors so
/// they get the same `{error}` shape and CORS headers as everything else.
fn read_body<T: DeserializeOwned>(
    body: std::result::Result<Bytes, BytesRejection>,
    limit: usize,
) -> Result<T> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            LlmCountError::over_limit("request body", limit)
        } else {
            LlmCountError::validation("body", rejection.body_text())
        }
    })?;
    parse_body(&body, limit)
}

fn parse_body<T: DeserializeOwned>(body: &[u8], limit: usize) -> Result<T> {
    if body.len() > limit {
        return Err(LlmCountError::too_large("request body", body.len(), limit));
    }
    serde_json::from_slice(body)
        .map_err(|e| LlmCountError::validation("body", e.to_string()))
}

fn respond<T: Serialize>(methods: &'static str, result: Result<T>) -> Response {
    let response = match result {
        Ok(value) => Json(value).into_response(),
        Err(err) => {
            let status =
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                error!(error = %err, "request failed");
            } else if matches!(err, LlmCountError::Auth { .. }) {
                warn!(error = %err, "provider rejected credentials");
            } else {
                info!(error = %err, status = status.as_u16(), "request rejected");
            }
            (status, Json(json!({ "error": client_message(&err) }))).into_response()
        }
    };
    with_cors(methods, response)
}

/// Message shown to the caller. Internal failures and provider auth
/// details stay generic; the full error is logged by [`respond`].
fn client_message(err: &LlmCountError) -> String {
    match err {
        LlmCountError::Config { .. } | LlmCountError::Io { .. } | LlmCountError::Provider { .. } => {
            "internal error while contacting the model provider".to_string()
        }
        LlmCountError::Auth { .. } => "authentication with the model provider failed".to_string(),
        other => other.to_string(),
    }
}

fn with_cors(methods: &'static str, mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(methods),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
