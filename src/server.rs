//! HTTP adapter.
//!
//! Maps query-string requests onto the search executor and tag aggregator
//! and their outcomes onto status codes and JSON bodies.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/search?q=&tag=&limit=&page=` | Ranked full-text search |
//! | `GET`  | `/search?action=tags` | Tag frequencies |
//! | `GET`  | `/health` | Health check (returns version) |
//! | `OPTIONS` | any | CORS preflight, empty `200` |
//!
//! # Error Contract
//!
//! ```json
//! { "error": "Missing query parameter 'q' or 'tag'" }
//! ```
//!
//! `400` for missing search criteria. Every other failure is a `500` with
//! the generic message; the detail goes to the log only.
//!
//! # Headers
//!
//! Every response, including preflight, errors and `404`s, carries the same
//! static set: JSON content type, the configured allowed origin, and the
//! hardening headers in [`HARDENING_HEADERS`].

use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::Config;
use crate::error::SearchError;
use crate::models::SearchResult;
use crate::provision::IndexProvisioner;
use crate::query::{Action, SearchParams};
use crate::search;
use crate::tags;

pub const ALLOW_METHODS: &str = "GET,OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

pub const HARDENING_HEADERS: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=63072000; includeSubDomains"),
];

/// Shared state handed to every handler.
#[derive(Clone)]
struct AppState {
    provisioner: Arc<IndexProvisioner>,
}

/// Starts the HTTP server on `[server].bind` and runs until terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let provisioner = Arc::new(IndexProvisioner::from_config(config));
    let app = router(provisioner, &config.server.cors_origin)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, origin = %config.server.cors_origin, "search API listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router around an existing provisioner.
pub fn router(provisioner: Arc<IndexProvisioner>, cors_origin: &str) -> anyhow::Result<Router> {
    let state = AppState { provisioner };

    let mut app = Router::new()
        .route("/search", get(handle_search))
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .with_state(state)
        .layer(middleware::from_fn(answer_preflight));

    for (name, value) in response_headers(cors_origin)? {
        app = app.layer(SetResponseHeaderLayer::overriding(name, value));
    }

    Ok(app)
}

/// The static header set attached to every response.
pub fn response_headers(cors_origin: &str) -> anyhow::Result<Vec<(HeaderName, HeaderValue)>> {
    let mut headers = vec![
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_str(cors_origin)?,
        ),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ),
    ];
    for (name, value) in HARDENING_HEADERS {
        headers.push((HeaderName::from_static(name), HeaderValue::from_static(value)));
    }
    Ok(headers)
}

/// Preflight requests get an empty `200` before any routing happens.
async fn answer_preflight(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(request).await
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Converts a [`SearchError`] into a response, logging server-side detail.
struct ApiError(SearchError);

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %self.0, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = ErrorBody {
            error: self.0.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

// ============ GET /search ============

/// JSON response body for a search.
#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
    count: usize,
    page: i64,
    query: String,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let params = SearchParams::from_query(&raw);

    if params.action == Action::Tags {
        let ranked = tags::aggregate_tags(&state.provisioner).await?;
        return Ok(Json(ranked).into_response());
    }

    let expression = params.expression()?;
    let results = search::search(&state.provisioner, &expression, &params.pagination).await?;

    Ok(Json(SearchResponse {
        count: results.len(),
        results,
        page: params.pagination.page,
        query: expression.to_string(),
    })
    .into_response())
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn handle_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not found".to_string(),
        }),
    )
        .into_response()
}
