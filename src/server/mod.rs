//! HTTP front end for the fetch-through engine.
//!
//! One generic handler serves every registered endpoint: the request path is
//! resolved against the [`EndpointRegistry`], parameters are extracted from
//! the query string (and, for POST, the urlencoded form body; POST is
//! treated identically to GET), and the engine does the rest. Responses
//! always carry `application/xml;charset=UTF-8`, regardless of what the
//! upstream declared.

pub mod config;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::info;

use crate::registry::EndpointRegistry;
use crate::proxy::FetchThrough;
use crate::{MuninnError, Result};

use config::Config;

/// Fixed content type for every proxied response.
pub const CONTENT_TYPE_XML: &str = "application/xml;charset=UTF-8";

/// Shared state for the axum handlers.
pub struct AppState {
    pub engine: FetchThrough,
    pub registry: EndpointRegistry,
}

/// Build the router: a health probe plus the catch-all proxy handler.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .fallback(proxy_handler)
        .with_state(state)
}

/// Run the daemon: build registry and engine from `config`, bind, serve.
pub async fn serve(config: Config) -> Result<()> {
    let registry = config.build_registry()?;
    let engine = config.build_engine()?;
    info!(
        endpoints = registry.len(),
        upstream = %config.upstream.root,
        "muninn configured"
    );

    let state = Arc::new(AppState { engine, registry });
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.address)
        .await
        .map_err(|e| {
            MuninnError::Configuration(format!("failed to bind {}: {e}", config.server.address))
        })?;
    info!(address = %config.server.address, "muninnd listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| MuninnError::Configuration(format!("HTTP server error: {e}")))
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    body: String,
) -> Response {
    let Some(descriptor) = state.registry.resolve(uri.path()) else {
        return (
            StatusCode::NOT_FOUND,
            MuninnError::UnknownEndpoint(uri.path().to_string()).to_string(),
        )
            .into_response();
    };

    if method != Method::GET && method != Method::POST {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let mut params = HashMap::new();
    if let Some(query) = uri.query() {
        parse_urlencoded(&mut params, query);
    }
    if method == Method::POST {
        parse_urlencoded(&mut params, &body);
    }

    match state.engine.handle(&descriptor, &params).await {
        Ok(payload) => ([(header::CONTENT_TYPE, CONTENT_TYPE_XML)], payload).into_response(),
        Err(e @ (MuninnError::Upstream(_) | MuninnError::UpstreamStatus { .. })) => {
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Merge `key=value` pairs from an urlencoded string; later pairs win.
fn parse_urlencoded(params: &mut HashMap<String, String>, input: &str) {
    for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
        params.insert(key.into_owned(), value.into_owned());
    }
}
