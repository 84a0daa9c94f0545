//! HTTP server assembly for Quill.
//!
//! Mounts the JSON API under `/api` and wraps it in request tracing and,
//! when origins are configured, CORS.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::{
  Router,
  http::{
    HeaderValue, Method,
    header::{CONTENT_TYPE, ETAG, IF_NONE_MATCH},
  },
};
use quill_core::store::BlogStore;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `quill.toml` and
/// `QUILL_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// Browser origins allowed to call the API. Empty disables CORS.
  #[serde(default)]
  pub allowed_origins: Vec<String>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
///
/// Fails if an entry in `allowed_origins` is not a valid header value.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> anyhow::Result<Router>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let router = Router::new()
    .nest("/api", quill_api::api_router(store))
    .layer(TraceLayer::new_for_http());

  match cors_layer(&config.allowed_origins)? {
    Some(cors) => Ok(router.layer(cors)),
    None => Ok(router),
  }
}

fn cors_layer(origins: &[String]) -> anyhow::Result<Option<CorsLayer>> {
  if origins.is_empty() {
    return Ok(None);
  }

  let origins = origins
    .iter()
    .map(|o| {
      HeaderValue::from_str(o.trim()).with_context(|| format!("invalid CORS origin {o:?}"))
    })
    .collect::<anyhow::Result<Vec<_>>>()?;

  tracing::debug!(count = origins.len(), "CORS enabled");

  Ok(Some(
    CorsLayer::new()
      .allow_origin(origins)
      .allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
      ])
      .allow_headers([CONTENT_TYPE, IF_NONE_MATCH])
      .expose_headers([ETAG]),
  ))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
