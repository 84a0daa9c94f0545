//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use quill_core::{ErrorKind, store::StoreError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// A backend failure. The cause is logged, never sent to the client.
  #[error("internal server error")]
  Internal,
}

impl ApiError {
  /// Translate a store failure: caller-caused failures keep their message,
  /// backend failures are logged and collapsed into [`ApiError::Internal`].
  pub fn from_store<E: StoreError>(e: E) -> Self {
    match e.domain() {
      Some(domain) => Self::from(domain),
      None => {
        tracing::error!(error = %e, "store failure");
        ApiError::Internal
      }
    }
  }
}

impl From<&quill_core::Error> for ApiError {
  fn from(e: &quill_core::Error) -> Self {
    let msg = e.to_string();
    match e.kind() {
      ErrorKind::Validation => ApiError::BadRequest(msg),
      ErrorKind::NotFound => ApiError::NotFound(msg),
      ErrorKind::Conflict => ApiError::Conflict(msg),
    }
  }
}

impl From<quill_core::Error> for ApiError {
  fn from(e: quill_core::Error) -> Self { Self::from(&e) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m),
      ApiError::Internal => {
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
