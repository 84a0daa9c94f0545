//! Handler for `GET /healthcheck`.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use quill_core::store::BlogStore;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
  pub success:     bool,
  pub message:     &'static str,
  pub timestamp:   DateTime<Utc>,
  pub uptime_secs: u64,
  /// `"connected"` or `"disconnected"`.
  pub database:    &'static str,
}

/// `GET /healthcheck` — 200 when the store answers, 500 otherwise.
pub async fn handler<S>(State(state): State<AppState<S>>) -> (StatusCode, Json<Health>)
where
  S: BlogStore,
{
  let uptime_secs = state.started_at.elapsed().as_secs();
  let timestamp = Utc::now();

  match state.store.ping().await {
    Ok(()) => (
      StatusCode::OK,
      Json(Health {
        success: true,
        message: "API is healthy",
        timestamp,
        uptime_secs,
        database: "connected",
      }),
    ),
    Err(e) => {
      tracing::error!(error = %e, "health check could not reach the store");
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Health {
          success: false,
          message: "API is up but the store is unreachable",
          timestamp,
          uptime_secs,
          database: "disconnected",
        }),
      )
    }
  }
}
