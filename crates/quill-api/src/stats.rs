//! Handlers for the `/stats` visitor counter.

use axum::{Json, extract::State};
use quill_core::{stats::SiteStats, store::BlogStore};
use serde::Deserialize;

use crate::{AppState, error::ApiError, extract::ApiJson};

/// `GET /stats` — 404 until a count has been recorded.
pub async fn get<S>(State(state): State<AppState<S>>) -> Result<Json<SiteStats>, ApiError>
where
  S: BlogStore,
{
  let stats = state
    .store
    .get_stats()
    .await
    .map_err(ApiError::from_store)?
    .ok_or(quill_core::Error::StatsNotFound)?;
  Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
pub struct SetBody {
  #[serde(default)]
  pub visitors: u64,
}

/// `PUT /stats` — body: `{"visitors": 42}`.
pub async fn set<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<SetBody>,
) -> Result<Json<SiteStats>, ApiError>
where
  S: BlogStore,
{
  let stats = state
    .store
    .set_visitors(body.visitors)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(stats))
}

/// `POST /stats/visits` — count one visitor.
pub async fn visit<S>(State(state): State<AppState<S>>) -> Result<Json<SiteStats>, ApiError>
where
  S: BlogStore,
{
  let stats = state
    .store
    .record_visit()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(stats))
}
