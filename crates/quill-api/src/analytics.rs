//! Handlers for `/posts/:id/analytics`.
//!
//! | Method   | Notes |
//! |----------|-------|
//! | `GET`    | 404 until a record is created |
//! | `POST`   | Body: [`AnalyticsFields`], absent fields start at 0; 201. 409 if one exists |
//! | `PUT`    | Overwrites the fields present in the body |
//! | `PATCH`  | Adds the fields present in the body |
//! | `DELETE` | 204 |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use quill_core::{
  analytics::{AnalyticsFields, PostAnalytics},
  store::BlogStore,
};
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, ApiPath},
};

/// `GET /posts/:id/analytics`
pub async fn get<S>(
  State(state): State<AppState<S>>,
  ApiPath(post_id): ApiPath<Uuid>,
) -> Result<Json<PostAnalytics>, ApiError>
where
  S: BlogStore,
{
  let record = state
    .store
    .get_analytics(post_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(quill_core::Error::AnalyticsNotFound(post_id))?;
  Ok(Json(record))
}

/// `POST /posts/:id/analytics`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  ApiPath(post_id): ApiPath<Uuid>,
  ApiJson(fields): ApiJson<AnalyticsFields>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BlogStore,
{
  let record = state
    .store
    .create_analytics(post_id, fields)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(record)))
}

/// `PUT /posts/:id/analytics`
pub async fn replace<S>(
  State(state): State<AppState<S>>,
  ApiPath(post_id): ApiPath<Uuid>,
  ApiJson(fields): ApiJson<AnalyticsFields>,
) -> Result<Json<PostAnalytics>, ApiError>
where
  S: BlogStore,
{
  let record = state
    .store
    .replace_analytics(post_id, fields)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(record))
}

/// `PATCH /posts/:id/analytics`
pub async fn increment<S>(
  State(state): State<AppState<S>>,
  ApiPath(post_id): ApiPath<Uuid>,
  ApiJson(fields): ApiJson<AnalyticsFields>,
) -> Result<Json<PostAnalytics>, ApiError>
where
  S: BlogStore,
{
  let record = state
    .store
    .increment_analytics(post_id, fields)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(record))
}

/// `DELETE /posts/:id/analytics`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  ApiPath(post_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: BlogStore,
{
  state
    .store
    .delete_analytics(post_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
