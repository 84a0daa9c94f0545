//! Handlers for `/subscribers` endpoints (the newsletter list).
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/subscribers` | `[]` when nobody has subscribed |
//! | `POST`   | `/subscribers` | Body: `{"email":"..."}`; 409 if already subscribed |
//! | `DELETE` | `/subscribers/:id` | 204 |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use quill_core::{
  store::BlogStore,
  subscriber::{Subscriber, normalize_email},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, ApiPath},
};

/// `GET /subscribers`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Subscriber>>, ApiError>
where
  S: BlogStore,
{
  let subscribers = state
    .store
    .list_subscribers()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(subscribers))
}

#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
  #[serde(default)]
  pub email: String,
}

/// `POST /subscribers` — returns 201 + the stored [`Subscriber`].
pub async fn create<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<SubscribeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BlogStore,
{
  let email = normalize_email(&body.email)?;
  let subscriber = state
    .store
    .add_subscriber(email)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(subscriber)))
}

/// `DELETE /subscribers/:id`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: BlogStore,
{
  state
    .store
    .remove_subscriber(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
