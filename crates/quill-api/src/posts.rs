//! Handlers for `/posts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/posts` | Refreshes featured flags, then lists newest first |
//! | `POST`   | `/posts` | Body: [`NewPostBody`]; returns 201 + stored post |
//! | `GET`    | `/posts/:id` | 404 if not found |
//! | `GET`    | `/posts/slug/:slug` | 404 if not found |
//! | `PUT`    | `/posts/:id` | Body: [`PostPatch`] with `title` and `content` required |
//! | `PATCH`  | `/posts/:id` | Body: [`PostPatch`] |
//! | `DELETE` | `/posts/:id` | 204; also removes the post's comments and analytics |
//!
//! PUT and PATCH count a view unless the body sets `views`.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use quill_core::{
  post::{FEATURED_COUNT, NewPost, Post, PostPatch},
  store::BlogStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, ApiPath},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /posts`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<Post>>, ApiError>
where
  S: BlogStore,
{
  state
    .store
    .refresh_featured(FEATURED_COUNT)
    .await
    .map_err(ApiError::from_store)?;
  let posts = state
    .store
    .list_posts()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(posts))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /posts/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Post>, ApiError>
where
  S: BlogStore,
{
  let post = state
    .store
    .get_post(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("post {id} not found")))?;
  Ok(Json(post))
}

/// `GET /posts/slug/:slug`
pub async fn get_by_slug<S>(
  State(state): State<AppState<S>>,
  ApiPath(slug): ApiPath<String>,
) -> Result<Json<Post>, ApiError>
where
  S: BlogStore,
{
  let post = state
    .store
    .get_post_by_slug(slug.clone())
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("post {slug:?} not found")))?;
  Ok(Json(post))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /posts`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPostBody {
  #[serde(default)]
  pub title:            String,
  #[serde(default)]
  pub content:          String,
  #[serde(default)]
  pub tags:             Vec<String>,
  #[serde(default)]
  pub views:            u64,
  #[serde(default)]
  pub is_featured:      bool,
  pub meta_title:       Option<String>,
  pub meta_description: Option<String>,
  #[serde(default)]
  pub meta_keywords:    Vec<String>,
  pub image:            Option<String>,
  pub published_at:     Option<DateTime<Utc>>,
}

impl From<NewPostBody> for NewPost {
  fn from(b: NewPostBody) -> Self {
    NewPost {
      title:            b.title,
      content:          b.content,
      tags:             b.tags,
      views:            b.views,
      is_featured:      b.is_featured,
      meta_title:       b.meta_title,
      meta_description: b.meta_description,
      meta_keywords:    b.meta_keywords,
      image:            b.image,
      published_at:     b.published_at,
    }
  }
}

/// `POST /posts` — returns 201 + the stored [`Post`].
pub async fn create<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<NewPostBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BlogStore,
{
  let post = state
    .store
    .create_post(NewPost::from(body))
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(post)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /posts/:id`
pub async fn replace<S>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(patch): ApiJson<PostPatch>,
) -> Result<Json<Post>, ApiError>
where
  S: BlogStore,
{
  if patch.title.is_none() || patch.content.is_none() {
    return Err(ApiError::BadRequest("title and content are required".into()));
  }
  let post = state
    .store
    .update_post(id, patch)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(post))
}

/// `PATCH /posts/:id`
pub async fn patch<S>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(patch): ApiJson<PostPatch>,
) -> Result<Json<Post>, ApiError>
where
  S: BlogStore,
{
  let post = state
    .store
    .update_post(id, patch)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(post))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /posts/:id`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: BlogStore,
{
  state
    .store
    .delete_post(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
