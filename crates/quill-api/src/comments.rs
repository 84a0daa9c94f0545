//! Handlers for `/comments` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/comments` | `?postId` required; returns the nested thread, `[]` if none |
//! | `POST`   | `/comments` | Body: [`NewCommentBody`]; returns 201 + stored comment |
//! | `POST`   | `/comments/:id/like` | Returns the updated comment |
//! | `DELETE` | `/comments/:id` | 204; replies are kept |

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use quill_core::{
  comment::{Comment, NewComment},
  store::BlogStore,
  thread::build_thread,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  etag::{if_none_match, thread_etag},
  extract::{ApiJson, ApiPath, ApiQuery},
};

/// Parse an optional id supplied as free text. Blank counts as absent.
fn parse_id(raw: Option<&str>, field: &str) -> Result<Option<Uuid>, ApiError> {
  match raw.map(str::trim).filter(|s| !s.is_empty()) {
    None => Ok(None),
    Some(s) => Uuid::parse_str(s)
      .map(Some)
      .map_err(|_| ApiError::BadRequest(format!("{field} is not a valid id"))),
  }
}

// ─── Thread ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadParams {
  pub post_id: Option<String>,
}

/// `GET /comments?postId=<id>`
///
/// Sends an `ETag`; a matching `If-None-Match` gets `304 Not Modified`.
pub async fn thread<S>(
  State(state): State<AppState<S>>,
  ApiQuery(params): ApiQuery<ThreadParams>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: BlogStore,
{
  let post_id = parse_id(params.post_id.as_deref(), "postId")?
    .ok_or_else(|| ApiError::BadRequest("a valid postId is required".into()))?;

  let comments = state
    .store
    .list_comments(post_id)
    .await
    .map_err(ApiError::from_store)?;

  let etag = thread_etag(&comments);
  if if_none_match(&headers, &etag) {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }

  let forest = build_thread(&comments);
  Ok(([(header::ETAG, etag)], Json(forest)).into_response())
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /comments`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentBody {
  pub post_id:   Option<String>,
  #[serde(default)]
  pub body:      String,
  pub author:    Option<String>,
  /// Blank or absent for a top-level comment.
  pub parent_id: Option<String>,
}

impl TryFrom<NewCommentBody> for NewComment {
  type Error = ApiError;

  fn try_from(b: NewCommentBody) -> Result<Self, ApiError> {
    let post_id = parse_id(b.post_id.as_deref(), "postId")?
      .ok_or_else(|| ApiError::BadRequest("postId and body are required".into()))?;
    let parent_id = parse_id(b.parent_id.as_deref(), "parentId")?;

    let input = NewComment { post_id, author: b.author, body: b.body, parent_id };
    input.validate()?;
    Ok(input)
  }
}

/// `POST /comments` — returns 201 + the stored [`Comment`].
pub async fn create<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<NewCommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BlogStore,
{
  let input = NewComment::try_from(body)?;
  let comment = state
    .store
    .create_comment(input)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(comment)))
}

// ─── Like ─────────────────────────────────────────────────────────────────────

/// `POST /comments/:id/like`
pub async fn like<S>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Comment>, ApiError>
where
  S: BlogStore,
{
  let comment = state
    .store
    .like_comment(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(comment))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /comments/:id`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: BlogStore,
{
  state
    .store
    .delete_comment(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
