//! The `BlogStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `quill-store-sqlite`).
//! Higher layers (`quill-api`, `quill-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Error,
  analytics::{AnalyticsFields, PostAnalytics},
  comment::{Comment, NewComment},
  post::{NewPost, Post, PostPatch},
  stats::SiteStats,
  subscriber::Subscriber,
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Implemented by backend error types so callers can tell caller-caused
/// failures from backend faults without knowing the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The domain error behind this failure, if the caller caused it.
  /// `None` means the backend itself failed.
  fn domain(&self) -> Option<&Error>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Quill storage backend.
///
/// Every method is a single attempt; nothing is retried. Writes are not
/// idempotent: repeating `create_comment` creates a second comment.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait BlogStore: Send + Sync {
  type Error: StoreError;

  /// Cheap round-trip to the backend, used by health checks.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Persist a new post. Fails with [`Error::DuplicatePost`] if the title or
  /// its slug is taken.
  fn create_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  /// Retrieve a post by id. Returns `None` if not found.
  fn get_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  fn get_post_by_slug(
    &self,
    slug: String,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// All posts, most recently published first.
  fn list_posts(&self) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  /// Apply `patch` to an existing post and return the updated post.
  /// See [`PostPatch`] for the view-counting rule.
  fn update_post(
    &self,
    id: Uuid,
    patch: PostPatch,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  /// Delete a post together with its comments and analytics.
  fn delete_post(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Mark the `limit` most-viewed posts as featured. Posts already featured
  /// keep the flag.
  fn refresh_featured(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Post analytics ────────────────────────────────────────────────────

  /// Returns `None` if no record exists for the post.
  fn get_analytics(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<Option<PostAnalytics>, Self::Error>> + Send + '_;

  /// Create the record for a post. Fails with [`Error::PostNotFound`] if the
  /// post does not exist and [`Error::DuplicateAnalytics`] if it already has
  /// one.
  fn create_analytics(
    &self,
    post_id: Uuid,
    fields: AnalyticsFields,
  ) -> impl Future<Output = Result<PostAnalytics, Self::Error>> + Send + '_;

  /// Overwrite the present fields. Fails with [`Error::AnalyticsNotFound`].
  fn replace_analytics(
    &self,
    post_id: Uuid,
    fields: AnalyticsFields,
  ) -> impl Future<Output = Result<PostAnalytics, Self::Error>> + Send + '_;

  /// Add the present fields to the stored values. Fails with
  /// [`Error::AnalyticsNotFound`].
  fn increment_analytics(
    &self,
    post_id: Uuid,
    fields: AnalyticsFields,
  ) -> impl Future<Output = Result<PostAnalytics, Self::Error>> + Send + '_;

  fn delete_analytics(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  /// All comments on a post in ascending `created_at` order, ties broken by
  /// insertion order. An empty list is a valid result.
  fn list_comments(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// Persist a comment or reply. The `id` and `created_at` are set by the
  /// store.
  ///
  /// Fails with [`Error::Validation`] for an empty body,
  /// [`Error::PostNotFound`] if the post does not exist,
  /// [`Error::CommentNotFound`] if the parent does not exist and
  /// [`Error::CrossPostParent`] if the parent is on another post. Nothing is
  /// written on failure.
  fn create_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Increment a comment's like counter.
  fn like_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Delete a single comment. Replies are left in place and surface as
  /// top-level comments when the thread is built.
  fn delete_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Subscribers ───────────────────────────────────────────────────────

  /// Subscribe an already-normalised address (see
  /// [`crate::subscriber::normalize_email`]).
  fn add_subscriber(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Subscriber, Self::Error>> + Send + '_;

  /// Oldest subscription first.
  fn list_subscribers(&self) -> impl Future<Output = Result<Vec<Subscriber>, Self::Error>> + Send + '_;

  fn remove_subscriber(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Site stats ────────────────────────────────────────────────────────

  /// Returns `None` until a count has been recorded.
  fn get_stats(&self) -> impl Future<Output = Result<Option<SiteStats>, Self::Error>> + Send + '_;

  /// Overwrite the visitor count. `visitors` must be non-zero.
  fn set_visitors(
    &self,
    visitors: u64,
  ) -> impl Future<Output = Result<SiteStats, Self::Error>> + Send + '_;

  /// Atomically add one visitor, creating the counter if needed.
  fn record_visit(&self) -> impl Future<Output = Result<SiteStats, Self::Error>> + Send + '_;
}
