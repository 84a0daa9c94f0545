//! JSON REST API for Quill.
//!
//! Exposes an axum [`Router`] backed by any [`quill_core::store::BlogStore`].
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", quill_api::api_router(store.clone()))
//! ```

pub mod analytics;
pub mod comments;
pub mod error;
pub mod etag;
pub mod extract;
pub mod health;
pub mod posts;
pub mod stats;
pub mod subscribers;

use std::{sync::Arc, time::Instant};

use axum::{
  Router,
  routing::{get, post},
};
use quill_core::store::BlogStore;

pub use error::ApiError;

/// Shared state threaded through all handlers.
#[derive(Clone)]
pub struct AppState<S: BlogStore> {
  pub store:      Arc<S>,
  /// When the router was built; reported as uptime by the health check.
  pub started_at: Instant,
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let state = AppState { store, started_at: Instant::now() };

  Router::new()
    // Comments
    .route("/comments", get(comments::thread::<S>).post(comments::create::<S>))
    .route("/comments/{id}", axum::routing::delete(comments::delete_one::<S>))
    .route("/comments/{id}/like", post(comments::like::<S>))
    // Posts
    .route("/posts", get(posts::list::<S>).post(posts::create::<S>))
    .route(
      "/posts/{id}",
      get(posts::get_one::<S>)
        .put(posts::replace::<S>)
        .patch(posts::patch::<S>)
        .delete(posts::delete_one::<S>),
    )
    .route("/posts/slug/{slug}", get(posts::get_by_slug::<S>))
    .route(
      "/posts/{id}/analytics",
      get(analytics::get::<S>)
        .post(analytics::create::<S>)
        .put(analytics::replace::<S>)
        .patch(analytics::increment::<S>)
        .delete(analytics::delete_one::<S>),
    )
    // Subscribers
    .route("/subscribers", get(subscribers::list::<S>).post(subscribers::create::<S>))
    .route("/subscribers/{id}", axum::routing::delete(subscribers::delete_one::<S>))
    // Site stats
    .route("/stats", get(stats::get::<S>).put(stats::set::<S>))
    .route("/stats/visits", post(stats::visit::<S>))
    // Health
    .route("/healthcheck", get(health::handler::<S>))
    .with_state(state)
}
