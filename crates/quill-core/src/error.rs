//! Error types for `quill-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field is missing or malformed. The message is shown to the
  /// caller verbatim.
  #[error("{0}")]
  Validation(String),

  #[error("post not found: {0}")]
  PostNotFound(Uuid),

  #[error("comment not found: {0}")]
  CommentNotFound(Uuid),

  #[error("subscriber not found: {0}")]
  SubscriberNotFound(Uuid),

  #[error("site stats have not been recorded yet")]
  StatsNotFound,

  #[error("no analytics recorded for post {0}")]
  AnalyticsNotFound(Uuid),

  #[error("parent comment {parent} belongs to a different post")]
  CrossPostParent { parent: Uuid },

  #[error("a post with the title {0:?} already exists")]
  DuplicatePost(String),

  #[error("{0} is already subscribed")]
  DuplicateSubscriber(String),

  #[error("analytics for post {0} already exist")]
  DuplicateAnalytics(Uuid),
}

/// The caller-facing class of a domain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  NotFound,
  Conflict,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) | Self::CrossPostParent { .. } => ErrorKind::Validation,
      Self::PostNotFound(_)
      | Self::CommentNotFound(_)
      | Self::SubscriberNotFound(_)
      | Self::StatsNotFound
      | Self::AnalyticsNotFound(_) => ErrorKind::NotFound,
      Self::DuplicatePost(_) | Self::DuplicateSubscriber(_) | Self::DuplicateAnalytics(_) => {
        ErrorKind::Conflict
      }
    }
  }

  pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
