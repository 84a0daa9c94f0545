//! Comment types.
//!
//! Comments are stored flat. Each one may point at a parent comment on the
//! same post; the nested view is derived on read by [`crate::thread`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Display name used when a submitter does not give one.
pub const DEFAULT_AUTHOR: &str = "Guest User";

/// A persisted comment or reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub id:         Uuid,
  pub post_id:    Uuid,
  pub author:     String,
  pub body:       String,
  /// Server-assigned; the only ordering key.
  pub created_at: DateTime<Utc>,
  /// `None` for a top-level comment.
  pub parent_id:  Option<Uuid>,
  /// Direct replies in `created_at` order. Recomputed from `parent_id` on
  /// every read.
  #[serde(default)]
  pub child_ids:  Vec<Uuid>,
  #[serde(default)]
  pub like_count: u64,
}

impl Comment {
  pub fn is_reply(&self) -> bool { self.parent_id.is_some() }
}

/// Input to [`crate::store::BlogStore::create_comment`].
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewComment {
  pub post_id:   Uuid,
  pub author:    Option<String>,
  pub body:      String,
  pub parent_id: Option<Uuid>,
}

impl NewComment {
  /// A top-level comment by an anonymous author.
  pub fn new(post_id: Uuid, body: impl Into<String>) -> Self {
    Self { post_id, author: None, body: body.into(), parent_id: None }
  }

  pub fn reply_to(mut self, parent_id: Uuid) -> Self {
    self.parent_id = Some(parent_id);
    self
  }

  pub fn by(mut self, author: impl Into<String>) -> Self {
    self.author = Some(author.into());
    self
  }

  /// Reject an empty body. Whitespace-only bodies count as empty.
  pub fn validate(&self) -> Result<()> {
    if self.body.trim().is_empty() {
      return Err(Error::validation("comment body must not be empty"));
    }
    Ok(())
  }

  /// The trimmed author name, or [`DEFAULT_AUTHOR`] if none was given.
  pub fn author_or_default(&self) -> &str {
    self
      .author
      .as_deref()
      .map(str::trim)
      .filter(|a| !a.is_empty())
      .unwrap_or(DEFAULT_AUTHOR)
  }
}
