//! ETag computation for comment threads.
//!
//! ETags are SHA-256 hashes over the sorted (id, created_at, like_count)
//! triples of every comment on a post. The flat list fully determines the
//! built thread, so equal ETags mean equal responses.

use axum::http::{HeaderMap, header};
use quill_core::comment::Comment;
use sha2::{Digest, Sha256};

/// Compute a strong, quoted ETag for the comments of one post.
///
/// Stable: the same comments in any order give the same ETag.
pub fn thread_etag(comments: &[Comment]) -> String {
  let mut triples: Vec<_> = comments
    .iter()
    .map(|c| (c.id, c.created_at, c.like_count))
    .collect();
  triples.sort_by_key(|(id, _, _)| *id);

  let mut hasher = Sha256::new();
  for (id, ts, likes) in &triples {
    hasher.update(id.as_bytes());
    hasher.update(ts.timestamp_micros().to_le_bytes());
    hasher.update(likes.to_le_bytes());
  }
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Whether an `If-None-Match` header lists `etag` (or `*`).
///
/// Some clients send the tag without its surrounding quotes; both forms
/// match.
pub fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
  let bare = etag.trim_matches('"');
  headers
    .get_all(header::IF_NONE_MATCH)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(','))
    .map(|t| t.trim().trim_start_matches("W/").trim_matches('"'))
    .any(|t| t == "*" || t == bare)
}
