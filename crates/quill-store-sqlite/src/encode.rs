//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as fixed-width RFC 3339 strings (microseconds,
//! `Z` suffix) so that lexical order equals chronological order. String lists
//! are stored as compact JSON. UUIDs are stored as hyphenated lowercase
//! strings.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use quill_core::{
  analytics::PostAnalytics, comment::Comment, post::Post, stats::SiteStats,
  subscriber::Subscriber,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time at the precision it will be stored with, so a value
/// returned from a write equals the value read back later.
pub fn now() -> DateTime<Utc> {
  let now = Utc::now();
  decode_dt(&encode_dt(now)).unwrap_or(now)
}

// ─── Lists ───────────────────────────────────────────────────────────────────

pub fn encode_list(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_list(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Counters ────────────────────────────────────────────────────────────────

pub fn encode_count(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

pub fn decode_count(n: i64) -> u64 { u64::try_from(n).unwrap_or(0) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawComment::from_row`].
pub const COMMENT_COLUMNS: &str =
  "id, post_id, author, body, created_at, parent_id, like_count";

/// Raw values read directly from a `comments` row.
pub struct RawComment {
  pub id:         String,
  pub post_id:    String,
  pub author:     String,
  pub body:       String,
  pub created_at: String,
  pub parent_id:  Option<String>,
  pub like_count: i64,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      post_id:    row.get(1)?,
      author:     row.get(2)?,
      body:       row.get(3)?,
      created_at: row.get(4)?,
      parent_id:  row.get(5)?,
      like_count: row.get(6)?,
    })
  }

  /// Decode without `child_ids`; see [`attach_child_ids`].
  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      id:         decode_uuid(&self.id)?,
      post_id:    decode_uuid(&self.post_id)?,
      author:     self.author,
      body:       self.body,
      created_at: decode_dt(&self.created_at)?,
      parent_id:  self.parent_id.as_deref().map(decode_uuid).transpose()?,
      child_ids:  Vec::new(),
      like_count: decode_count(self.like_count),
    })
  }
}

/// Fill `child_ids` for every comment from the `parent_id` links within the
/// slice. Children keep the slice's order.
pub fn attach_child_ids(comments: &mut [Comment]) {
  let index: HashMap<Uuid, usize> =
    comments.iter().enumerate().map(|(i, c)| (c.id, i)).collect();

  let links: Vec<(usize, Uuid)> = comments
    .iter()
    .filter_map(|c| {
      let parent = c.parent_id.filter(|p| *p != c.id)?;
      index.get(&parent).map(|&p| (p, c.id))
    })
    .collect();

  for c in comments.iter_mut() {
    c.child_ids.clear();
  }
  for (p, child) in links {
    comments[p].child_ids.push(child);
  }
}

/// Column list matching [`RawPost::from_row`].
pub const POST_COLUMNS: &str = "id, title, slug, content, tags, views, is_featured, \
  reading_time, meta_title, meta_description, meta_keywords, image, published_at, created_at";

/// Raw values read directly from a `posts` row.
pub struct RawPost {
  pub id:               String,
  pub title:            String,
  pub slug:             String,
  pub content:          String,
  pub tags:             String,
  pub views:            i64,
  pub is_featured:      bool,
  pub reading_time:     u32,
  pub meta_title:       Option<String>,
  pub meta_description: Option<String>,
  pub meta_keywords:    String,
  pub image:            Option<String>,
  pub published_at:     String,
  pub created_at:       String,
}

impl RawPost {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      title:            row.get(1)?,
      slug:             row.get(2)?,
      content:          row.get(3)?,
      tags:             row.get(4)?,
      views:            row.get(5)?,
      is_featured:      row.get(6)?,
      reading_time:     row.get(7)?,
      meta_title:       row.get(8)?,
      meta_description: row.get(9)?,
      meta_keywords:    row.get(10)?,
      image:            row.get(11)?,
      published_at:     row.get(12)?,
      created_at:       row.get(13)?,
    })
  }

  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:               decode_uuid(&self.id)?,
      title:            self.title,
      slug:             self.slug,
      content:          self.content,
      tags:             decode_list(&self.tags)?,
      views:            decode_count(self.views),
      is_featured:      self.is_featured,
      reading_time:     self.reading_time,
      meta_title:       self.meta_title,
      meta_description: self.meta_description,
      meta_keywords:    decode_list(&self.meta_keywords)?,
      image:            self.image,
      published_at:     decode_dt(&self.published_at)?,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawAnalytics::from_row`].
pub const ANALYTICS_COLUMNS: &str =
  "post_id, views, shares, likes, comments, engagement_rate, updated_at";

/// Raw values read directly from a `post_analytics` row.
pub struct RawAnalytics {
  pub post_id:         String,
  pub views:           i64,
  pub shares:          i64,
  pub likes:           i64,
  pub comments:        i64,
  pub engagement_rate: f64,
  pub updated_at:      String,
}

impl RawAnalytics {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      post_id:         row.get(0)?,
      views:           row.get(1)?,
      shares:          row.get(2)?,
      likes:           row.get(3)?,
      comments:        row.get(4)?,
      engagement_rate: row.get(5)?,
      updated_at:      row.get(6)?,
    })
  }

  pub fn into_analytics(self) -> Result<PostAnalytics> {
    Ok(PostAnalytics {
      post_id:         decode_uuid(&self.post_id)?,
      views:           decode_count(self.views),
      shares:          decode_count(self.shares),
      likes:           decode_count(self.likes),
      comments:        decode_count(self.comments),
      engagement_rate: self.engagement_rate,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `subscribers` row.
pub struct RawSubscriber {
  pub id:         String,
  pub email:      String,
  pub created_at: String,
}

impl RawSubscriber {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { id: row.get(0)?, email: row.get(1)?, created_at: row.get(2)? })
  }

  pub fn into_subscriber(self) -> Result<Subscriber> {
    Ok(Subscriber {
      id:         decode_uuid(&self.id)?,
      email:      self.email,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from the `site_stats` singleton.
pub struct RawStats {
  pub visitors:   i64,
  pub updated_at: String,
}

impl RawStats {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { visitors: row.get(0)?, updated_at: row.get(1)? })
  }

  pub fn into_stats(self) -> Result<SiteStats> {
    Ok(SiteStats {
      visitors:   decode_count(self.visitors),
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
