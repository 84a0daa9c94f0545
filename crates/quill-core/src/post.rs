//! Blog post types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// How many of the most-viewed posts the listing marks as featured.
pub const FEATURED_COUNT: usize = 7;

/// Characters read per minute: five-character words at 200 words a minute.
const CHARS_PER_MINUTE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  pub id:               Uuid,
  pub title:            String,
  /// URL-safe form of the title; unique.
  pub slug:             String,
  pub content:          String,
  pub tags:             Vec<String>,
  pub views:            u64,
  pub is_featured:      bool,
  /// Estimated minutes to read `content`.
  pub reading_time:     u32,
  pub meta_title:       Option<String>,
  pub meta_description: Option<String>,
  pub meta_keywords:    Vec<String>,
  pub image:            Option<String>,
  pub published_at:     DateTime<Utc>,
  pub created_at:       DateTime<Utc>,
}

/// Input to [`crate::store::BlogStore::create_post`].
#[derive(Debug, Clone, Default)]
pub struct NewPost {
  pub title:            String,
  pub content:          String,
  pub tags:             Vec<String>,
  pub views:            u64,
  pub is_featured:      bool,
  pub meta_title:       Option<String>,
  pub meta_description: Option<String>,
  pub meta_keywords:    Vec<String>,
  pub image:            Option<String>,
  /// Defaults to the creation time.
  pub published_at:     Option<DateTime<Utc>>,
}

impl NewPost {
  pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
    Self { title: title.into(), content: content.into(), ..Default::default() }
  }

  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() || self.content.trim().is_empty() {
      return Err(Error::validation("title and content are required"));
    }
    if slugify(&self.title).is_empty() {
      return Err(Error::validation("title must contain a letter or digit"));
    }
    Ok(())
  }
}

/// A partial update. `None` leaves a field as it is.
///
/// When `views` is `None` the view counter is incremented by one instead:
/// clients update a post as they display it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
  pub title:            Option<String>,
  pub content:          Option<String>,
  pub tags:             Option<Vec<String>>,
  pub views:            Option<u64>,
  pub is_featured:      Option<bool>,
  pub meta_title:       Option<String>,
  pub meta_description: Option<String>,
  pub meta_keywords:    Option<Vec<String>>,
  pub image:            Option<String>,
  pub published_at:     Option<DateTime<Utc>>,
}

impl PostPatch {
  pub fn validate(&self) -> Result<()> {
    if self.title.as_deref().is_some_and(|t| slugify(t).is_empty()) {
      return Err(Error::validation("title must contain a letter or digit"));
    }
    if self.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
      return Err(Error::validation("content must not be empty"));
    }
    Ok(())
  }

  /// Apply the patch to `post`, recomputing derived fields.
  pub fn apply(self, post: &mut Post) {
    if let Some(title) = self.title {
      post.slug = slugify(&title);
      post.title = title.trim().to_owned();
    }
    if let Some(content) = self.content {
      post.reading_time = reading_time(&content);
      post.content = content;
    }
    if let Some(tags) = self.tags {
      post.tags = tags;
    }
    match self.views {
      Some(v) => post.views = v,
      None => post.views = post.views.saturating_add(1),
    }
    if let Some(f) = self.is_featured {
      post.is_featured = f;
    }
    if self.meta_title.is_some() {
      post.meta_title = self.meta_title;
    }
    if self.meta_description.is_some() {
      post.meta_description = self.meta_description;
    }
    if let Some(k) = self.meta_keywords {
      post.meta_keywords = k;
    }
    if self.image.is_some() {
      post.image = self.image;
    }
    if let Some(at) = self.published_at {
      post.published_at = at;
    }
  }
}

/// Lowercase ASCII alphanumerics separated by single dashes.
pub fn slugify(title: &str) -> String {
  let mut slug = String::with_capacity(title.len());
  for ch in title.chars() {
    if ch.is_ascii_alphanumeric() {
      slug.push(ch.to_ascii_lowercase());
    } else if !slug.is_empty() && !slug.ends_with('-') {
      slug.push('-');
    }
  }
  while slug.ends_with('-') {
    slug.pop();
  }
  slug
}

/// Whole minutes, rounded up; never less than one.
pub fn reading_time(content: &str) -> u32 {
  let chars = content.chars().count();
  chars.div_ceil(CHARS_PER_MINUTE).max(1) as u32
}
