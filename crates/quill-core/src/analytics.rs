//! Per-post engagement counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Engagement figures for one post. At most one record exists per post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAnalytics {
  pub post_id:         Uuid,
  pub views:           u64,
  pub shares:          u64,
  pub likes:           u64,
  pub comments:        u64,
  pub engagement_rate: f64,
  pub updated_at:      DateTime<Utc>,
}

/// Counter values supplied by a caller.
///
/// How an absent field is read depends on the operation: zero for
/// [`initial`](Self::initial) and [`increment`](Self::increment), unchanged
/// for [`replace`](Self::replace).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsFields {
  pub views:           Option<u64>,
  pub shares:          Option<u64>,
  pub likes:           Option<u64>,
  pub comments:        Option<u64>,
  pub engagement_rate: Option<f64>,
}

impl AnalyticsFields {
  pub fn validate(&self) -> Result<()> {
    match self.engagement_rate {
      Some(r) if !r.is_finite() || r < 0.0 => {
        Err(Error::validation("engagementRate must be a non-negative number"))
      }
      _ => Ok(()),
    }
  }

  /// A fresh record for `post_id`.
  pub fn initial(self, post_id: Uuid, at: DateTime<Utc>) -> PostAnalytics {
    PostAnalytics {
      post_id,
      views: self.views.unwrap_or(0),
      shares: self.shares.unwrap_or(0),
      likes: self.likes.unwrap_or(0),
      comments: self.comments.unwrap_or(0),
      engagement_rate: self.engagement_rate.unwrap_or(0.0),
      updated_at: at,
    }
  }

  /// Overwrite the fields that are present.
  pub fn replace(self, a: &mut PostAnalytics, at: DateTime<Utc>) {
    if let Some(v) = self.views {
      a.views = v;
    }
    if let Some(v) = self.shares {
      a.shares = v;
    }
    if let Some(v) = self.likes {
      a.likes = v;
    }
    if let Some(v) = self.comments {
      a.comments = v;
    }
    if let Some(r) = self.engagement_rate {
      a.engagement_rate = r;
    }
    a.updated_at = at;
  }

  /// Add the fields that are present. Counters saturate.
  pub fn increment(self, a: &mut PostAnalytics, at: DateTime<Utc>) {
    a.views = a.views.saturating_add(self.views.unwrap_or(0));
    a.shares = a.shares.saturating_add(self.shares.unwrap_or(0));
    a.likes = a.likes.saturating_add(self.likes.unwrap_or(0));
    a.comments = a.comments.saturating_add(self.comments.unwrap_or(0));
    a.engagement_rate += self.engagement_rate.unwrap_or(0.0);
    a.updated_at = at;
  }
}
