//! Site-wide counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The singleton visitor counter shown on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStats {
  pub visitors:   u64,
  pub updated_at: DateTime<Utc>,
}
