//! Newsletter subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::ValidateEmail as _;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
  pub id:         Uuid,
  /// Always stored trimmed and lowercased.
  pub email:      String,
  pub created_at: DateTime<Utc>,
}

/// Trim and lowercase `raw`, rejecting anything that is not an email address.
pub fn normalize_email(raw: &str) -> Result<String> {
  let email = raw.trim().to_lowercase();
  if email.is_empty() {
    return Err(Error::validation("email is required"));
  }
  if !email.validate_email() {
    return Err(Error::validation("please enter a valid email address"));
  }
  Ok(email)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn email_is_trimmed_and_lowercased() {
    assert_eq!(normalize_email("  Reader@Example.COM ").unwrap(), "reader@example.com");
  }

  #[test]
  fn malformed_emails_are_rejected() {
    for bad in ["", "   ", "reader", "reader@", "@example.com", "a b@example.com"] {
      assert!(normalize_email(bad).is_err(), "{bad:?} accepted");
    }
  }
}
