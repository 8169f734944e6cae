//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheEntity, NoFilter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id: String,
  pub username: String,
  pub email: String,
  pub bio: Option<String>,
  pub avatar_url: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl CacheEntity for User {
  type Filter = NoFilter;

  fn entity_id(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "user"
  }
}
