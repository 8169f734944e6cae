//! User-to-animal ownership.
//!
//! One record per user, keyed by the owner's id, listing the animals they
//! own. Kept as its own entity (rather than a field on `User`) because
//! ownership changes on a different cadence than profile data and is edited
//! through its own remote endpoint.

use serde::{Deserialize, Serialize};

use crate::cache::{CacheEntity, NoFilter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAnimals {
  pub user_id: String,
  pub animal_ids: Vec<String>,
}

impl UserAnimals {
  pub fn owns(&self, animal_id: &str) -> bool {
    self.animal_ids.iter().any(|id| id == animal_id)
  }
}

impl CacheEntity for UserAnimals {
  type Filter = NoFilter;

  fn entity_id(&self) -> String {
    self.user_id.clone()
  }

  fn entity_type() -> &'static str {
    "user_animals"
  }
}
