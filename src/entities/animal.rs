//! Animal profiles.

use serde::{Deserialize, Serialize};

use crate::cache::{CacheEntity, RecordFilter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
  pub id: String,
  pub name: String,
  pub species: String,
  pub breed: Option<String>,
  pub description: Option<String>,
  pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimalFilter {
  /// Case-insensitive species match ("dog", "Dog" and "DOG" are one species).
  BySpecies(String),
}

impl RecordFilter<Animal> for AnimalFilter {
  fn matches(&self, animal: &Animal) -> bool {
    match self {
      AnimalFilter::BySpecies(species) => animal.species.eq_ignore_ascii_case(species),
    }
  }
}

impl CacheEntity for Animal {
  type Filter = AnimalFilter;

  fn entity_id(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "animal"
  }
}
