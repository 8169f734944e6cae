//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Trait for entities that can be cached.
///
/// Implementors provide a unique identifier, a type tag for storage
/// organization, and a filter type for the "by author"-style subset queries.
pub trait CacheEntity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  /// Filter type for subset queries. Entities with no subset queries use
  /// [`NoFilter`].
  type Filter: RecordFilter<Self>;

  /// Unique identifier for this entity (e.g., user id, post id).
  fn entity_id(&self) -> String;

  /// Entity type name for storage organization (e.g., "user", "post").
  fn entity_type() -> &'static str;
}

/// A filter over cached entities, mirrored on the remote side by
/// `RemoteService::fetch_matching`.
pub trait RecordFilter<T>: Clone + Send + Sync {
  fn matches(&self, entity: &T) -> bool;
}

/// Filter type for entities that have no subset queries. Uninhabited, so a
/// filtered call can never be constructed for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoFilter {}

impl<T> RecordFilter<T> for NoFilter {
  fn matches(&self, _entity: &T) -> bool {
    match *self {}
  }
}

/// A cached value together with the instant the store last wrote it.
///
/// `refreshed_at` is assigned by the store at write time; it says when the
/// bytes were persisted, not when the value was created remotely.
#[derive(Debug, Clone)]
pub struct CacheRecord<T> {
  pub value: T,
  pub refreshed_at: DateTime<Utc>,
}
