//! The remote service seam.
//!
//! The authoritative data service lives outside this crate; repositories only
//! see it through this trait. Adapters over the real transport implement it,
//! and tests substitute fakes.

use async_trait::async_trait;

use crate::cache::CacheEntity;
use crate::error::RemoteError;

/// CRUD surface of the authoritative remote service for one entity type.
///
/// The remote enforces identity invariants: `create` fails on a taken id,
/// `update`/`remove` fail on an unknown one. The cache layer forwards those
/// failures without retrying.
#[async_trait]
pub trait RemoteService<T: CacheEntity>: Send + Sync {
  /// Fetch one entity. `Ok(None)` means the remote has no such entity;
  /// that is a valid result, not an error.
  async fn fetch(&self, id: &str) -> Result<Option<T>, RemoteError>;

  /// Fetch the full collection.
  async fn fetch_all(&self) -> Result<Vec<T>, RemoteError>;

  /// Fetch the subset matching `filter` ("posts by author", ...).
  async fn fetch_matching(&self, filter: &T::Filter) -> Result<Vec<T>, RemoteError>;

  /// Create a new entity. Fails `AlreadyExists` if the id is taken.
  async fn create(&self, entity: &T) -> Result<(), RemoteError>;

  /// Replace an existing entity. Fails `NotFound` if the id is unknown.
  async fn update(&self, id: &str, entity: &T) -> Result<(), RemoteError>;

  /// Delete an existing entity. Fails `NotFound` if the id is unknown.
  async fn remove(&self, id: &str) -> Result<(), RemoteError>;
}
