//! Error types for the cached data layer.

use thiserror::Error;

/// Failures surfaced to calling use-cases by a repository.
///
/// Cache misses and staleness are resolved internally and never appear here;
/// an absent entity is `Ok(None)`, not an error.
#[derive(Debug, Error)]
pub enum RepoError {
  /// The remote service rejected a create because the id is already taken.
  #[error("entity already exists: {0}")]
  AlreadyExists(String),

  /// The remote service has no entity with this id (edit/delete only).
  #[error("entity not found: {0}")]
  NotFound(String),

  /// The device looked online but the remote call failed.
  #[error("remote service unreachable: {0}")]
  Unreachable(String),

  /// The local persistence layer failed an operation.
  #[error(transparent)]
  Store(#[from] StoreError),
}

/// Failures raised by the remote service adapter.
///
/// The repository forwards these without retrying; identity violations map
/// one-to-one onto [`RepoError`] variants.
#[derive(Debug, Error)]
pub enum RemoteError {
  #[error("already exists: {0}")]
  AlreadyExists(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("unreachable: {0}")]
  Unreachable(String),
}

impl From<RemoteError> for RepoError {
  fn from(err: RemoteError) -> Self {
    match err {
      RemoteError::AlreadyExists(id) => RepoError::AlreadyExists(id),
      RemoteError::NotFound(id) => RepoError::NotFound(id),
      RemoteError::Unreachable(reason) => RepoError::Unreachable(reason),
    }
  }
}

/// Failures from the SQLite-backed store.
///
/// Corrupt cached bytes are *not* represented here: a record that fails to
/// decode is logged and treated as absent, per the degrade-to-empty policy.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("cache database error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("failed to serialize entity for caching: {0}")]
  Encode(#[from] serde_json::Error),

  #[error("cache connection lock poisoned")]
  LockPoisoned,
}
