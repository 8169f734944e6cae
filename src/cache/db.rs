//! Cache database handle: open, migrate, recover from corruption.

use rusqlite::Connection;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::error::StoreError;

use super::store::EntityCacheStore;
use super::traits::CacheEntity;

/// Schema for the cache table. Values are serialized JSON; `refreshed_at` is
/// an RFC 3339 instant written by the store on every upsert.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS entity_cache (
    entity_type TEXT NOT NULL,
    entity_key TEXT NOT NULL,
    data BLOB NOT NULL,
    refreshed_at TEXT NOT NULL,
    PRIMARY KEY (entity_type, entity_key)
);
"#;

/// One SQLite database holding the cache for every entity type.
///
/// All per-entity stores created from a `CacheDb` share its connection, so
/// writes across entity types serialize through one lock.
#[derive(Clone)]
pub struct CacheDb {
  conn: Arc<Mutex<Connection>>,
}

impl CacheDb {
  /// Open (or create) the cache database at `path`.
  ///
  /// A corrupt database file is not an error: it is logged, deleted, and
  /// recreated empty, so callers always start from a usable (possibly empty)
  /// cache.
  pub fn open(path: &Path) -> Result<Self, StoreError> {
    if let Some(parent) = path.parent() {
      if let Err(e) = std::fs::create_dir_all(parent) {
        warn!(dir = %parent.display(), error = %e, "failed to create cache directory");
      }
    }

    match Self::try_open(path) {
      Ok(db) => Ok(db),
      Err(e) => {
        warn!(
          path = %path.display(),
          error = %e,
          "cache database unreadable, recreating empty"
        );
        let _ = std::fs::remove_file(path);
        Self::try_open(path)
      }
    }
  }

  /// Open an in-memory database. Used by tests and as a last-resort fallback
  /// when no writable data directory exists.
  pub fn open_in_memory() -> Result<Self, StoreError> {
    Self::from_connection(Connection::open_in_memory()?)
  }

  fn try_open(path: &Path) -> Result<Self, StoreError> {
    Self::from_connection(Connection::open(path)?)
  }

  fn from_connection(conn: Connection) -> Result<Self, StoreError> {
    conn.execute_batch(CACHE_SCHEMA)?;
    Ok(Self {
      conn: Arc::new(Mutex::new(conn)),
    })
  }

  /// Create the store view for one entity type.
  pub fn store<T: CacheEntity>(&self) -> EntityCacheStore<T> {
    EntityCacheStore {
      conn: Arc::clone(&self.conn),
      _entity: PhantomData,
    }
  }

  pub(crate) fn connection(&self) -> &Arc<Mutex<Connection>> {
    &self.conn
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_corrupt_file_recreated_empty() {
    let dir = std::env::temp_dir().join(format!("pawfeed-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("corrupt.db");

    // Not a SQLite file at all.
    std::fs::write(&path, b"definitely not a database").unwrap();

    let db = CacheDb::open(&path).expect("corrupt file should be recreated");
    let conn = db.connection().lock().unwrap();
    let count: i64 = conn
      .query_row("SELECT COUNT(*) FROM entity_cache", [], |row| row.get(0))
      .unwrap();
    assert_eq!(count, 0);

    drop(conn);
    let _ = std::fs::remove_dir_all(&dir);
  }
}
