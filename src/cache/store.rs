//! Generic persistent store of cached records for one entity type.
//!
//! The store is deliberately dumb: it persists, retrieves, and removes
//! records and stamps them with a refresh instant. Whether a record is still
//! trustworthy is the repository's decision, not the store's.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use crate::error::StoreError;

use super::traits::{CacheEntity, CacheRecord};

/// Keyed store of [`CacheRecord`]s for one entity type, backed by the shared
/// cache database.
///
/// Every operation takes the connection lock for its full duration, so
/// concurrent writers serialize and readers always see whole snapshots,
/// never a half-applied batch.
pub struct EntityCacheStore<T: CacheEntity> {
  pub(super) conn: Arc<Mutex<Connection>>,
  pub(super) _entity: PhantomData<T>,
}

impl<T: CacheEntity> Clone for EntityCacheStore<T> {
  fn clone(&self) -> Self {
    Self {
      conn: Arc::clone(&self.conn),
      _entity: PhantomData,
    }
  }
}

impl<T: CacheEntity> EntityCacheStore<T> {
  fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
    self.conn.lock().map_err(|_| StoreError::LockPoisoned)
  }

  /// Look up a single record. Does not apply staleness.
  pub fn get(&self, id: &str) -> Result<Option<CacheRecord<T>>, StoreError> {
    let conn = self.conn()?;

    let mut stmt = conn.prepare(
      "SELECT data, refreshed_at FROM entity_cache
       WHERE entity_type = ? AND entity_key = ?",
    )?;

    let row: Option<(Vec<u8>, String)> = stmt
      .query_row(params![T::entity_type(), id], |row| {
        Ok((row.get(0)?, row.get(1)?))
      })
      .ok();

    Ok(row.and_then(|(data, refreshed_at)| decode_record(id, &data, &refreshed_at)))
  }

  /// Snapshot of every record currently held for this entity type.
  pub fn get_all(&self) -> Result<Vec<CacheRecord<T>>, StoreError> {
    self.get_all_matching(|_| true)
  }

  /// Filtered snapshot (used for "by author", "by assignee", ...).
  pub fn get_all_matching<F>(&self, predicate: F) -> Result<Vec<CacheRecord<T>>, StoreError>
  where
    F: Fn(&T) -> bool,
  {
    let conn = self.conn()?;

    let mut stmt = conn.prepare(
      "SELECT entity_key, data, refreshed_at FROM entity_cache
       WHERE entity_type = ?",
    )?;

    let rows: Vec<(String, Vec<u8>, String)> = stmt
      .query_map(params![T::entity_type()], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
      })?
      .filter_map(|r| r.ok())
      .collect();

    Ok(
      rows
        .into_iter()
        .filter_map(|(key, data, refreshed_at)| decode_record(&key, &data, &refreshed_at))
        .filter(|record| predicate(&record.value))
        .collect(),
    )
  }

  /// Set the record for `value`'s id to `{value, now}`, replacing any
  /// previous record wholesale.
  pub fn upsert(&self, value: &T) -> Result<(), StoreError> {
    let conn = self.conn()?;
    insert_record(&conn, value, &now_stamp())?;
    Ok(())
  }

  /// Batched upsert in a single transaction.
  pub fn upsert_many(&self, values: &[T]) -> Result<(), StoreError> {
    let conn = self.conn()?;
    let stamp = now_stamp();

    conn.execute("BEGIN TRANSACTION", [])?;
    for value in values {
      if let Err(e) = insert_record(&conn, value, &stamp) {
        let _ = conn.execute("ROLLBACK", []);
        return Err(e);
      }
    }
    conn.execute("COMMIT", [])?;

    Ok(())
  }

  /// Remove the record for `id`, if any.
  pub fn delete(&self, id: &str) -> Result<(), StoreError> {
    let conn = self.conn()?;
    conn.execute(
      "DELETE FROM entity_cache WHERE entity_type = ? AND entity_key = ?",
      params![T::entity_type(), id],
    )?;
    Ok(())
  }

  /// Remove every record whose value matches the predicate.
  ///
  /// Selection and deletion happen under one lock acquisition: a concurrent
  /// upsert cannot slip between deciding a record matches and deleting it.
  pub fn delete_matching<F>(&self, predicate: F) -> Result<(), StoreError>
  where
    F: Fn(&T) -> bool,
  {
    let conn = self.conn()?;

    let rows: Vec<(String, Vec<u8>, String)> = {
      let mut stmt = conn.prepare(
        "SELECT entity_key, data, refreshed_at FROM entity_cache
         WHERE entity_type = ?",
      )?;
      let rows = stmt
        .query_map(params![T::entity_type()], |row| {
          Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?
        .filter_map(|r| r.ok())
        .collect();
      rows
    };

    let doomed: Vec<String> = rows
      .into_iter()
      .filter_map(|(key, data, refreshed_at)| {
        decode_record::<T>(&key, &data, &refreshed_at).map(|record| (key, record))
      })
      .filter(|(_, record)| predicate(&record.value))
      .map(|(key, _)| key)
      .collect();

    conn.execute("BEGIN TRANSACTION", [])?;
    for id in &doomed {
      if let Err(e) = conn.execute(
        "DELETE FROM entity_cache WHERE entity_type = ? AND entity_key = ?",
        params![T::entity_type(), id],
      ) {
        let _ = conn.execute("ROLLBACK", []);
        return Err(e.into());
      }
    }
    conn.execute("COMMIT", [])?;

    Ok(())
  }

  /// Empty the store for this entity type.
  pub fn clear(&self) -> Result<(), StoreError> {
    let conn = self.conn()?;
    conn.execute(
      "DELETE FROM entity_cache WHERE entity_type = ?",
      params![T::entity_type()],
    )?;
    Ok(())
  }

  /// Number of records held for this entity type.
  pub fn len(&self) -> Result<usize, StoreError> {
    let conn = self.conn()?;
    let count: i64 = conn.query_row(
      "SELECT COUNT(*) FROM entity_cache WHERE entity_type = ?",
      params![T::entity_type()],
      |row| row.get(0),
    )?;
    Ok(count as usize)
  }

  pub fn is_empty(&self) -> Result<bool, StoreError> {
    Ok(self.len()? == 0)
  }

  /// Rewrite a record's refresh instant. Tests use this to age records
  /// without sleeping through a TTL.
  #[cfg(test)]
  pub(crate) fn backdate(&self, id: &str, refreshed_at: DateTime<Utc>) -> Result<(), StoreError> {
    let conn = self.conn()?;
    conn.execute(
      "UPDATE entity_cache SET refreshed_at = ? WHERE entity_type = ? AND entity_key = ?",
      params![
        refreshed_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        T::entity_type(),
        id
      ],
    )?;
    Ok(())
  }
}

fn insert_record<T: CacheEntity>(conn: &Connection, value: &T, stamp: &str) -> Result<(), StoreError> {
  let data = serde_json::to_vec(value)?;
  conn.execute(
    "INSERT OR REPLACE INTO entity_cache (entity_type, entity_key, data, refreshed_at)
     VALUES (?, ?, ?, ?)",
    params![T::entity_type(), value.entity_id(), data, stamp],
  )?;
  Ok(())
}

fn now_stamp() -> String {
  Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode one row into a record. Undecodable bytes or a mangled timestamp
/// mean local corruption; the row is logged and treated as absent rather
/// than failing the read.
fn decode_record<T: CacheEntity>(
  key: &str,
  data: &[u8],
  refreshed_at: &str,
) -> Option<CacheRecord<T>> {
  let value: T = match serde_json::from_slice(data) {
    Ok(value) => value,
    Err(e) => {
      warn!(
        entity_type = T::entity_type(),
        entity_key = key,
        error = %e,
        "corrupt cached record, treating as absent"
      );
      return None;
    }
  };

  let refreshed_at = match DateTime::parse_from_rfc3339(refreshed_at) {
    Ok(dt) => dt.with_timezone(&Utc),
    Err(e) => {
      warn!(
        entity_type = T::entity_type(),
        entity_key = key,
        error = %e,
        "corrupt refresh timestamp, treating record as absent"
      );
      return None;
    }
  };

  Some(CacheRecord { value, refreshed_at })
}

#[cfg(test)]
mod tests {
  use super::super::db::CacheDb;
  use super::super::traits::NoFilter;
  use super::*;
  use serde::{Deserialize, Serialize};

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Note {
    id: String,
    body: String,
  }

  impl CacheEntity for Note {
    type Filter = NoFilter;

    fn entity_id(&self) -> String {
      self.id.clone()
    }

    fn entity_type() -> &'static str {
      "note"
    }
  }

  fn note(id: &str, body: &str) -> Note {
    Note {
      id: id.to_string(),
      body: body.to_string(),
    }
  }

  fn store() -> (CacheDb, EntityCacheStore<Note>) {
    let db = CacheDb::open_in_memory().unwrap();
    let store = db.store::<Note>();
    (db, store)
  }

  #[test]
  fn test_get_absent_returns_none() {
    let (_db, store) = store();
    assert!(store.get("missing").unwrap().is_none());
  }

  #[test]
  fn test_upsert_then_get_roundtrip() {
    let (_db, store) = store();
    let before = Utc::now();

    store.upsert(&note("a", "hello")).unwrap();

    let record = store.get("a").unwrap().expect("record should exist");
    assert_eq!(record.value, note("a", "hello"));
    assert!(record.refreshed_at >= before);
    assert!(record.refreshed_at <= Utc::now());
  }

  #[test]
  fn test_upsert_replaces_value_and_timestamp() {
    let (_db, store) = store();
    store.upsert(&note("a", "v1")).unwrap();
    store.backdate("a", Utc::now() - chrono::Duration::hours(1)).unwrap();
    let old = store.get("a").unwrap().unwrap();

    store.upsert(&note("a", "v2")).unwrap();
    let new = store.get("a").unwrap().unwrap();

    assert_eq!(new.value.body, "v2");
    assert!(new.refreshed_at > old.refreshed_at);
    assert_eq!(store.len().unwrap(), 1);
  }

  #[test]
  fn test_upsert_many_and_get_all() {
    let (_db, store) = store();
    store
      .upsert_many(&[note("a", "1"), note("b", "2"), note("c", "3")])
      .unwrap();

    let all = store.get_all().unwrap();
    assert_eq!(all.len(), 3);
  }

  #[test]
  fn test_get_all_matching_filters_values() {
    let (_db, store) = store();
    store
      .upsert_many(&[note("a", "keep"), note("b", "drop"), note("c", "keep")])
      .unwrap();

    let kept = store.get_all_matching(|n| n.body == "keep").unwrap();
    assert_eq!(kept.len(), 2);
  }

  #[test]
  fn test_delete_and_delete_matching() {
    let (_db, store) = store();
    store
      .upsert_many(&[note("a", "x"), note("b", "y"), note("c", "y")])
      .unwrap();

    store.delete("a").unwrap();
    assert!(store.get("a").unwrap().is_none());

    store.delete_matching(|n| n.body == "y").unwrap();
    assert!(store.is_empty().unwrap());
  }

  #[test]
  fn test_delete_matching_does_not_clobber_concurrent_upsert() {
    let (_db, store) = store();

    for _ in 0..50 {
      store.upsert(&note("b", "y")).unwrap();

      let deleter = store.clone();
      let upserter = store.clone();
      let t1 = std::thread::spawn(move || deleter.delete_matching(|n| n.body == "y").unwrap());
      let t2 = std::thread::spawn(move || upserter.upsert(&note("b", "x")).unwrap());
      t1.join().unwrap();
      t2.join().unwrap();

      // Whichever transaction applied last wins: either the delete ran first
      // and the upsert re-created "b", or the upsert ran first and "b" no
      // longer matched the predicate. In both orders the non-matching write
      // survives.
      let record = store.get("b").unwrap().expect("committed upsert must survive");
      assert_eq!(record.value.body, "x");

      store.delete("b").unwrap();
    }
  }

  #[test]
  fn test_clear_empties_only_this_entity_type() {
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Other {
      id: String,
    }
    impl CacheEntity for Other {
      type Filter = NoFilter;
      fn entity_id(&self) -> String {
        self.id.clone()
      }
      fn entity_type() -> &'static str {
        "other"
      }
    }

    let db = CacheDb::open_in_memory().unwrap();
    let notes = db.store::<Note>();
    let others = db.store::<Other>();

    notes.upsert(&note("a", "1")).unwrap();
    others.upsert(&Other { id: "z".into() }).unwrap();

    notes.clear().unwrap();
    assert!(notes.is_empty().unwrap());
    assert_eq!(others.len().unwrap(), 1);
  }

  #[test]
  fn test_corrupt_row_treated_as_absent() {
    let (db, store) = store();
    store.upsert(&note("good", "fine")).unwrap();

    {
      let conn = db.connection().lock().unwrap();
      conn
        .execute(
          "INSERT INTO entity_cache (entity_type, entity_key, data, refreshed_at)
           VALUES (?, ?, ?, ?)",
          params!["note", "bad", b"{not json".to_vec(), now_stamp()],
        )
        .unwrap();
    }

    assert!(store.get("bad").unwrap().is_none());

    // The corrupt row must not poison the rest of the snapshot.
    let all = store.get_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].value.id, "good");
  }
}
