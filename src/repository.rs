//! Read-through / write-through orchestration over one entity type.
//!
//! A repository composes the persistent store, the connectivity observer and
//! the remote service. Reads are satisfied locally whenever the cached record
//! is trustworthy, reach the remote only while online, and write fetched data
//! back through the store. Mutations go remote-first and mirror into the
//! store on success, so the next read needs no resynchronization.

use std::sync::Arc;
use tracing::debug;

use crate::cache::{CacheEntity, CacheRecord, EntityCacheStore, StalenessPolicy};
use crate::connectivity::{ConnectivityObserver, ConnectivityState};
use crate::error::RepoError;
use crate::remote::RemoteService;

/// Per-entity façade implementing the offline-first cache pattern.
///
/// Connectivity is sampled once per call: a call that starts online finishes
/// under the online rule even if the device drops mid-flight.
pub struct Repository<T: CacheEntity> {
  store: EntityCacheStore<T>,
  connectivity: ConnectivityObserver,
  remote: Arc<dyn RemoteService<T>>,
  policy: StalenessPolicy,
}

impl<T: CacheEntity> Clone for Repository<T> {
  fn clone(&self) -> Self {
    Self {
      store: self.store.clone(),
      connectivity: self.connectivity.clone(),
      remote: Arc::clone(&self.remote),
      policy: self.policy,
    }
  }
}

impl<T: CacheEntity> Repository<T> {
  pub fn new(
    store: EntityCacheStore<T>,
    connectivity: ConnectivityObserver,
    remote: Arc<dyn RemoteService<T>>,
    policy: StalenessPolicy,
  ) -> Self {
    Self {
      store,
      connectivity,
      remote,
      policy,
    }
  }

  /// Read one entity.
  ///
  /// Fresh cache hit: returned without a remote call. Offline: whatever is
  /// cached (never stale offline), or absent. Online with a miss or a stale
  /// hit: fetched from the remote and written through; a remote failure is
  /// surfaced rather than papered over with data we know is outdated.
  pub async fn get(&self, id: &str) -> Result<Option<T>, RepoError> {
    let state = self.connectivity.current();
    let now = chrono::Utc::now();

    if let Some(record) = self.store.get(id)? {
      if !self.policy.is_stale(record.refreshed_at, state, now) {
        debug!(entity_type = T::entity_type(), id, "cache hit");
        return Ok(Some(record.value));
      }
      debug!(entity_type = T::entity_type(), id, "cache hit is stale");
    }

    if state == ConnectivityState::Offline {
      debug!(entity_type = T::entity_type(), id, "offline, nothing cached");
      return Ok(None);
    }

    match self.remote.fetch(id).await? {
      Some(value) => {
        self.store.upsert(&value)?;
        Ok(Some(value))
      }
      None => Ok(None),
    }
  }

  /// Read the full collection.
  ///
  /// The cached collection is served only if it is non-empty and every member
  /// is simultaneously fresh; one stale record invalidates the whole list, so
  /// a rendered list never mixes two server snapshots. Offline, the cached
  /// collection is served as-is (possibly empty).
  pub async fn get_all(&self) -> Result<Vec<T>, RepoError> {
    self.read_collection(None).await
  }

  /// Read the subset matching `filter`, with the same all-or-nothing
  /// freshness rule applied to the filtered subset.
  pub async fn get_all_matching(&self, filter: &T::Filter) -> Result<Vec<T>, RepoError> {
    self.read_collection(Some(filter)).await
  }

  async fn read_collection(&self, filter: Option<&T::Filter>) -> Result<Vec<T>, RepoError> {
    use crate::cache::RecordFilter;

    let state = self.connectivity.current();
    let now = chrono::Utc::now();

    let cached: Vec<CacheRecord<T>> = match filter {
      Some(f) => self.store.get_all_matching(|value| f.matches(value))?,
      None => self.store.get_all()?,
    };

    let usable = !cached.is_empty()
      && cached
        .iter()
        .all(|record| !self.policy.is_stale(record.refreshed_at, state, now));

    if usable {
      debug!(
        entity_type = T::entity_type(),
        count = cached.len(),
        "collection served from cache"
      );
      return Ok(cached.into_iter().map(|record| record.value).collect());
    }

    if state == ConnectivityState::Offline {
      debug!(
        entity_type = T::entity_type(),
        count = cached.len(),
        "offline, serving cached collection as-is"
      );
      return Ok(cached.into_iter().map(|record| record.value).collect());
    }

    let fresh = match filter {
      Some(f) => self.remote.fetch_matching(f).await?,
      None => self.remote.fetch_all().await?,
    };
    self.store.upsert_many(&fresh)?;

    debug!(
      entity_type = T::entity_type(),
      count = fresh.len(),
      "collection refetched from remote"
    );
    Ok(fresh)
  }

  /// Force a remote fetch for `id`, bypassing the freshness check
  /// (pull-to-refresh). Fails `Unreachable` while offline.
  pub async fn refresh(&self, id: &str) -> Result<Option<T>, RepoError> {
    if self.connectivity.current() == ConnectivityState::Offline {
      return Err(RepoError::Unreachable("device is offline".into()));
    }

    match self.remote.fetch(id).await? {
      Some(value) => {
        self.store.upsert(&value)?;
        Ok(Some(value))
      }
      None => Ok(None),
    }
  }

  /// Create an entity. Remote first (it enforces id uniqueness); on success
  /// the value is mirrored into the cache.
  pub async fn add(&self, entity: &T) -> Result<(), RepoError> {
    self.remote.create(entity).await?;
    self.store.upsert(entity)?;
    Ok(())
  }

  /// Replace an entity. Remote first (it enforces existence); on success the
  /// new value is mirrored into the cache.
  pub async fn edit(&self, id: &str, entity: &T) -> Result<(), RepoError> {
    self.remote.update(id, entity).await?;
    self.store.upsert(entity)?;
    Ok(())
  }

  /// Delete an entity. Remote first; on success the cached record goes too.
  pub async fn delete(&self, id: &str) -> Result<(), RepoError> {
    self.remote.remove(id).await?;
    self.store.delete(id)?;
    Ok(())
  }

  /// Drop every cached record for this entity type (e.g. on sign-out).
  /// Local-only; the remote is untouched.
  pub fn clear(&self) -> Result<(), crate::error::StoreError> {
    self.store.clear()
  }

  #[cfg(test)]
  pub(crate) fn store(&self) -> &EntityCacheStore<T> {
    &self.store
  }
}
