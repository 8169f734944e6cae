//! Wiring of the five entity repositories over one cache database.

use std::sync::Arc;

use crate::cache::{CacheDb, StalenessPolicy};
use crate::connectivity::ConnectivityObserver;
use crate::entities::{Animal, Post, Report, User, UserAnimals};
use crate::error::StoreError;
use crate::remote::RemoteService;
use crate::repository::Repository;

/// Handles to the remote service, one per entity type. Produced by the
/// transport adapter outside this crate.
pub struct RemoteServices {
  pub users: Arc<dyn RemoteService<User>>,
  pub posts: Arc<dyn RemoteService<Post>>,
  pub reports: Arc<dyn RemoteService<Report>>,
  pub animals: Arc<dyn RemoteService<Animal>>,
  pub ownership: Arc<dyn RemoteService<UserAnimals>>,
}

/// The five repositories, all sharing one cache database, one connectivity
/// observer and one staleness policy.
#[derive(Clone)]
pub struct Repositories {
  pub users: Repository<User>,
  pub posts: Repository<Post>,
  pub reports: Repository<Report>,
  pub animals: Repository<Animal>,
  pub ownership: Repository<UserAnimals>,
}

impl Repositories {
  pub fn new(
    db: &CacheDb,
    connectivity: ConnectivityObserver,
    remotes: RemoteServices,
    policy: StalenessPolicy,
  ) -> Self {
    Self {
      users: Repository::new(db.store(), connectivity.clone(), remotes.users, policy),
      posts: Repository::new(db.store(), connectivity.clone(), remotes.posts, policy),
      reports: Repository::new(db.store(), connectivity.clone(), remotes.reports, policy),
      animals: Repository::new(db.store(), connectivity.clone(), remotes.animals, policy),
      ownership: Repository::new(db.store(), connectivity, remotes.ownership, policy),
    }
  }

  /// Purge every cached record for every entity type. Called on sign-out so
  /// the next account starts from an empty cache.
  pub fn clear_all(&self) -> Result<(), StoreError> {
    self.users.clear()?;
    self.posts.clear()?;
    self.reports.clear()?;
    self.animals.clear()?;
    self.ownership.clear()?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheEntity;
  use crate::connectivity::ConnectivityObserver;
  use crate::error::RemoteError;
  use async_trait::async_trait;

  /// Remote stub for wiring tests; behaves like a dead network.
  struct NullRemote;

  #[async_trait]
  impl<T: CacheEntity> RemoteService<T> for NullRemote {
    async fn fetch(&self, _id: &str) -> Result<Option<T>, RemoteError> {
      Err(RemoteError::Unreachable("null remote".into()))
    }
    async fn fetch_all(&self) -> Result<Vec<T>, RemoteError> {
      Err(RemoteError::Unreachable("null remote".into()))
    }
    async fn fetch_matching(&self, _filter: &T::Filter) -> Result<Vec<T>, RemoteError> {
      Err(RemoteError::Unreachable("null remote".into()))
    }
    async fn create(&self, _entity: &T) -> Result<(), RemoteError> {
      Err(RemoteError::Unreachable("null remote".into()))
    }
    async fn update(&self, _id: &str, _entity: &T) -> Result<(), RemoteError> {
      Err(RemoteError::Unreachable("null remote".into()))
    }
    async fn remove(&self, _id: &str) -> Result<(), RemoteError> {
      Err(RemoteError::Unreachable("null remote".into()))
    }
  }

  fn repositories(db: &CacheDb) -> Repositories {
    let remotes = RemoteServices {
      users: Arc::new(NullRemote),
      posts: Arc::new(NullRemote),
      reports: Arc::new(NullRemote),
      animals: Arc::new(NullRemote),
      ownership: Arc::new(NullRemote),
    };
    Repositories::new(
      db,
      ConnectivityObserver::disconnected(),
      remotes,
      StalenessPolicy::default(),
    )
  }

  #[tokio::test]
  async fn test_clear_all_purges_every_entity_type() {
    let db = CacheDb::open_in_memory().unwrap();
    let repos = repositories(&db);

    db.store::<User>()
      .upsert(&User {
        id: "u1".into(),
        username: "ada".into(),
        email: "ada@example.com".into(),
        bio: None,
        avatar_url: None,
        created_at: chrono::Utc::now(),
      })
      .unwrap();
    db.store::<UserAnimals>()
      .upsert(&UserAnimals {
        user_id: "u1".into(),
        animal_ids: vec!["a1".into()],
      })
      .unwrap();

    repos.clear_all().unwrap();

    assert!(db.store::<User>().is_empty().unwrap());
    assert!(db.store::<UserAnimals>().is_empty().unwrap());
  }

  #[tokio::test]
  async fn test_offline_repositories_serve_cached_data() {
    let db = CacheDb::open_in_memory().unwrap();
    let repos = repositories(&db);

    db.store::<UserAnimals>()
      .upsert(&UserAnimals {
        user_id: "u1".into(),
        animal_ids: vec!["a1".into(), "a2".into()],
      })
      .unwrap();

    // The observer is disconnected (Offline), so the dead remote is never
    // consulted and the cached row is served.
    let owned = repos.ownership.get("u1").await.unwrap().unwrap();
    assert!(owned.owns("a2"));
  }
}
