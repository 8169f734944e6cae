//! Offline-first cached data layer for the pawfeed app.
//!
//! Entity data (users, posts, reports, animals, ownership) is authoritative
//! on the remote service but must stay usable with no connectivity. Every
//! entity type goes through the same pattern:
//!
//! - **Read-through**: a miss or a stale hit while online fetches from the
//!   remote and persists the result for the next read.
//! - **Write-through**: mutations go to the remote first; on success the
//!   local copy is updated in place, so no re-fetch is needed.
//! - **Connectivity-aware staleness**: cached records expire after a TTL,
//!   but only while online. Offline, the cache is trusted at any age, since
//!   nothing fresher can exist.
//!
//! The remote service itself is out of scope here; repositories consume it
//! through [`remote::RemoteService`].

pub mod cache;
pub mod config;
pub mod connectivity;
pub mod entities;
pub mod error;
pub mod remote;
pub mod repositories;
pub mod repository;

pub use cache::{CacheDb, CacheEntity, CacheRecord, StalenessPolicy};
pub use config::Config;
pub use connectivity::{ConnectivityObserver, ConnectivitySource, ConnectivityState};
pub use error::{RemoteError, RepoError, StoreError};
pub use remote::RemoteService;
pub use repositories::{RemoteServices, Repositories};
pub use repository::Repository;
