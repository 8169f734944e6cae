//! Generic caching layer for data persistence and offline support.
//!
//! This module provides an entity-agnostic cache that:
//! - Persists records keyed by entity id, stamped with a refresh instant
//! - Decides staleness from record age *and* connectivity (nothing is stale
//!   while offline)
//! - Degrades local corruption to an empty store instead of failing reads

mod db;
mod policy;
mod store;
mod traits;

pub use db::CacheDb;
pub use policy::{StalenessPolicy, DEFAULT_TTL_MINUTES};
pub use store::EntityCacheStore;
pub use traits::{CacheEntity, CacheRecord, NoFilter, RecordFilter};
