//! Staleness policy: when a cached record stops being trustworthy.

use chrono::{DateTime, Duration, Utc};

use crate::connectivity::ConnectivityState;

/// Default time-to-live for cached records, shared by every entity type.
pub const DEFAULT_TTL_MINUTES: i64 = 10;

/// Pure staleness decision, parameterized by a TTL.
///
/// A record is stale only while the device is online and the record is older
/// than the TTL. Offline, nothing is stale: the cache is the best data that
/// exists, however old it is.
#[derive(Debug, Clone, Copy)]
pub struct StalenessPolicy {
  ttl: Duration,
}

impl StalenessPolicy {
  pub fn new(ttl: Duration) -> Self {
    Self { ttl }
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  /// Whether a record refreshed at `refreshed_at` must be treated as absent
  /// at `now`, given the current connectivity.
  pub fn is_stale(
    &self,
    refreshed_at: DateTime<Utc>,
    state: ConnectivityState,
    now: DateTime<Utc>,
  ) -> bool {
    state.is_online() && now - refreshed_at > self.ttl
  }
}

impl Default for StalenessPolicy {
  fn default() -> Self {
    Self::new(Duration::minutes(DEFAULT_TTL_MINUTES))
  }
}
