//! Connectivity tracking.
//!
//! Wraps the platform's online/offline signal in a watch channel so that
//! repositories (and anything else that cares) can sample the latest known
//! state or await transitions. When no platform signal is available the
//! observer reports `Offline`, which makes the cache layer trust whatever it
//! has locally instead of issuing calls that cannot succeed.

use tokio::sync::watch;

/// Whether the device can currently reach the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
  Online,
  Offline,
}

impl ConnectivityState {
  pub fn is_online(self) -> bool {
    matches!(self, ConnectivityState::Online)
  }
}

/// Write side of the connectivity signal.
///
/// The platform adapter (reachability callback, network monitor, ...) holds
/// this and pushes transitions as they are reported.
pub struct ConnectivitySource {
  tx: watch::Sender<ConnectivityState>,
}

impl ConnectivitySource {
  /// Create a source and its first observer. Starts `Offline` until the
  /// platform reports otherwise.
  pub fn new() -> (Self, ConnectivityObserver) {
    let (tx, rx) = watch::channel(ConnectivityState::Offline);
    (Self { tx }, ConnectivityObserver { rx })
  }

  /// Publish a transition. Re-publishing the current state is a no-op and
  /// does not wake observers.
  pub fn set(&self, state: ConnectivityState) {
    self.tx.send_if_modified(|current| {
      if *current == state {
        false
      } else {
        *current = state;
        true
      }
    });
  }
}

/// Read side of the connectivity signal.
///
/// Cheap to clone; every repository holds one and samples it once per call.
#[derive(Clone)]
pub struct ConnectivityObserver {
  rx: watch::Receiver<ConnectivityState>,
}

impl ConnectivityObserver {
  /// Latest state reported by the platform.
  pub fn current(&self) -> ConnectivityState {
    *self.rx.borrow()
  }

  /// Wait for the next transition and return the new state.
  pub async fn changed(&mut self) -> ConnectivityState {
    // If the sender is gone the state can never change again; report the
    // last known value rather than erroring.
    let _ = self.rx.changed().await;
    *self.rx.borrow()
  }

  /// An observer with no platform signal behind it, pinned to `Offline`.
  pub fn disconnected() -> Self {
    let (_tx, rx) = watch::channel(ConnectivityState::Offline);
    Self { rx }
  }
}
