//! Network reachability signal consumed by the cart engine.

use tokio::sync::watch;

/// Reports whether the remote cart service should be attempted.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Connectivity flag backed by a `watch` channel so listeners can react to
/// offline -> online transitions.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    sender: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(online: bool) -> Self {
        let (sender, _) = watch::channel(online);
        Self { sender }
    }

    /// Records the current reachability. Returns true if this was an
    /// offline -> online transition.
    pub fn set_online(&self, online: bool) -> bool {
        let mut came_online = false;
        self.sender.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            came_online = online;
            *current = online;
            true
        });
        came_online
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for ConnectivityMonitor {
    fn is_online(&self) -> bool {
        *self.sender.borrow()
    }
}
