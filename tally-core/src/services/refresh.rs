//! Refresh signal between the submission flow and the list flow

use std::sync::Arc;

use tokio::sync::watch;

/// Monotonic counter; every bump asks list views to re-fetch
#[derive(Debug, Clone)]
pub struct RefreshSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl RefreshSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Request a refresh
    pub fn notify(&self) {
        self.tx.send_modify(|n| *n = n.wrapping_add(1));
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Number of refreshes requested so far
    pub fn count(&self) -> u64 {
        *self.tx.borrow()
    }
}

impl Default for RefreshSignal {
    fn default() -> Self {
        Self::new()
    }
}
