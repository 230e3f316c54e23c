use std::sync::Arc;

use tokio::sync::watch;

/// Process-wide count of outstanding transfers.
///
/// One token is acquired per submitted transfer and released exactly once on
/// any terminal outcome. `wait_idle` is the embedder's "keep running while
/// transfers are outstanding" hook.
#[derive(Clone)]
pub struct KeepAlive {
    count: Arc<watch::Sender<usize>>,
}

impl KeepAlive {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { count: Arc::new(tx) }
    }

    /// Acquire one token. Released when the guard drops, on every exit path.
    pub fn acquire(&self) -> KeepAliveGuard {
        self.count.send_modify(|c| *c += 1);
        KeepAliveGuard {
            count: Arc::clone(&self.count),
        }
    }

    pub fn active(&self) -> usize {
        *self.count.borrow()
    }

    /// Wait until every outstanding token has been released.
    pub async fn wait_idle(&self) {
        let mut rx = self.count.subscribe();
        // Cannot fail: `self` keeps the sender alive for the whole wait.
        let _ = rx.wait_for(|c| *c == 0).await;
    }
}

impl Default for KeepAlive {
    fn default() -> Self {
        Self::new()
    }
}

pub struct KeepAliveGuard {
    count: Arc<watch::Sender<usize>>,
}

impl Drop for KeepAliveGuard {
    fn drop(&mut self) {
        self.count.send_modify(|c| *c -= 1);
    }
}
