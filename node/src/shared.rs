use crate::simulator::Simulator;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// A [`Simulator`] that several tasks may drive at once.
///
/// Each access holds the lock for its whole duration, so a snapshot never observes a half-applied
/// event and queue removals never interleave.
#[derive(Debug, Clone, Default)]
pub struct SharedSimulator {
    inner: Arc<Mutex<Simulator>>,
}

impl SharedSimulator {
    pub fn new(simulator: Simulator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(simulator)),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, Simulator> {
        self.inner.lock().await
    }

    /// Runs `f` with exclusive access.
    pub async fn with<R>(&self, f: impl FnOnce(&mut Simulator) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }
}

impl From<Simulator> for SharedSimulator {
    fn from(simulator: Simulator) -> Self {
        Self::new(simulator)
    }
}
