//! The live, read-through cache of the FAQ collection.
//!
//! A [`FaqFeed`] spawns one task that owns a [`Subscription`] and republishes
//! each snapshot. The cache only ever holds the last received snapshot; it is
//! never patched locally. Dropping the feed aborts the task and releases the
//! subscription.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::repository::{ErrorSink, FaqRepository, Subscription};
use crate::store::Snapshot;

/// Lifecycle of the cached snapshot.
#[derive(Debug, Clone, Default)]
pub enum FeedState {
    /// Subscribed, waiting for the first snapshot.
    #[default]
    Pending,
    /// The most recently received snapshot.
    Live(Snapshot),
}

impl FeedState {
    /// The cached snapshot, if one has arrived.
    #[must_use]
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Pending => None,
            Self::Live(snapshot) => Some(snapshot),
        }
    }
}

/// A live snapshot cache driven by a background task.
#[derive(Debug)]
pub struct FaqFeed {
    state: watch::Receiver<FeedState>,
    task: JoinHandle<()>,
}

impl FaqFeed {
    /// Subscribe and start republishing snapshots.
    ///
    /// Subscription failures go to `sink`; the cached snapshot keeps its last
    /// value when they happen. Must be called inside a tokio runtime.
    #[must_use]
    pub fn start(repository: &FaqRepository, sink: impl ErrorSink + 'static) -> Self {
        let subscription = repository.subscribe(sink);
        let (tx, state) = watch::channel(FeedState::Pending);
        let task = tokio::spawn(Self::run(subscription, tx));
        Self { state, task }
    }

    async fn run(mut subscription: Subscription, tx: watch::Sender<FeedState>) {
        while let Some(snapshot) = subscription.next().await {
            debug!(records = snapshot.len(), "Feed received snapshot");
            if tx.send(FeedState::Live(snapshot)).is_err() {
                break;
            }
        }
        subscription.cancel();
    }

    /// The current state without waiting.
    #[must_use]
    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// The cached snapshot, if one has arrived.
    #[must_use]
    pub fn current(&self) -> Option<Snapshot> {
        self.state.borrow().snapshot().cloned()
    }

    /// Wait for the next snapshot newer than the last one seen through this
    /// method.
    ///
    /// Returns `None` once the feed has stopped.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        loop {
            self.state.changed().await.ok()?;
            if let Some(snapshot) = self.state.borrow_and_update().snapshot() {
                return Some(snapshot.clone());
            }
        }
    }

    /// Stop the feed and wait for its task to finish.
    pub async fn shutdown(mut self) {
        self.task.abort();
        if let Err(e) = (&mut self.task).await {
            if !e.is_cancelled() {
                debug!(error = %e, "Feed task ended abnormally");
            }
        }
    }
}

impl Drop for FaqFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}
