//! The FAQ repository: the only path between the application and the store.
//!
//! The repository owns no authoritative state. Writes go straight to the
//! store and return once acknowledged; their effect becomes visible through
//! the next snapshot of a [`Subscription`].

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::faq::{Counter, FaqDraft, FaqId, FeedbackKind};
use crate::store::{SharedStore, Snapshot, StoreEvent};

/// Receives failures that happen inside a subscription.
pub trait ErrorSink: Send + Sync {
    /// Report one failure. The subscription keeps running afterwards.
    fn report(&self, error: &Error);
}

impl<F> ErrorSink for F
where
    F: Fn(&Error) + Send + Sync,
{
    fn report(&self, error: &Error) {
        self(error);
    }
}

/// An [`ErrorSink`] that logs at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn report(&self, error: &Error) {
        error!(error = %error, "FAQ subscription error");
    }
}

/// Synchronization layer between the document store and its consumers.
#[derive(Debug, Clone)]
pub struct FaqRepository {
    store: SharedStore,
}

impl FaqRepository {
    /// Create a repository over an explicitly constructed store handle.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// The underlying store handle.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Start a live sequence of ordered snapshots.
    ///
    /// Nothing is read until the first call to [`Subscription::next`].
    #[must_use]
    pub fn subscribe(&self, sink: impl ErrorSink + 'static) -> Subscription {
        // Held until priming swaps in a receiver that starts at the first
        // read. Kept if that read fails so queued events still arrive.
        let events = self.store.watch();
        Subscription {
            store: Some(Arc::clone(&self.store)),
            events: Some(events),
            sink: Box::new(sink),
            primed: false,
        }
    }

    /// Create a record with zeroed counters.
    ///
    /// The new record shows up in subscriptions, not in the return value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if question or answer is blank, or
    /// [`Error::StoreWrite`] if the store rejects the insert.
    pub async fn create(&self, draft: &FaqDraft) -> Result<()> {
        draft.validate()?;
        let id = self
            .store
            .insert(draft)
            .await
            .map_err(|e| write_failed("create", e))?;
        info!(id = %id, category = %draft.category, "Created FAQ");
        Ok(())
    }

    /// Replace question, answer and category of a record.
    ///
    /// Counters are untouched. Editing a record that was deleted in the
    /// meantime is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if question or answer is blank, or
    /// [`Error::StoreWrite`] if the store rejects the update.
    pub async fn update(&self, id: &FaqId, draft: &FaqDraft) -> Result<()> {
        draft.validate()?;
        let updated = self
            .store
            .update_content(id, draft)
            .await
            .map_err(|e| write_failed("update", e))?;
        if updated {
            info!(id = %id, "Updated FAQ");
        } else {
            warn!(id = %id, "Update skipped, FAQ no longer exists");
        }
        Ok(())
    }

    /// Delete a record. Deleting a missing record is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreWrite`] if the store rejects the delete.
    pub async fn remove(&self, id: &FaqId) -> Result<()> {
        let removed = self
            .store
            .delete(id)
            .await
            .map_err(|e| write_failed("remove", e))?;
        if removed {
            info!(id = %id, "Removed FAQ");
        } else {
            debug!(id = %id, "Remove skipped, FAQ already absent");
        }
        Ok(())
    }

    /// Count one more view of a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreWrite`] if the store rejects the increment.
    pub async fn increment_view(&self, id: &FaqId) -> Result<()> {
        self.increment("increment_view", id, Counter::Views).await
    }

    /// Count one helpful or not-helpful vote.
    ///
    /// Nothing here stops a client from voting repeatedly; see
    /// [`crate::session::FeedbackGuard`] for the per-session guard.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreWrite`] if the store rejects the increment.
    pub async fn record_feedback(&self, id: &FaqId, kind: FeedbackKind) -> Result<()> {
        self.increment("record_feedback", id, kind.into()).await
    }

    async fn increment(&self, operation: &'static str, id: &FaqId, counter: Counter) -> Result<()> {
        let found = self
            .store
            .increment(id, counter)
            .await
            .map_err(|e| write_failed(operation, e))?;
        if !found {
            warn!(id = %id, counter = %counter, "Increment skipped, FAQ no longer exists");
        }
        Ok(())
    }
}

fn write_failed(operation: &'static str, source: Error) -> Error {
    error!(operation, error = %source, "FAQ store write failed");
    Error::store_write(operation, source)
}

/// A live, ordered sequence of whole snapshots.
///
/// The first item is the state at the time of the first [`next`](Self::next)
/// call; every later item follows a committed change and replaces the
/// previous one. Failures go to the [`ErrorSink`] and the sequence carries
/// on. Once cancelled (or once the store goes away) it yields `None` forever.
pub struct Subscription {
    store: Option<SharedStore>,
    events: Option<broadcast::Receiver<StoreEvent>>,
    sink: Box<dyn ErrorSink>,
    primed: bool,
}

impl Subscription {
    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the subscription is cancelled or the store has
    /// shut down.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if !self.primed {
            self.primed = true;
            let store = Arc::clone(self.store.as_ref()?);
            match store.snapshot_and_watch().await {
                Ok((faqs, events)) => {
                    // Anything queued on the old receiver predates this read.
                    self.events = Some(events);
                    return Some(faqs.into());
                }
                Err(e) => self.sink.report(&Error::subscription(e.to_string())),
            }
        }

        loop {
            let events = self.events.as_mut()?;
            match events.recv().await {
                Ok(StoreEvent::Snapshot(snapshot)) => return Some(snapshot),
                Ok(StoreEvent::Failed(message)) => {
                    self.sink.report(&Error::subscription(message));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscription lagged, skipping to a newer snapshot");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("FAQ store closed, ending subscription");
                    self.cancel();
                    return None;
                }
            }
        }
    }

    /// Release the store handle. Later calls to `next` return `None`.
    pub fn cancel(&mut self) {
        self.events = None;
        self.store = None;
    }

    /// Whether the subscription has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.events.is_none()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("primed", &self.primed)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::faq::Category;
    use crate::store::testing::FailingStore;
    use crate::store::{DocumentStore, SqliteStore};

    fn create_repo() -> FaqRepository {
        let store = SqliteStore::open_in_memory().expect("failed to create test store");
        FaqRepository::new(Arc::new(store))
    }

    fn collecting_sink() -> (Arc<Mutex<Vec<String>>>, impl ErrorSink + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink = move |e: &Error| sink_seen.lock().unwrap().push(e.to_string());
        (seen, sink)
    }

    #[tokio::test]
    async fn test_create_rejects_blank_question() {
        let repo = create_repo();
        let err = repo
            .create(&FaqDraft::new("  ", "A", Category::General))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(repo.store().query_ordered().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_blank_answer() {
        let repo = create_repo();
        repo.create(&FaqDraft::new("Q", "A", Category::General))
            .await
            .unwrap();
        let id = repo.store().query_ordered().await.unwrap()[0].id.clone();

        let err = repo
            .update(&id, &FaqDraft::new("Q", "", Category::General))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_update_missing_record_is_noop() {
        let repo = create_repo();
        let result = repo
            .update(&FaqId::new("gone"), &FaqDraft::new("Q", "A", Category::Fine))
            .await;
        assert!(result.is_ok());
        assert!(repo.store().query_ordered().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_record_is_noop() {
        let repo = create_repo();
        assert!(repo.remove(&FaqId::new("gone")).await.is_ok());
    }

    #[tokio::test]
    async fn test_store_failures_become_store_write_errors() {
        let repo = FaqRepository::new(Arc::new(FailingStore::new()));
        let id = FaqId::new("x");

        let err = repo
            .create(&FaqDraft::new("Q", "A", Category::General))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StoreWrite { operation: "create", .. }));

        let err = repo
            .update(&id, &FaqDraft::new("Q", "A", Category::General))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StoreWrite { operation: "update", .. }));

        let err = repo.remove(&id).await.unwrap_err();
        assert!(matches!(err, Error::StoreWrite { operation: "remove", .. }));

        let err = repo.increment_view(&id).await.unwrap_err();
        assert!(matches!(err, Error::StoreWrite { operation: "increment_view", .. }));

        let err = repo
            .record_feedback(&id, FeedbackKind::Helpful)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StoreWrite { operation: "record_feedback", .. }));
    }

    #[tokio::test]
    async fn test_subscription_starts_with_current_state() {
        let repo = create_repo();
        repo.create(&FaqDraft::new("Q1", "A1", Category::General))
            .await
            .unwrap();

        let mut sub = repo.subscribe(LogSink);
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].question, "Q1");
    }

    #[tokio::test]
    async fn test_subscription_delivers_changes() {
        let repo = create_repo();
        let mut sub = repo.subscribe(LogSink);
        assert!(sub.next().await.unwrap().is_empty());

        repo.create(&FaqDraft::new("Q1", "A1", Category::General))
            .await
            .unwrap();
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);

        repo.increment_view(&snapshot[0].id).await.unwrap();
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot[0].views, 1);
    }

    #[tokio::test]
    async fn test_subscription_reports_failures_and_continues() {
        let store = Arc::new(FailingStore::new());
        let repo = FaqRepository::new(Arc::clone(&store) as SharedStore);
        let (seen, sink) = collecting_sink();
        let mut sub = repo.subscribe(sink);

        store
            .events
            .send(StoreEvent::Failed("connection lost".to_string()))
            .unwrap();
        store.events.send(StoreEvent::Snapshot(Vec::new().into())).unwrap();

        let snapshot = sub.next().await.unwrap();
        assert!(snapshot.is_empty());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|m| m.starts_with("subscription failed")));
        assert!(seen[1].contains("connection lost"));
    }

    #[tokio::test]
    async fn test_subscription_never_replays_writes_before_first_read() {
        let repo = create_repo();
        let mut sub = repo.subscribe(LogSink);
        repo.create(&FaqDraft::new("Q1", "A1", Category::General))
            .await
            .unwrap();
        repo.create(&FaqDraft::new("Q2", "A2", Category::General))
            .await
            .unwrap();

        assert_eq!(sub.next().await.unwrap().len(), 2);

        repo.create(&FaqDraft::new("Q3", "A3", Category::General))
            .await
            .unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_lagging_subscription_resumes_with_latest_snapshot() {
        let dir = std::env::temp_dir().join(format!("faqdesk-test-{}", FaqId::generate()));
        let store = Arc::new(SqliteStore::open(dir.join("faqs.db"), 1).unwrap());
        let repo = FaqRepository::new(Arc::clone(&store) as SharedStore);
        let (seen, sink) = collecting_sink();
        let mut sub = repo.subscribe(sink);
        assert!(sub.next().await.unwrap().is_empty());

        for question in ["Q1", "Q2", "Q3"] {
            repo.create(&FaqDraft::new(question, "A", Category::General))
                .await
                .unwrap();
        }
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].question, "Q3");

        repo.create(&FaqDraft::new("Q4", "A", Category::General))
            .await
            .unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 4);
        assert!(!sub.is_cancelled());
        assert!(seen.lock().unwrap().is_empty());

        drop(sub);
        drop(repo);
        drop(store);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_cancelled_subscription_is_not_restartable() {
        let repo = create_repo();
        let mut sub = repo.subscribe(LogSink);
        sub.cancel();

        assert!(sub.is_cancelled());
        assert!(sub.next().await.is_none());

        repo.create(&FaqDraft::new("Q", "A", Category::General))
            .await
            .unwrap();
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_releases_store_watcher() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let repo = FaqRepository::new(Arc::clone(&store) as SharedStore);

        let mut sub = repo.subscribe(LogSink);
        assert_eq!(store.stats().unwrap().watchers, 1);

        sub.next().await.unwrap();
        assert_eq!(store.stats().unwrap().watchers, 1);

        sub.cancel();
        assert_eq!(store.stats().unwrap().watchers, 0);
    }

    #[tokio::test]
    async fn test_subscription_ends_when_store_closes() {
        let store = FailingStore::new();
        let receiver = store.watch();
        let mut sub = Subscription {
            store: None,
            events: Some(receiver),
            sink: Box::new(LogSink),
            primed: true,
        };
        drop(store);

        assert!(sub.next().await.is_none());
        assert!(sub.is_cancelled());
    }
}
