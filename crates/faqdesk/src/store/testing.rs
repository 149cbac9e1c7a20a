//! Test doubles for [`DocumentStore`](super::DocumentStore).

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{DocumentStore, StoreEvent};
use crate::error::{Error, Result};
use crate::faq::{Counter, Faq, FaqDraft, FaqId};

/// A store that rejects every operation and lets tests push events.
#[derive(Debug)]
pub(crate) struct FailingStore {
    pub(crate) events: broadcast::Sender<StoreEvent>,
}

impl FailingStore {
    pub(crate) fn new() -> Self {
        Self::with_capacity(4)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self { events }
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn insert(&self, _draft: &FaqDraft) -> Result<FaqId> {
        Err(Error::internal("store unavailable"))
    }

    async fn update_content(&self, _id: &FaqId, _draft: &FaqDraft) -> Result<bool> {
        Err(Error::internal("store unavailable"))
    }

    async fn delete(&self, _id: &FaqId) -> Result<bool> {
        Err(Error::internal("store unavailable"))
    }

    async fn increment(&self, _id: &FaqId, _counter: Counter) -> Result<bool> {
        Err(Error::internal("store unavailable"))
    }

    async fn query_ordered(&self) -> Result<Vec<Faq>> {
        Err(Error::internal("store unavailable"))
    }

    fn watch(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    async fn snapshot_and_watch(&self) -> Result<(Vec<Faq>, broadcast::Receiver<StoreEvent>)> {
        Err(Error::internal("store unavailable"))
    }
}
