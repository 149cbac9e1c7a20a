//! Document store abstraction for faqdesk.
//!
//! The store is the authoritative home of FAQ records. It assigns ids and
//! timestamps, performs atomic counter increments, and pushes a whole ordered
//! snapshot to every watcher after each committed change.
//!
//! [`SqliteStore`] is the bundled implementation.

pub mod migrations;
pub mod schema;
mod sqlite;
#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::faq::{Counter, Faq, FaqDraft, FaqId};

pub use sqlite::{SqliteStore, StoreStats};

/// Default capacity of the snapshot broadcast channel.
pub const DEFAULT_SNAPSHOT_BUFFER: usize = 64;

/// The complete ordered list of records at one point in time.
///
/// Ordered by `updated_at` descending, ties in insertion order.
pub type Snapshot = Arc<[Faq]>;

/// A change notification pushed by the store.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// A committed change produced this whole snapshot.
    Snapshot(Snapshot),
    /// The store could not materialise a snapshot after a change.
    Failed(String),
}

/// A realtime document store holding the FAQ collection.
///
/// Every method touches at most one record. Timestamps are assigned by the
/// store's clock at write time; callers never supply them.
#[async_trait]
pub trait DocumentStore: Send + Sync + fmt::Debug {
    /// Insert a new record with zeroed counters and store-assigned
    /// `created_at == updated_at`, returning the generated id.
    async fn insert(&self, draft: &FaqDraft) -> Result<FaqId>;

    /// Replace question, answer and category and stamp `updated_at`.
    ///
    /// Returns `false` when no record has this id.
    async fn update_content(&self, id: &FaqId, draft: &FaqDraft) -> Result<bool>;

    /// Delete a record. Returns `false` when it was already absent.
    async fn delete(&self, id: &FaqId) -> Result<bool>;

    /// Atomically add one to a counter. Returns `false` when no record has
    /// this id.
    async fn increment(&self, id: &FaqId, counter: Counter) -> Result<bool>;

    /// Read the current ordered snapshot.
    async fn query_ordered(&self) -> Result<Vec<Faq>>;

    /// Receive a [`StoreEvent`] after every committed change.
    fn watch(&self) -> broadcast::Receiver<StoreEvent>;

    /// Read the current ordered snapshot and start watching in one step.
    ///
    /// The receiver only yields changes committed after the returned
    /// snapshot was read.
    async fn snapshot_and_watch(&self) -> Result<(Vec<Faq>, broadcast::Receiver<StoreEvent>)>;
}

/// A store handle shared between the repository and anything else that needs it.
pub type SharedStore = Arc<dyn DocumentStore>;
