//! `SQLite`-backed document store.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::schema::FAQ_COLUMNS;
use super::{migrations, DocumentStore, StoreEvent, DEFAULT_SNAPSHOT_BUFFER};
use crate::error::{Error, Result};
use crate::faq::{Category, Counter, Faq, FaqDraft, FaqId};

/// Document store persisted in a single `SQLite` database.
///
/// Every write runs under one connection lock and publishes the resulting
/// snapshot before the lock is released, so watchers see snapshots in commit
/// order. Counter updates are single `col = col + 1` statements.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Connection plus the store clock it guards.
    inner: Mutex<Inner>,
    /// Fan-out of change notifications.
    events: broadcast::Sender<StoreEvent>,
}

#[derive(Debug)]
struct Inner {
    conn: Connection,
    /// Last timestamp handed out, in microseconds since the epoch.
    last_stamp_us: i64,
    /// `PRAGMA data_version` when other connections were last checked.
    data_version: i64,
}

impl Inner {
    /// Next store timestamp: wall clock, but strictly after the previous one.
    fn next_stamp(&mut self) -> i64 {
        let now = Utc::now().timestamp_micros();
        let stamp = now.max(self.last_stamp_us + 1);
        self.last_stamp_us = stamp;
        stamp
    }
}

impl SqliteStore {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist
    /// and brings the schema up to date. `snapshot_buffer` bounds how many
    /// snapshots a slow watcher may fall behind before it skips ahead.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>, snapshot_buffer: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening FAQ store at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self::from_connection(path, conn, snapshot_buffer)?;
        info!("FAQ store opened at {}", store.path.display());
        Ok(store)
    }

    /// Create an in-memory store, mainly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let path = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        Self::from_connection(path, conn, DEFAULT_SNAPSHOT_BUFFER)
    }

    fn from_connection(path: PathBuf, conn: Connection, snapshot_buffer: usize) -> Result<Self> {
        migrations::initialize_schema(&conn)?;

        // Seed the clock so timestamps keep increasing across restarts.
        let last_stamp_us = max_stamp(&conn)?;
        let data_version = data_version(&conn)?;

        let (events, _) = broadcast::channel(snapshot_buffer.max(1));
        Ok(Self {
            path,
            inner: Mutex::new(Inner {
                conn,
                last_stamp_us,
                data_version,
            }),
            events,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count records in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let inner = self.lock()?;
        let count = inner
            .conn
            .query_row("SELECT COUNT(*) FROM faqs", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let inner = self.lock()?;
        let (total_records, newest_us): (i64, Option<i64>) = inner.conn.query_row(
            "SELECT COUNT(*), MAX(updated_at_us) FROM faqs",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let oldest_us: Option<i64> = inner
            .conn
            .query_row(
                "SELECT created_at_us FROM faqs ORDER BY created_at_us ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            total_records,
            oldest_created: oldest_us.and_then(DateTime::from_timestamp_micros),
            newest_update: newest_us.and_then(DateTime::from_timestamp_micros),
            db_size_bytes,
            watchers: self.events.receiver_count(),
        })
    }

    /// Publish a snapshot if another connection committed since the last check.
    ///
    /// Writes made through this store are published as they happen; this
    /// picks up writes from other processes sharing the database file.
    /// Returns whether a change was found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn sync_external(&self) -> Result<bool> {
        let mut inner = self.lock()?;
        let version = data_version(&inner.conn)?;
        if version == inner.data_version {
            return Ok(false);
        }
        inner.data_version = version;
        inner.last_stamp_us = inner.last_stamp_us.max(max_stamp(&inner.conn)?);
        debug!(version, "External commit detected");
        self.publish(&inner);
        Ok(true)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::internal("store connection lock poisoned"))
    }

    /// Push the post-commit snapshot to watchers, if there are any.
    fn publish(&self, inner: &Inner) {
        if self.events.receiver_count() == 0 {
            return;
        }
        let event = match Self::query_all(&inner.conn) {
            Ok(faqs) => StoreEvent::Snapshot(faqs.into()),
            Err(e) => {
                warn!(error = %e, "Failed to build snapshot after commit");
                StoreEvent::Failed(e.to_string())
            }
        };
        // Only fails when every receiver dropped in the meantime.
        let _ = self.events.send(event);
    }

    fn query_all(conn: &Connection) -> Result<Vec<Faq>> {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {FAQ_COLUMNS} FROM faqs ORDER BY updated_at_us DESC, rowid ASC"
        ))?;
        let faqs = stmt
            .query_map([], Self::row_to_faq)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(faqs)
    }

    /// Convert a database row to a `Faq`.
    fn row_to_faq(row: &rusqlite::Row) -> rusqlite::Result<Faq> {
        let id: String = row.get(0)?;
        let category_str: String = row.get(3)?;

        let category = category_str.parse().unwrap_or_else(|_| {
            warn!(
                "Unknown category {} on FAQ {}, treating as ETC",
                category_str, id
            );
            Category::Etc
        });

        Ok(Faq {
            question: row.get(1)?,
            answer: row.get(2)?,
            category,
            views: counter_value(row, 4)?,
            helpful: counter_value(row, 5)?,
            not_helpful: counter_value(row, 6)?,
            created_at: timestamp_value(row, 7)?,
            updated_at: timestamp_value(row, 8)?,
            id: FaqId::new(id),
        })
    }
}

fn counter_value(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<u64> {
    let raw: i64 = row.get(idx)?;
    Ok(u64::try_from(raw).unwrap_or(0))
}

fn timestamp_value(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let micros: i64 = row.get(idx)?;
    Ok(DateTime::from_timestamp_micros(micros).unwrap_or_default())
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn insert(&self, draft: &FaqDraft) -> Result<FaqId> {
        let id = FaqId::generate();
        let mut inner = self.lock()?;
        let stamp = inner.next_stamp();

        inner.conn.execute(
            r"
            INSERT INTO faqs (id, question, answer, category, views, helpful, not_helpful,
                              created_at_us, updated_at_us)
            VALUES (?1, ?2, ?3, ?4, 0, 0, 0, ?5, ?5)
            ",
            params![
                id.as_str(),
                draft.question,
                draft.answer,
                draft.category.as_str(),
                stamp
            ],
        )?;

        debug!("Inserted FAQ {}", id);
        self.publish(&inner);
        Ok(id)
    }

    async fn update_content(&self, id: &FaqId, draft: &FaqDraft) -> Result<bool> {
        let mut inner = self.lock()?;
        let stamp = inner.next_stamp();

        let affected = inner.conn.execute(
            r"
            UPDATE faqs SET question = ?1, answer = ?2, category = ?3, updated_at_us = ?4
            WHERE id = ?5
            ",
            params![
                draft.question,
                draft.answer,
                draft.category.as_str(),
                stamp,
                id.as_str()
            ],
        )?;

        if affected > 0 {
            debug!("Updated FAQ {}", id);
            self.publish(&inner);
        }
        Ok(affected > 0)
    }

    async fn delete(&self, id: &FaqId) -> Result<bool> {
        let inner = self.lock()?;
        let affected = inner
            .conn
            .execute("DELETE FROM faqs WHERE id = ?1", [id.as_str()])?;

        if affected > 0 {
            debug!("Deleted FAQ {}", id);
            self.publish(&inner);
        }
        Ok(affected > 0)
    }

    async fn increment(&self, id: &FaqId, counter: Counter) -> Result<bool> {
        let column = counter.column();
        let inner = self.lock()?;
        let affected = inner.conn.execute(
            &format!("UPDATE faqs SET {column} = {column} + 1 WHERE id = ?1"),
            [id.as_str()],
        )?;

        if affected > 0 {
            debug!("Incremented {} on FAQ {}", counter, id);
            self.publish(&inner);
        }
        Ok(affected > 0)
    }

    async fn query_ordered(&self) -> Result<Vec<Faq>> {
        let inner = self.lock()?;
        Self::query_all(&inner.conn)
    }

    fn watch(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    async fn snapshot_and_watch(&self) -> Result<(Vec<Faq>, broadcast::Receiver<StoreEvent>)> {
        // Publishing happens under this lock, so nothing can be queued for
        // the new receiver that the read below does not already include.
        let inner = self.lock()?;
        let events = self.events.subscribe();
        let faqs = Self::query_all(&inner.conn)?;
        Ok((faqs, events))
    }
}

fn max_stamp(conn: &Connection) -> Result<i64> {
    let stamp = conn.query_row("SELECT COALESCE(MAX(updated_at_us), 0) FROM faqs", [], |row| {
        row.get(0)
    })?;
    Ok(stamp)
}

fn data_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row("PRAGMA data_version", [], |row| row.get(0))?;
    Ok(version)
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    /// Total number of records.
    pub total_records: i64,
    /// Creation time of the oldest record.
    pub oldest_created: Option<DateTime<Utc>>,
    /// Most recent content edit or creation.
    pub newest_update: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
    /// Number of live watchers.
    pub watchers: usize,
}
