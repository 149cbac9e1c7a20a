//! `faqdesk` - A bilingual FAQ kept live on a document store
//!
//! This library provides the FAQ record model, a `SQLite`-backed document
//! store that pushes ordered snapshots to its watchers, the repository that
//! mediates every read and write, and the view state of the browsing and
//! management screens.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod faq;
pub mod feed;
pub mod filter;
pub mod labels;
pub mod logging;
pub mod repository;
pub mod session;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use faq::{Category, Counter, Faq, FaqDraft, FaqId, FeedbackKind};
pub use feed::{FaqFeed, FeedState};
pub use filter::{CategoryFilter, FaqFilter, FaqStats, SearchScope};
pub use labels::Locale;
pub use logging::init_logging;
pub use repository::{ErrorSink, FaqRepository, LogSink, Subscription};
pub use session::{AdminSession, FaqForm, FeedbackGuard, FeedbackOutcome, UserSession};
pub use store::{DocumentStore, SharedStore, Snapshot, SqliteStore, StoreEvent, StoreStats};
