//! `SQLite` schema definitions for the FAQ store.
//!
//! Timestamps are stored as microseconds since the Unix epoch so ordering
//! by `updated_at_us` is numeric.

/// SQL statement to create the faqs table.
pub const CREATE_FAQS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS faqs (
    id TEXT PRIMARY KEY NOT NULL,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    category TEXT NOT NULL,
    views INTEGER NOT NULL DEFAULT 0 CHECK (views >= 0),
    helpful INTEGER NOT NULL DEFAULT 0 CHECK (helpful >= 0),
    not_helpful INTEGER NOT NULL DEFAULT 0 CHECK (not_helpful >= 0),
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    CHECK (created_at_us <= updated_at_us)
)
";

/// SQL statement to create an index backing the snapshot ordering.
pub const CREATE_UPDATED_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_faqs_updated ON faqs(updated_at_us DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_FAQS_TABLE,
    CREATE_UPDATED_INDEX,
    CREATE_METADATA_TABLE,
];

/// Columns selected for every snapshot row, in `row_to_faq` order.
pub const FAQ_COLUMNS: &str =
    "id, question, answer, category, views, helpful, not_helpful, created_at_us, updated_at_us";
