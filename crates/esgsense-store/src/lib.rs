//! esgsense store: SQLite tables, SQL analysis queries and CSV exports.

pub mod export;
pub mod schema;
pub mod sqlite;
pub mod types;

pub use export::{write_bi_rows, write_summary_stats};
pub use sqlite::{SqliteStore, MONTHS_LIMIT, RECENT_DAYS_LIMIT, TOP_SOURCES_LIMIT};
pub use types::*;
