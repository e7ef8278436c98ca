//! esgsense ingest: entity filtering, feed loading, tone/theme extraction,
//! record cleaning.

pub mod clean;
pub mod extract;
pub mod gkg;
pub mod source;

pub use clean::{clean, CleanOutcome, DateMode};
pub use extract::{categorize, extract_themes, parse_tone, ToneVector};
pub use gkg::{filter_export, EntityMatcher, FilterReport};
pub use source::{load_records, read_records, FEED_COLUMNS};
