//! esgsense core: data model, ESG category table, configuration, errors.

pub mod category;
pub mod config;
pub mod error;
pub mod record;

pub use category::{CategoryCounts, EsgCategory};
pub use config::{DataPaths, EsgSenseConfig};
pub use error::{Error, Result};
pub use record::{CleanedRecord, RawRecord, SentimentCategory, ToneInput};
