//! Batch analysis over cleaned records: daily, monthly and per-source
//! aggregation, volatility, correlation, BI export rows and the executive
//! summary.
//!
//! Every function here is pure. Persistence and file output live in
//! `esgsense-store`.

pub mod aggregate;
pub mod analysis;
pub mod correlation;
pub mod export;
pub mod stats;
pub mod summary;
pub mod types;

pub use analysis::{fingerprint, Analysis, TOP_NEGATIVE, TOP_THEMES};
pub use correlation::{correlation, sentiment_correlation, CorrelationMatrix};
pub use export::{build_bi_rows, summary_statistics, BiRow, SummaryStat, NOT_AVAILABLE};
pub use summary::{
    recommendations, summarize, ExecutiveSummary, Recommendation, SummaryReport, TrendAnalysis,
    TrendDirection,
};
pub use types::*;
