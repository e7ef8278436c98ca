//! Row types returned by the SQL analysis queries.

use chrono::NaiveDate;
use esgsense_core::SentimentCategory;
use serde::{Deserialize, Serialize};

/// One day of the recent-window rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentDay {
    pub date: NaiveDate,
    pub avg_sentiment: f64,
    pub article_count: usize,
    pub min_sentiment: f64,
    pub max_sentiment: f64,
}

/// Stored sentiment bucket with its share of all records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub sentiment_category: SentimentCategory,
    pub article_count: usize,
    pub avg_score: f64,
    pub percentage: f64,
}

/// Row counts after a replace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSummary {
    pub records: usize,
    pub daily_rows: usize,
}

/// Store statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_records: usize,
    pub daily_rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub db_path: String,
    pub db_size_mb: f64,
}
