//! Aggregation result types.

use chrono::NaiveDate;
use esgsense_core::SentimentCategory;
use serde::{Deserialize, Serialize};

/// Per-date rollup. Average and stddev are rounded to 3 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub avg_sentiment: f64,
    pub article_count: usize,
    /// Sample stddev; `None` for a single-article day.
    pub sentiment_stddev: Option<f64>,
}

/// One record's score with its trailing averages, in date order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingPoint {
    pub date: NaiveDate,
    pub sentiment_score: f64,
    pub sentiment_7d_avg: f64,
    pub sentiment_30d_avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    /// `YYYY-MM`.
    pub month: String,
    pub article_count: usize,
    pub avg_sentiment: f64,
    pub negative_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceBreakdown {
    pub source: String,
    pub article_count: usize,
    pub avg_sentiment: f64,
    pub min_sentiment: f64,
    pub max_sentiment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthVolatility {
    pub month: String,
    pub article_count: usize,
    pub stddev: Option<f64>,
}

/// A month paired with its (defined) volatility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilityExtreme {
    pub month: String,
    pub stddev: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VolatilityReport {
    pub months: Vec<MonthVolatility>,
    /// Mean of the defined monthly stddevs.
    pub mean_volatility: Option<f64>,
    pub highest: Option<VolatilityExtreme>,
    pub lowest: Option<VolatilityExtreme>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayAggregate {
    pub day_of_week: String,
    pub mean: f64,
    pub count: usize,
    pub stddev: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeCount {
    pub theme: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NegativeArticle {
    pub date: NaiveDate,
    pub sentiment_score: f64,
    pub document_id: String,
    pub source: String,
}

/// Size of one sentiment bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: SentimentCategory,
    pub count: usize,
    pub percentage: f64,
}
