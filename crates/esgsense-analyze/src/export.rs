//! Flat rows for BI tools and the headline statistics table.

use chrono::{Datelike, NaiveDate};
use esgsense_core::{CleanedRecord, SentimentCategory};
use serde::{Deserialize, Serialize};

use crate::aggregate::{sorted_by_date, source_breakdown, LONG_WINDOW, SHORT_WINDOW};
use crate::stats::{mean, median, percentage, round_to, sample_std, trailing_mean};
use crate::summary::extreme_day;
use crate::types::DailyAggregate;

/// Placeholder for a statistic that is undefined on the data.
pub const NOT_AVAILABLE: &str = "N/A";

/// One cleaned record with the derived columns BI dashboards expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiRow {
    #[serde(rename = "SQLDATE")]
    pub sql_date: String,
    #[serde(rename = "V2Themes")]
    pub themes: Option<String>,
    #[serde(rename = "Organizations")]
    pub organizations: Option<String>,
    #[serde(rename = "V2Tone")]
    pub tone: Option<String>,
    #[serde(rename = "SourceCollectionIdentifier")]
    pub source: String,
    #[serde(rename = "DocumentIdentifier")]
    pub document_id: String,
    pub date: NaiveDate,
    pub sentiment_score: f64,
    pub year: i32,
    pub month: u32,
    pub day_of_week: String,
    pub sentiment_category: SentimentCategory,
    pub sentiment_abs: f64,
    pub is_negative: bool,
    pub is_positive: bool,
    /// ISO 8601 week number.
    pub week_of_year: u32,
    pub quarter: u32,
    pub date_str: String,
    pub sentiment_7d_avg: f64,
    pub sentiment_30d_avg: f64,
}

/// BI rows in date order, with trailing averages over that order.
pub fn build_bi_rows(records: &[CleanedRecord]) -> Vec<BiRow> {
    let sorted = sorted_by_date(records);
    let scores: Vec<f64> = sorted.iter().map(|r| r.sentiment_score).collect();
    let short = trailing_mean(&scores, SHORT_WINDOW);
    let long = trailing_mean(&scores, LONG_WINDOW);

    sorted
        .into_iter()
        .zip(short.into_iter().zip(long))
        .map(|(r, (s7, s30))| BiRow {
            sql_date: r.raw.sql_date.clone(),
            themes: r.raw.themes.clone(),
            organizations: r.raw.organizations.clone(),
            tone: r.raw.tone.as_ref().map(|t| t.to_string()),
            source: r.raw.source.clone(),
            document_id: r.raw.document_id.clone(),
            date: r.date,
            sentiment_score: r.sentiment_score,
            year: r.year,
            month: r.month,
            day_of_week: r.day_of_week.clone(),
            sentiment_category: r.sentiment_category,
            sentiment_abs: r.sentiment_score.abs(),
            is_negative: r.sentiment_score < 0.0,
            is_positive: r.sentiment_score > 0.0,
            week_of_year: r.date.iso_week().week(),
            quarter: (r.month - 1) / 3 + 1,
            date_str: r.date.format("%Y-%m-%d").to_string(),
            sentiment_7d_avg: s7,
            sentiment_30d_avg: s30,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStat {
    pub metric: String,
    pub value: String,
}

impl SummaryStat {
    fn new(metric: &str, value: impl ToString) -> Self {
        Self {
            metric: metric.to_string(),
            value: value.to_string(),
        }
    }

    fn optional(metric: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => Self::new(metric, v),
            None => Self::new(metric, NOT_AVAILABLE),
        }
    }
}

/// Metric/value table for the summary statistics export.
pub fn summary_statistics(records: &[CleanedRecord], daily: &[DailyAggregate]) -> Vec<SummaryStat> {
    let scores: Vec<f64> = records.iter().map(|r| r.sentiment_score).collect();
    let total = records.len();
    let negative = scores.iter().filter(|s| **s < 0.0).count();
    let positive = scores.iter().filter(|s| **s > 0.0).count();
    let share = |n: usize| (total > 0).then(|| round_to(percentage(n, total), 2));
    let fmt_date = |d: NaiveDate| d.format("%Y-%m-%d").to_string();

    vec![
        SummaryStat::new("Total Articles", total),
        SummaryStat::optional(
            "Date Range Start",
            records.iter().map(|r| r.date).min().map(fmt_date),
        ),
        SummaryStat::optional(
            "Date Range End",
            records.iter().map(|r| r.date).max().map(fmt_date),
        ),
        SummaryStat::optional("Average Sentiment", mean(&scores).map(|v| round_to(v, 3))),
        SummaryStat::optional("Median Sentiment", median(&scores).map(|v| round_to(v, 3))),
        SummaryStat::optional("Standard Deviation", sample_std(&scores).map(|v| round_to(v, 3))),
        SummaryStat::optional("Negative Articles (%)", share(negative)),
        SummaryStat::optional("Positive Articles (%)", share(positive)),
        SummaryStat::optional(
            "Most Common Source",
            source_breakdown(records).into_iter().next().map(|s| s.source),
        ),
        SummaryStat::optional(
            "Most Negative Day",
            extreme_day(daily, |a, b| a < b).map(|d| fmt_date(d.date)),
        ),
        SummaryStat::optional(
            "Most Positive Day",
            extreme_day(daily, |a, b| a > b).map(|d| fmt_date(d.date)),
        ),
    ]
}
