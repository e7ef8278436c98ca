//! Row types flowing through the pipeline: raw feed rows and cleaned records.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Upper edge (inclusive) of the Very Negative bucket is just below this.
pub const VERY_NEGATIVE_BELOW: f64 = -2.0;
/// Upper edge (inclusive) of the Negative bucket.
pub const NEGATIVE_MAX: f64 = 0.0;
/// Upper edge (inclusive) of the Positive bucket.
pub const POSITIVE_MAX: f64 = 2.0;

/// Tone cell as read from the feed, resolved once at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToneInput {
    /// The cell was a bare number.
    Numeric(f64),
    /// Packed comma-delimited tone vector (or anything else non-empty).
    Text(String),
}

impl ToneInput {
    /// Resolve a raw cell. Empty (or whitespace-only) cells are absent.
    pub fn from_cell(cell: &str) -> Option<ToneInput> {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<f64>() {
            Ok(value) => Some(ToneInput::Numeric(value)),
            Err(_) => Some(ToneInput::Text(cell.to_string())),
        }
    }
}

impl std::fmt::Display for ToneInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One row of the entity-filtered feed. Immutable once read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// `SQLDATE` cell, kept as text so the cleaner can judge the column shape.
    pub sql_date: String,
    /// `V2Themes`, `;`-delimited.
    pub themes: Option<String>,
    /// `Organizations`, `;`-delimited.
    pub organizations: Option<String>,
    /// `V2Tone`.
    pub tone: Option<ToneInput>,
    /// `SourceCollectionIdentifier`.
    pub source: String,
    /// `DocumentIdentifier` (article URL).
    pub document_id: String,
}

/// Four-bucket sentiment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SentimentCategory {
    #[serde(rename = "Very Negative")]
    VeryNegative,
    #[serde(rename = "Negative")]
    Negative,
    #[serde(rename = "Positive")]
    Positive,
    #[serde(rename = "Very Positive")]
    VeryPositive,
}

impl SentimentCategory {
    pub const ALL: [SentimentCategory; 4] = [
        Self::VeryNegative,
        Self::Negative,
        Self::Positive,
        Self::VeryPositive,
    ];

    /// Bucket a score: `< -2`, `[-2, 0]`, `(0, 2]`, `> 2`.
    pub fn from_score(score: f64) -> Self {
        if score < VERY_NEGATIVE_BELOW {
            Self::VeryNegative
        } else if score <= NEGATIVE_MAX {
            Self::Negative
        } else if score <= POSITIVE_MAX {
            Self::Positive
        } else {
            Self::VeryPositive
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryNegative => "Very Negative",
            Self::Negative => "Negative",
            Self::Positive => "Positive",
            Self::VeryPositive => "Very Positive",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }
}

impl std::fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A raw row that survived cleaning, with its derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    #[serde(flatten)]
    pub raw: RawRecord,
    pub date: NaiveDate,
    pub sentiment_score: f64,
    pub year: i32,
    pub month: u32,
    pub day_of_week: String,
    pub sentiment_category: SentimentCategory,
}

impl CleanedRecord {
    /// Attach a parsed date and score to a raw row and derive calendar fields.
    pub fn new(raw: RawRecord, date: NaiveDate, sentiment_score: f64) -> Self {
        Self {
            raw,
            date,
            sentiment_score,
            year: date.year(),
            month: date.month(),
            day_of_week: weekday_name(date.weekday()).to_string(),
            sentiment_category: SentimentCategory::from_score(sentiment_score),
        }
    }

    /// `YYYY-MM` key of the record's month.
    pub fn month_key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Full English weekday name.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
