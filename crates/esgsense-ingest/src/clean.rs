//! Record cleaning: date parsing, sentiment scoring, null dropping and
//! derived calendar/category fields.

use chrono::{Days, NaiveDate};
use esgsense_core::{CleanedRecord, RawRecord, ToneInput};
use serde::Serialize;
use tracing::{info, warn};

use crate::extract::{parse_tone, ToneVector};

/// First synthetic date handed out when the date column is unusable.
pub const SYNTHETIC_EPOCH: (i32, u32, u32) = (2024, 7, 1);

/// How dates were assigned for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    /// `SQLDATE` parsed per row as `YYYYMMDD`.
    Parsed,
    /// Column was mostly not integer `YYYYMMDD`; rows got sequential dates.
    Synthetic,
}

/// Cleaned batch plus the counts reported for it.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub records: Vec<CleanedRecord>,
    pub original_count: usize,
    pub cleaned_count: usize,
    pub date_mode: DateMode,
    pub missing_dates: usize,
    pub missing_scores: usize,
    /// Kept rows whose tone text is not a full six-field vector.
    pub malformed_tone_vectors: usize,
}

impl CleanOutcome {
    pub fn dropped(&self) -> usize {
        self.original_count - self.cleaned_count
    }
}

/// Decide whether the date column is integer `YYYYMMDD` as a whole.
///
/// The column qualifies when at least half of its non-empty values are
/// eight-digit integers. Individual values that still fail to parse become
/// missing dates in [`clean`]; only a column that is mostly some other shape
/// (placeholders, timestamps, ISO strings) or entirely empty falls back to
/// synthetic dates.
pub fn detect_date_mode(rows: &[RawRecord]) -> DateMode {
    if rows.is_empty() {
        return DateMode::Parsed;
    }
    let (present, eight_digit) = rows
        .iter()
        .map(|r| r.sql_date.trim())
        .filter(|v| !v.is_empty())
        .fold((0usize, 0usize), |(present, eight), v| {
            (present + 1, eight + usize::from(is_eight_digit_integer(v)))
        });

    if present > 0 && eight_digit * 2 >= present {
        DateMode::Parsed
    } else {
        DateMode::Synthetic
    }
}

fn is_eight_digit_integer(value: &str) -> bool {
    value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Parse one `YYYYMMDD` value. `None` for anything that isn't a real date.
pub fn parse_sql_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if !is_eight_digit_integer(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y%m%d").ok()
}

/// Synthetic date for the row at `index` (0-based, input order).
pub fn synthetic_date(index: usize) -> Option<NaiveDate> {
    let (y, m, d) = SYNTHETIC_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_days(Days::new(index as u64))
}

/// Clean a batch. Rows with a missing date or sentiment score are dropped.
pub fn clean(rows: &[RawRecord]) -> CleanOutcome {
    let original_count = rows.len();
    info!("Cleaning {} records", original_count);

    let date_mode = detect_date_mode(rows);
    if date_mode == DateMode::Synthetic {
        warn!(
            "SQLDATE is not integer YYYYMMDD; assigning sequential dates from {:04}-{:02}-{:02}",
            SYNTHETIC_EPOCH.0, SYNTHETIC_EPOCH.1, SYNTHETIC_EPOCH.2
        );
    }

    let mut records = Vec::with_capacity(rows.len());
    let mut missing_dates = 0usize;
    let mut missing_scores = 0usize;
    let mut malformed_tone_vectors = 0usize;

    for (index, row) in rows.iter().enumerate() {
        let date = match date_mode {
            DateMode::Parsed => parse_sql_date(&row.sql_date),
            DateMode::Synthetic => synthetic_date(index),
        };
        let score = parse_tone(row.tone.as_ref());

        if date.is_none() {
            missing_dates += 1;
        }
        if score.is_none() {
            missing_scores += 1;
        }

        if let (Some(date), Some(score)) = (date, score) {
            if !is_full_tone_vector(row.tone.as_ref()) {
                malformed_tone_vectors += 1;
            }
            records.push(CleanedRecord::new(row.clone(), date, score));
        }
    }

    let cleaned_count = records.len();
    info!(
        "Removed {} rows with null values (dates: {}, scores: {}); final size {}",
        original_count - cleaned_count,
        missing_dates,
        missing_scores,
        cleaned_count
    );
    if malformed_tone_vectors > 0 {
        warn!(
            "{} kept rows have a V2Tone that is not {} numeric fields; only the tone field is used",
            malformed_tone_vectors,
            crate::extract::tone::TONE_FIELDS
        );
    }
    if let Some((min, max)) = score_range(&records) {
        info!("Sentiment range: {:.2} to {:.2}", min, max);
    }

    CleanOutcome {
        records,
        original_count,
        cleaned_count,
        date_mode,
        missing_dates,
        missing_scores,
        malformed_tone_vectors,
    }
}

/// Bare numeric tones carry no vector and pass.
fn is_full_tone_vector(tone: Option<&ToneInput>) -> bool {
    match tone {
        Some(ToneInput::Text(text)) => ToneVector::parse(text).is_some(),
        _ => true,
    }
}

fn score_range(records: &[CleanedRecord]) -> Option<(f64, f64)> {
    records.iter().map(|r| r.sentiment_score).fold(None, |acc, s| match acc {
        None => Some((s, s)),
        Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use esgsense_core::{SentimentCategory, ToneInput};

    fn raw(date: &str, tone: &str) -> RawRecord {
        RawRecord {
            sql_date: date.to_string(),
            themes: Some("LEGISLATION".into()),
            organizations: Some("tesla inc".into()),
            tone: ToneInput::from_cell(tone),
            source: "pr-inside.com".into(),
            document_id: format!("https://example.com/{}", date),
        }
    }

    #[test]
    fn test_drops_bad_date_and_empty_tone() {
        let rows = vec![
            raw("20250701", "-1.5,1,2,3,4,5"),
            raw("20250702", "0.5,1,2,3,4,5"),
            raw("20251301", "1.0,1,2,3,4,5"), // row 3: month 13
            raw("20250704", "2.5,1,2,3,4,5"),
            raw("20250705", ""), // row 5: no tone
            raw("20250706", "-3.0,1,2,3,4,5"),
        ];
        let outcome = clean(&rows);

        assert_eq!(outcome.date_mode, DateMode::Parsed);
        assert_eq!(outcome.original_count, 6);
        assert_eq!(outcome.cleaned_count, 4);
        assert_eq!(outcome.dropped(), 2);
        assert_eq!(outcome.missing_dates, 1);
        assert_eq!(outcome.missing_scores, 1);

        let kept: Vec<&str> = outcome
            .records
            .iter()
            .map(|r| r.raw.sql_date.as_str())
            .collect();
        assert_eq!(kept, vec!["20250701", "20250702", "20250704", "20250706"]);
        assert_eq!(
            outcome.records[3].sentiment_category,
            SentimentCategory::VeryNegative
        );
    }

    #[test]
    fn test_counts_malformed_tone_vectors() {
        let rows = vec![
            raw("20250701", "-1.5,1,2,3,4,5"),
            raw("20250702", "1.25,x,y,z,,"),
            raw("20250703", "0.5,1,2"),
            raw("20250704", "2.0"),
            raw("20250705", "abc,1,2,3,4,5"),
        ];
        let outcome = clean(&rows);

        assert_eq!(outcome.cleaned_count, 4);
        assert_eq!(outcome.missing_scores, 1);
        // Dropped rows are not counted; a bare number is not a vector.
        assert_eq!(outcome.malformed_tone_vectors, 2);
    }

    #[test]
    fn test_synthetic_dates_when_column_is_placeholder() {
        let rows = vec![
            raw("1", "1.0,0,0,0,0,0"),
            raw("1", "2.0,0,0,0,0,0"),
            raw("1", "3.0,0,0,0,0,0"),
        ];
        let outcome = clean(&rows);
        assert_eq!(outcome.date_mode, DateMode::Synthetic);
        let dates: Vec<String> = outcome.records.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-07-01", "2024-07-02", "2024-07-03"]);
        assert_eq!(outcome.records[0].day_of_week, "Monday");
    }

    #[test]
    fn test_synthetic_dates_skip_position_of_dropped_rows() {
        let rows = vec![
            raw("x", "1.0"),
            raw("x", ""),
            raw("x", "3.0"),
        ];
        let outcome = clean(&rows);
        assert_eq!(outcome.cleaned_count, 2);
        assert_eq!(outcome.records[1].date.to_string(), "2024-07-03");
    }

    #[test]
    fn test_fourteen_digit_timestamps_fall_back() {
        let rows = vec![raw("20250703120000", "1.0")];
        assert_eq!(detect_date_mode(&rows), DateMode::Synthetic);
    }

    #[test]
    fn test_unparseable_value_is_missing_not_synthetic() {
        let rows = vec![
            raw("20250701", "-1.5,1,2,3,4,5"),
            raw("20250702", "0.5,1,2,3,4,5"),
            raw("not-a-date", "1.0,1,2,3,4,5"),
            raw("20250704", "2.5,1,2,3,4,5"),
            raw("20250705", ""),
            raw("20250706", "-3.0,1,2,3,4,5"),
        ];
        let outcome = clean(&rows);

        assert_eq!(outcome.date_mode, DateMode::Parsed);
        assert_eq!(outcome.dropped(), 2);
        let dates: Vec<String> = outcome.records.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(
            dates,
            vec!["2025-07-01", "2025-07-02", "2025-07-04", "2025-07-06"]
        );
    }

    #[test]
    fn test_stray_values_keep_parsed_mode() {
        let rows = vec![raw("20250703", "1.0"), raw("", "1.0")];
        assert_eq!(detect_date_mode(&rows), DateMode::Parsed);

        let rows = vec![raw("20250703", "1.0"), raw("2025-07-04", "1.0")];
        assert_eq!(detect_date_mode(&rows), DateMode::Parsed);

        let outcome = clean(&rows);
        assert_eq!(outcome.cleaned_count, 1);
        assert_eq!(outcome.missing_dates, 1);
    }

    #[test]
    fn test_mostly_foreign_shape_falls_back() {
        let rows = vec![
            raw("2025-07-01", "1.0"),
            raw("2025-07-02", "1.0"),
            raw("20250703", "1.0"),
        ];
        assert_eq!(detect_date_mode(&rows), DateMode::Synthetic);

        let rows = vec![raw("", "1.0"), raw(" ", "1.0")];
        assert_eq!(detect_date_mode(&rows), DateMode::Synthetic);
    }

    #[test]
    fn test_empty_batch() {
        let outcome = clean(&[]);
        assert_eq!(outcome.original_count, 0);
        assert_eq!(outcome.cleaned_count, 0);
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_parse_sql_date() {
        assert_eq!(
            parse_sql_date("20250703"),
            NaiveDate::from_ymd_opt(2025, 7, 3)
        );
        assert_eq!(parse_sql_date("20250230"), None);
        assert_eq!(parse_sql_date("2025073"), None);
        assert_eq!(parse_sql_date("2025-07-03"), None);
    }
}
