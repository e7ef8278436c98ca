//! Batch reductions over cleaned records. Every function is pure and returns
//! an empty result for an empty input.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Weekday};
use esgsense_core::record::weekday_name;
use esgsense_core::{CategoryCounts, CleanedRecord, SentimentCategory};
use esgsense_ingest::{categorize, extract_themes};

use crate::stats::{mean, percentage, round_to, sample_std, trailing_mean};
use crate::types::*;

/// Short rolling window, in rows.
pub const SHORT_WINDOW: usize = 7;
/// Long rolling window, in rows.
pub const LONG_WINDOW: usize = 30;

/// Group scores by date, ascending.
pub fn daily_aggregates(records: &[CleanedRecord]) -> Vec<DailyAggregate> {
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for r in records {
        by_date.entry(r.date).or_default().push(r.sentiment_score);
    }

    by_date
        .into_iter()
        .filter_map(|(date, scores)| {
            Some(DailyAggregate {
                date,
                avg_sentiment: round_to(mean(&scores)?, 3),
                article_count: scores.len(),
                sentiment_stddev: sample_std(&scores).map(|s| round_to(s, 3)),
            })
        })
        .collect()
}

/// Records in ascending date order. The sort is stable, so same-day records
/// keep their input order.
pub fn sorted_by_date(records: &[CleanedRecord]) -> Vec<&CleanedRecord> {
    let mut sorted: Vec<&CleanedRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date);
    sorted
}

/// 7- and 30-row trailing averages of the score, in date order.
pub fn rolling_averages(records: &[CleanedRecord]) -> Vec<RollingPoint> {
    let sorted = sorted_by_date(records);
    let scores: Vec<f64> = sorted.iter().map(|r| r.sentiment_score).collect();
    let short = trailing_mean(&scores, SHORT_WINDOW);
    let long = trailing_mean(&scores, LONG_WINDOW);

    sorted
        .iter()
        .zip(short.into_iter().zip(long))
        .map(|(r, (s7, s30))| RollingPoint {
            date: r.date,
            sentiment_score: r.sentiment_score,
            sentiment_7d_avg: s7,
            sentiment_30d_avg: s30,
        })
        .collect()
}

fn scores_by_month(records: &[CleanedRecord]) -> BTreeMap<String, Vec<f64>> {
    let mut by_month: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for r in records {
        by_month.entry(r.month_key()).or_default().push(r.sentiment_score);
    }
    by_month
}

/// Count, mean and share of negative (< 0) scores per month, chronological.
pub fn monthly_trends(records: &[CleanedRecord]) -> Vec<MonthlyTrend> {
    scores_by_month(records)
        .into_iter()
        .filter_map(|(month, scores)| {
            let negative = scores.iter().filter(|s| **s < 0.0).count();
            Some(MonthlyTrend {
                month,
                article_count: scores.len(),
                avg_sentiment: round_to(mean(&scores)?, 3),
                negative_percentage: round_to(percentage(negative, scores.len()), 2),
            })
        })
        .collect()
}

/// Per-source statistics, most prolific source first (ties by name).
pub fn source_breakdown(records: &[CleanedRecord]) -> Vec<SourceBreakdown> {
    let mut by_source: HashMap<&str, Vec<f64>> = HashMap::new();
    for r in records {
        by_source.entry(r.raw.source.as_str()).or_default().push(r.sentiment_score);
    }

    let mut breakdown: Vec<SourceBreakdown> = by_source
        .into_iter()
        .filter_map(|(source, scores)| {
            let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
            let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some(SourceBreakdown {
                source: source.to_string(),
                article_count: scores.len(),
                avg_sentiment: round_to(mean(&scores)?, 3),
                min_sentiment: round_to(min, 3),
                max_sentiment: round_to(max, 3),
            })
        })
        .collect();

    breakdown.sort_by(|a, b| {
        b.article_count
            .cmp(&a.article_count)
            .then_with(|| a.source.cmp(&b.source))
    });
    breakdown
}

/// Monthly score stddev and its extremes.
///
/// Months with a single article have no stddev and are ignored by the mean
/// and the extremes. Ties go to the chronologically first month; with one
/// usable month it is both highest and lowest.
pub fn volatility(records: &[CleanedRecord]) -> VolatilityReport {
    let months: Vec<MonthVolatility> = scores_by_month(records)
        .into_iter()
        .map(|(month, scores)| MonthVolatility {
            month,
            article_count: scores.len(),
            stddev: sample_std(&scores),
        })
        .collect();

    let defined: Vec<(&str, f64)> = months
        .iter()
        .filter_map(|m| m.stddev.map(|s| (m.month.as_str(), s)))
        .collect();

    let mut highest: Option<(&str, f64)> = None;
    let mut lowest: Option<(&str, f64)> = None;
    for &(month, s) in &defined {
        if highest.map_or(true, |(_, h)| s > h) {
            highest = Some((month, s));
        }
        if lowest.map_or(true, |(_, l)| s < l) {
            lowest = Some((month, s));
        }
    }

    let values: Vec<f64> = defined.iter().map(|(_, s)| *s).collect();
    let to_extreme = |(month, stddev): (&str, f64)| VolatilityExtreme {
        month: month.to_string(),
        stddev,
    };

    VolatilityReport {
        mean_volatility: mean(&values),
        highest: highest.map(to_extreme),
        lowest: lowest.map(to_extreme),
        months,
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Mean, count and stddev per weekday, Monday first. Days without
/// articles are omitted.
pub fn weekday_aggregates(records: &[CleanedRecord]) -> Vec<WeekdayAggregate> {
    let mut by_day: HashMap<&str, Vec<f64>> = HashMap::new();
    for r in records {
        by_day.entry(r.day_of_week.as_str()).or_default().push(r.sentiment_score);
    }

    WEEK.iter()
        .filter_map(|day| {
            let name = weekday_name(*day);
            let scores = by_day.get(name)?;
            Some(WeekdayAggregate {
                day_of_week: name.to_string(),
                mean: round_to(mean(scores)?, 3),
                count: scores.len(),
                stddev: sample_std(scores).map(|s| round_to(s, 3)),
            })
        })
        .collect()
}

/// Occurrence tally of theme tokens, most frequent first. Ties keep the
/// order in which themes were first seen.
pub fn theme_counts(records: &[CleanedRecord], limit: usize) -> Vec<ThemeCount> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut seen = 0usize;
    for r in records {
        for theme in extract_themes(r.raw.themes.as_deref()) {
            let entry = counts.entry(theme).or_insert_with(|| {
                seen += 1;
                (0, seen)
            });
            entry.0 += 1;
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(theme, (count, first))| (theme, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(theme, count, _)| ThemeCount { theme, count })
        .collect()
}

/// Category counts summed over every record's themes.
pub fn category_totals(records: &[CleanedRecord]) -> CategoryCounts {
    let mut totals = CategoryCounts::new();
    for r in records {
        let themes = extract_themes(r.raw.themes.as_deref());
        totals.merge(&categorize(&themes));
    }
    totals
}

/// The `n` lowest-scoring articles; ties keep input order.
pub fn most_negative_articles(records: &[CleanedRecord], n: usize) -> Vec<NegativeArticle> {
    let mut ordered: Vec<&CleanedRecord> = records.iter().collect();
    ordered.sort_by(|a, b| a.sentiment_score.total_cmp(&b.sentiment_score));
    ordered
        .into_iter()
        .take(n)
        .map(|r| NegativeArticle {
            date: r.date,
            sentiment_score: r.sentiment_score,
            document_id: r.raw.document_id.clone(),
            source: r.raw.source.clone(),
        })
        .collect()
}

/// Size of each sentiment bucket, in bucket order. All four are present.
pub fn sentiment_distribution(records: &[CleanedRecord]) -> Vec<CategoryShare> {
    SentimentCategory::ALL
        .iter()
        .map(|category| {
            let count = records
                .iter()
                .filter(|r| r.sentiment_category == *category)
                .count();
            CategoryShare {
                category: *category,
                count,
                percentage: round_to(percentage(count, records.len()), 2),
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use esgsense_core::{EsgCategory, RawRecord};

    pub(crate) fn record(date: &str, score: f64, source: &str, themes: &str) -> CleanedRecord {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let raw = RawRecord {
            sql_date: date.format("%Y%m%d").to_string(),
            themes: if themes.is_empty() { None } else { Some(themes.into()) },
            organizations: Some("tesla inc".into()),
            tone: None,
            source: source.into(),
            document_id: format!("https://{}/{}", source, score),
        };
        CleanedRecord::new(raw, date, score)
    }

    #[test]
    fn test_daily_single_record_stddev_is_none() {
        let records = vec![
            record("2025-07-01", 1.0, "a.com", ""),
            record("2025-07-02", 1.0, "a.com", ""),
            record("2025-07-02", 2.0, "a.com", ""),
        ];
        let daily = daily_aggregates(&records);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].sentiment_stddev, None);
        assert_eq!(daily[0].article_count, 1);
        assert_eq!(daily[1].avg_sentiment, 1.5);
        assert_eq!(daily[1].sentiment_stddev, Some(0.707));
    }

    #[test]
    fn test_rolling_sorted_and_shrinking() {
        // Out of order input; one point per day.
        let records = vec![
            record("2025-07-03", 3.0, "a.com", ""),
            record("2025-07-01", 1.0, "a.com", ""),
            record("2025-07-02", 2.0, "a.com", ""),
        ];
        let rolling = rolling_averages(&records);
        let s7: Vec<f64> = rolling.iter().map(|p| p.sentiment_7d_avg).collect();
        assert_eq!(s7, vec![1.0, 1.5, 2.0]);
        assert_eq!(rolling[0].sentiment_30d_avg, 1.0);
        assert_eq!(rolling[2].date.to_string(), "2025-07-03");
    }

    #[test]
    fn test_rolling_window_caps_at_seven() {
        let records: Vec<CleanedRecord> = (1..=9)
            .map(|d| record(&format!("2025-07-{:02}", d), d as f64, "a.com", ""))
            .collect();
        let rolling = rolling_averages(&records);
        // Rows 3..=9 -> mean 6.
        assert_eq!(rolling[8].sentiment_7d_avg, 6.0);
        assert_eq!(rolling[8].sentiment_30d_avg, 5.0);
    }

    #[test]
    fn test_monthly_trends() {
        let records = vec![
            record("2025-06-30", -1.0, "a.com", ""),
            record("2025-07-01", -1.0, "a.com", ""),
            record("2025-07-02", 2.0, "a.com", ""),
            record("2025-07-03", 0.0, "a.com", ""),
        ];
        let monthly = monthly_trends(&records);
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].month, "2025-06");
        assert_eq!(monthly[0].negative_percentage, 100.0);
        assert_eq!(monthly[1].article_count, 3);
        assert_eq!(monthly[1].negative_percentage, 33.33);
        assert_eq!(monthly[1].avg_sentiment, 0.333);
    }

    #[test]
    fn test_source_breakdown_order() {
        let records = vec![
            record("2025-07-01", -2.0, "b.com", ""),
            record("2025-07-01", 4.0, "b.com", ""),
            record("2025-07-01", 1.0, "c.com", ""),
            record("2025-07-02", 3.0, "a.com", ""),
        ];
        let sources = source_breakdown(&records);
        assert_eq!(sources[0].source, "b.com");
        assert_eq!(sources[0].min_sentiment, -2.0);
        assert_eq!(sources[0].max_sentiment, 4.0);
        assert_eq!(sources[0].avg_sentiment, 1.0);
        // a.com and c.com tie on count; name order.
        assert_eq!(sources[1].source, "a.com");
        assert_eq!(sources[2].source, "c.com");
    }

    #[test]
    fn test_volatility_tie_picks_first_month() {
        let records = vec![
            record("2025-05-01", 1.0, "a.com", ""),
            record("2025-05-02", 3.0, "a.com", ""),
            record("2025-06-01", 5.0, "a.com", ""),
            record("2025-06-02", 7.0, "a.com", ""),
        ];
        let v = volatility(&records);
        assert_eq!(v.highest.as_ref().unwrap().month, "2025-05");
        assert_eq!(v.lowest.as_ref().unwrap().month, "2025-05");
        assert_eq!(v.mean_volatility, Some(2f64.sqrt()));
    }

    #[test]
    fn test_volatility_ignores_single_article_months() {
        let records = vec![
            record("2025-05-01", 1.0, "a.com", ""),
            record("2025-06-01", 0.0, "a.com", ""),
            record("2025-06-02", 4.0, "a.com", ""),
            record("2025-07-01", 1.0, "a.com", ""),
            record("2025-07-02", 2.0, "a.com", ""),
        ];
        let v = volatility(&records);
        assert_eq!(v.months.len(), 3);
        assert_eq!(v.months[0].stddev, None);
        assert_eq!(v.highest.unwrap().month, "2025-06");
        assert_eq!(v.lowest.unwrap().month, "2025-07");
    }

    #[test]
    fn test_volatility_single_month_reports_both() {
        let records = vec![
            record("2025-07-01", 1.0, "a.com", ""),
            record("2025-07-02", 2.0, "a.com", ""),
        ];
        let v = volatility(&records);
        assert_eq!(v.highest, v.lowest);
        assert!(v.highest.is_some());
    }

    #[test]
    fn test_weekday_order() {
        // 2025-07-06 is a Sunday, 2025-07-07 a Monday.
        let records = vec![
            record("2025-07-06", 1.0, "a.com", ""),
            record("2025-07-07", 2.0, "a.com", ""),
            record("2025-07-07", 4.0, "a.com", ""),
        ];
        let days = weekday_aggregates(&records);
        assert_eq!(days[0].day_of_week, "Monday");
        assert_eq!(days[0].mean, 3.0);
        assert_eq!(days[1].day_of_week, "Sunday");
        assert_eq!(days[1].stddev, None);
    }

    #[test]
    fn test_theme_counts_and_category_totals() {
        let records = vec![
            record("2025-07-01", 1.0, "a.com", "LEGISLATION;ECON_STOCKMARKET;TRIAL"),
            record("2025-07-02", 1.0, "a.com", "ECON_STOCKMARKET;TRIAL;MEDICAL"),
            record("2025-07-03", 1.0, "a.com", ""),
        ];
        let themes = theme_counts(&records, 2);
        assert_eq!(themes.len(), 2);
        assert_eq!(themes[0], ThemeCount { theme: "ECON_STOCKMARKET".into(), count: 2 });
        assert_eq!(themes[1].theme, "TRIAL");

        let totals = category_totals(&records);
        assert_eq!(totals.get(EsgCategory::Economic), 2);
        assert_eq!(totals.get(EsgCategory::Governance), 1);
        assert_eq!(totals.get(EsgCategory::Social), 1);
        assert_eq!(totals.total(), 4);
    }

    #[test]
    fn test_most_negative_articles() {
        let records = vec![
            record("2025-07-01", -1.0, "a.com", ""),
            record("2025-07-02", -3.0, "b.com", ""),
            record("2025-07-03", 2.0, "c.com", ""),
        ];
        let worst = most_negative_articles(&records, 2);
        assert_eq!(worst.len(), 2);
        assert_eq!(worst[0].source, "b.com");
        assert_eq!(worst[1].sentiment_score, -1.0);
    }

    #[test]
    fn test_sentiment_distribution() {
        let records = vec![
            record("2025-07-01", -3.0, "a.com", ""),
            record("2025-07-02", -2.0, "a.com", ""),
            record("2025-07-03", 2.0, "a.com", ""),
            record("2025-07-04", 0.5, "a.com", ""),
        ];
        let dist = sentiment_distribution(&records);
        assert_eq!(dist.len(), 4);
        assert_eq!(dist[0].count, 1);
        assert_eq!(dist[1].count, 1);
        assert_eq!(dist[2].count, 2);
        assert_eq!(dist[3].count, 0);
        assert_eq!(dist[2].percentage, 50.0);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(daily_aggregates(&[]).is_empty());
        assert!(rolling_averages(&[]).is_empty());
        assert!(monthly_trends(&[]).is_empty());
        assert!(source_breakdown(&[]).is_empty());
        assert!(weekday_aggregates(&[]).is_empty());
        assert!(theme_counts(&[], 15).is_empty());
        assert_eq!(category_totals(&[]).total(), 0);
        let v = volatility(&[]);
        assert!(v.highest.is_none() && v.mean_volatility.is_none());
        assert!(sentiment_distribution(&[]).iter().all(|s| s.count == 0));
    }
}
