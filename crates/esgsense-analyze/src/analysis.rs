//! One-shot analysis of a cleaned batch.

use esgsense_core::{CategoryCounts, CleanedRecord, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::aggregate::*;
use crate::correlation::{sentiment_correlation, CorrelationMatrix};
use crate::types::*;

/// Themes shown in the theme chart.
pub const TOP_THEMES: usize = 15;
/// Articles listed as most negative.
pub const TOP_NEGATIVE: usize = 10;

/// Every in-memory analysis of a batch. Built once and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub daily: Vec<DailyAggregate>,
    pub rolling: Vec<RollingPoint>,
    pub monthly: Vec<MonthlyTrend>,
    pub sources: Vec<SourceBreakdown>,
    pub volatility: VolatilityReport,
    pub weekdays: Vec<WeekdayAggregate>,
    pub correlation: Option<CorrelationMatrix>,
    pub top_themes: Vec<ThemeCount>,
    pub category_totals: CategoryCounts,
    pub most_negative: Vec<NegativeArticle>,
    pub distribution: Vec<CategoryShare>,
}

impl Analysis {
    pub fn compute(records: &[CleanedRecord]) -> Self {
        info!("Analyzing {} records", records.len());

        let analysis = Self {
            daily: daily_aggregates(records),
            rolling: rolling_averages(records),
            monthly: monthly_trends(records),
            sources: source_breakdown(records),
            volatility: volatility(records),
            weekdays: weekday_aggregates(records),
            correlation: sentiment_correlation(records),
            top_themes: theme_counts(records, TOP_THEMES),
            category_totals: category_totals(records),
            most_negative: most_negative_articles(records, TOP_NEGATIVE),
            distribution: sentiment_distribution(records),
        };

        info!(
            "Aggregated {} days, {} months, {} sources",
            analysis.daily.len(),
            analysis.monthly.len(),
            analysis.sources.len()
        );
        if let Some(v) = analysis.volatility.mean_volatility {
            info!("Average monthly volatility: {:.3}", v);
        }
        if let (Some(hi), Some(lo)) = (&analysis.volatility.highest, &analysis.volatility.lowest) {
            info!(
                "Most volatile month: {} ({:.3}); least volatile: {} ({:.3})",
                hi.month, hi.stddev, lo.month, lo.stddev
            );
        }
        match &analysis.correlation {
            Some(m) => debug!("Correlation matrix over {:?}", m.columns()),
            None => debug!("Correlation skipped: not enough data"),
        }
        for (category, count) in analysis.category_totals.ranked() {
            debug!("ESG category {}: {} themes", category, count);
        }

        analysis
    }
}

/// SHA-256 over the JSON encoding of the daily aggregates, hex encoded.
/// Identical inputs produce identical fingerprints across runs.
pub fn fingerprint(daily: &[DailyAggregate]) -> Result<String> {
    let bytes = serde_json::to_vec(daily)?;
    let digest = Sha256::digest(&bytes);
    Ok(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::record;

    fn sample() -> Vec<CleanedRecord> {
        vec![
            record("2025-06-01", -1.2, "a.com", "LEGISLATION;ECON_STOCKMARKET"),
            record("2025-06-01", 0.4, "b.com", "MEDICAL"),
            record("2025-06-15", 2.5, "a.com", "ELECTION"),
            record("2025-07-01", -3.1, "c.com", "ECON_STOCKMARKET"),
        ]
    }

    #[test]
    fn test_compute_is_deterministic() {
        let a = Analysis::compute(&sample());
        let b = Analysis::compute(&sample());
        assert_eq!(a.daily, b.daily);
        assert_eq!(a.category_totals, b.category_totals);
        assert_eq!(fingerprint(&a.daily).unwrap(), fingerprint(&b.daily).unwrap());
    }

    #[test]
    fn test_compute_contents() {
        let a = Analysis::compute(&sample());
        assert_eq!(a.daily.len(), 3);
        assert_eq!(a.monthly.len(), 2);
        assert_eq!(a.sources[0].source, "a.com");
        assert_eq!(a.most_negative[0].sentiment_score, -3.1);
        assert_eq!(a.top_themes[0].theme, "ECON_STOCKMARKET");
        assert_eq!(a.distribution.iter().map(|d| d.count).sum::<usize>(), 4);
        assert!(a.correlation.is_some());
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = Analysis::compute(&sample());
        let mut other = sample();
        other[0] = record("2025-06-01", -1.3, "a.com", "");
        let b = Analysis::compute(&other);

        let fa = fingerprint(&a.daily).unwrap();
        assert_eq!(fa.len(), 64);
        assert_ne!(fa, fingerprint(&b.daily).unwrap());
    }

    #[test]
    fn test_empty_batch() {
        let a = Analysis::compute(&[]);
        assert!(a.daily.is_empty());
        assert!(a.correlation.is_none());
        assert!(a.most_negative.is_empty());
        assert_eq!(a.distribution.len(), 4);
        assert!(fingerprint(&a.daily).is_ok());
    }
}
