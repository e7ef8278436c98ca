//! Executive summary: headline metrics, recent-trend reading and
//! theme-driven recommendations.

use chrono::{Days, NaiveDate};
use esgsense_core::{CategoryCounts, CleanedRecord, EsgCategory};
use serde::Serialize;
use tracing::{info, warn};

use crate::stats::{mean, percentage};
use crate::types::DailyAggregate;

/// Length of the recent window, ending at the latest record date.
pub const RECENT_WINDOW_DAYS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub recent_sentiment: f64,
    pub overall_sentiment: f64,
    pub direction: TrendDirection,
    pub magnitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayExtreme {
    pub date: NaiveDate,
    pub avg_sentiment: f64,
}

/// Fixed advice attached to one ESG category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub category: EsgCategory,
    pub theme_count: usize,
    pub title: &'static str,
    pub rationale: &'static str,
    pub actions: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub total_articles: usize,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub avg_sentiment: f64,
    pub negative_percentage: f64,
    pub positive_percentage: f64,
    pub trend: TrendAnalysis,
    pub most_negative_day: Option<DayExtreme>,
    pub most_positive_day: Option<DayExtreme>,
    pub category_totals: CategoryCounts,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutiveSummary {
    NoData,
    Report(SummaryReport),
}

impl ExecutiveSummary {
    pub fn report(&self) -> Option<&SummaryReport> {
        match self {
            Self::NoData => None,
            Self::Report(r) => Some(r),
        }
    }

    /// Write the summary to the log.
    pub fn log(&self) {
        let report = match self {
            Self::NoData => {
                warn!("No data available for executive summary");
                return;
            }
            Self::Report(r) => r,
        };

        info!("Executive summary");
        info!("  Total articles analyzed: {}", report.total_articles);
        info!("  Analysis period: {} to {}", report.date_start, report.date_end);
        info!("  Average sentiment score: {:.3}", report.avg_sentiment);
        info!("  Negative sentiment: {:.1}% of articles", report.negative_percentage);
        info!("  Positive sentiment: {:.1}% of articles", report.positive_percentage);
        info!(
            "  Recent {}-day sentiment: {:.3} (overall {:.3})",
            RECENT_WINDOW_DAYS, report.trend.recent_sentiment, report.trend.overall_sentiment
        );
        info!(
            "  Trend: {} by {:.3} points",
            report.trend.direction.as_str().to_uppercase(),
            report.trend.magnitude
        );
        if let (Some(neg), Some(pos)) = (&report.most_negative_day, &report.most_positive_day) {
            info!(
                "  Most negative day: {} ({:.3}); most positive day: {} ({:.3})",
                neg.date, neg.avg_sentiment, pos.date, pos.avg_sentiment
            );
        }

        for (i, rec) in report.recommendations.iter().enumerate() {
            info!("{}. {} ({} themes)", i + 1, rec.title, rec.theme_count);
            info!("   {}", rec.rationale);
            for action in rec.actions {
                info!("   - {}", action);
            }
        }
    }
}

/// Build the summary. An empty record set yields [`ExecutiveSummary::NoData`]
/// before anything else is computed.
pub fn summarize(
    records: &[CleanedRecord],
    daily: &[DailyAggregate],
    category_totals: &CategoryCounts,
) -> ExecutiveSummary {
    let scores: Vec<f64> = records.iter().map(|r| r.sentiment_score).collect();
    let (Some(avg), Some(date_start), Some(date_end)) = (
        mean(&scores),
        records.iter().map(|r| r.date).min(),
        records.iter().map(|r| r.date).max(),
    ) else {
        return ExecutiveSummary::NoData;
    };

    let total = records.len();
    let negative = scores.iter().filter(|s| **s < 0.0).count();
    let positive = scores.iter().filter(|s| **s > 0.0).count();

    ExecutiveSummary::Report(SummaryReport {
        total_articles: total,
        date_start,
        date_end,
        avg_sentiment: avg,
        negative_percentage: percentage(negative, total),
        positive_percentage: percentage(positive, total),
        trend: trend(records, date_end, avg),
        most_negative_day: extreme_day(daily, |a, b| a < b),
        most_positive_day: extreme_day(daily, |a, b| a > b),
        category_totals: *category_totals,
        recommendations: recommendations(category_totals),
    })
}

fn trend(records: &[CleanedRecord], max_date: NaiveDate, overall: f64) -> TrendAnalysis {
    let cutoff = max_date
        .checked_sub_days(Days::new(RECENT_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);
    let recent: Vec<f64> = records
        .iter()
        .filter(|r| r.date >= cutoff)
        .map(|r| r.sentiment_score)
        .collect();
    let recent_sentiment = mean(&recent).unwrap_or(overall);

    TrendAnalysis {
        recent_sentiment,
        overall_sentiment: overall,
        direction: if recent_sentiment > overall {
            TrendDirection::Improving
        } else {
            TrendDirection::Declining
        },
        magnitude: (recent_sentiment - overall).abs(),
    }
}

/// First day whose average beats every earlier one under `better`.
pub fn extreme_day(daily: &[DailyAggregate], better: impl Fn(f64, f64) -> bool) -> Option<DayExtreme> {
    let mut best: Option<&DailyAggregate> = None;
    for day in daily {
        if best.map_or(true, |b| better(day.avg_sentiment, b.avg_sentiment)) {
            best = Some(day);
        }
    }
    best.map(|d| DayExtreme {
        date: d.date,
        avg_sentiment: d.avg_sentiment,
    })
}

/// One block per category with a non-zero total, most frequent first.
pub fn recommendations(totals: &CategoryCounts) -> Vec<Recommendation> {
    totals
        .ranked()
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(category, count)| {
            let (title, rationale, actions) = advice(category);
            Recommendation {
                category,
                theme_count: count,
                title,
                rationale,
                actions,
            }
        })
        .collect()
}

const GOVERNANCE_ACTIONS: &[&str] = &[
    "Strengthen anti-corruption and compliance frameworks.",
    "Enhance board governance and transparency reporting.",
    "Proactively address regulatory and legal framework concerns.",
    "Implement robust internal controls and audit processes.",
];

const ECONOMIC_ACTIONS: &[&str] = &[
    "Improve financial disclosure and investor communications.",
    "Address executive compensation and shareholder concerns.",
    "Enhance quarterly earnings transparency on ESG metrics.",
    "Develop clearer ESG performance indicators for investors.",
];

const SOCIAL_ACTIONS: &[&str] = &[
    "Employee well-being and fair labor practices.",
    "Diversity, equity, and inclusion initiatives.",
    "Community engagement and responsible sourcing.",
    "Customer safety and product responsibility.",
];

const ENVIRONMENTAL_ACTIONS: &[&str] = &[
    "Emphasize sustainable manufacturing practices.",
    "Showcase advancements in renewable energy and clean technology.",
    "Provide transparent reporting on carbon footprint reduction.",
    "Invest in eco-friendly supply chain solutions.",
];

const TECHNOLOGY_ACTIONS: &[&str] = &[
    "Publish clear policies on data privacy and product software safety.",
    "Communicate responsibly about autonomous driving capabilities.",
    "Monitor social media narratives and correct misinformation promptly.",
];

const POLITICAL_ACTIONS: &[&str] = &[
    "Disclose lobbying activity and political contributions.",
    "Keep leadership commentary separate from corporate positions.",
    "Track election and policy cycles that affect incentives and regulation.",
];

fn advice(category: EsgCategory) -> (&'static str, &'static str, &'static [&'static str]) {
    match category {
        EsgCategory::Governance => (
            "Governance and compliance priority",
            "Governance-related themes are highly prevalent; the company should:",
            GOVERNANCE_ACTIONS,
        ),
        EsgCategory::Economic => (
            "Financial transparency and stakeholder communication",
            "Coverage focuses on stock market and economic themes; the company should:",
            ECONOMIC_ACTIONS,
        ),
        EsgCategory::Social => (
            "Social impact and workforce relations",
            "Social themes appear in coverage; the company should focus on:",
            SOCIAL_ACTIONS,
        ),
        EsgCategory::Environmental => (
            "Environmental stewardship and innovation",
            "Environmental themes appear in coverage; the company should:",
            ENVIRONMENTAL_ACTIONS,
        ),
        EsgCategory::Technology => (
            "Technology and digital responsibility",
            "Technology and media themes appear in coverage; the company should:",
            TECHNOLOGY_ACTIONS,
        ),
        EsgCategory::Political => (
            "Political exposure and public policy",
            "Political themes appear in coverage; the company should:",
            POLITICAL_ACTIONS,
        ),
    }
}
