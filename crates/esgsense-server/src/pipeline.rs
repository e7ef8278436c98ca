//! End-to-end batch run: load, clean, analyze, store, query, export,
//! summarize.
//!
//! Only the load stage can fail the run. Storage, SQL and export failures are
//! logged, recorded as skipped and the remaining stages still execute.

use std::path::{Path, PathBuf};

use esgsense_analyze::{
    build_bi_rows, fingerprint, summarize, summary_statistics, Analysis, ExecutiveSummary,
    MonthlyTrend, SourceBreakdown,
};
use esgsense_core::{CategoryCounts, CleanedRecord, DataPaths, Result};
use esgsense_ingest::{clean, load_records, DateMode};
use esgsense_store::{
    write_bi_rows, write_summary_stats, CategoryBreakdown, RecentDay, SqliteStore, WriteSummary,
    MONTHS_LIMIT, RECENT_DAYS_LIMIT, TOP_SOURCES_LIMIT,
};
use serde::Serialize;
use tracing::{error, info, warn};

/// Results of the SQL queries over the freshly written tables.
#[derive(Debug, Clone, Serialize)]
pub struct SqlAnalysis {
    pub recent_daily: Vec<RecentDay>,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub top_sources: Vec<SourceBreakdown>,
    pub monthly_trends: Vec<MonthlyTrend>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub input: PathBuf,
    pub original_count: usize,
    pub cleaned_count: usize,
    pub date_mode: DateMode,
    pub malformed_tone_vectors: usize,
    pub daily_rows: usize,
    /// SHA-256 of the daily aggregates.
    pub fingerprint: Option<String>,
    pub category_totals: CategoryCounts,
    pub stored: Option<WriteSummary>,
    pub sql: Option<SqlAnalysis>,
    pub exported: bool,
    pub skipped_stages: Vec<String>,
    pub summary: ExecutiveSummary,
    pub duration_ms: u64,
}

pub struct Pipeline;

impl Pipeline {
    /// Run every stage on `input`, writing the database and exports under
    /// `paths`.
    pub fn run(paths: &DataPaths, input: &Path) -> Result<PipelineReport> {
        let start = std::time::Instant::now();
        info!("Starting ESG sentiment pipeline on {}", input.display());

        // Stage 1: load (fatal)
        let raw = load_records(input)?;

        // Stage 2: clean
        let outcome = clean(&raw);
        drop(raw);
        let records = outcome.records;

        // Stage 3: in-memory analysis
        let analysis = Analysis::compute(&records);
        let digest = match fingerprint(&analysis.daily) {
            Ok(d) => {
                info!("Daily aggregate fingerprint: {}", d);
                Some(d)
            }
            Err(e) => {
                warn!("Failed to fingerprint daily aggregates: {}", e);
                None
            }
        };

        let mut skipped = Vec::new();

        // Stage 4: persist
        let store = Self::open_store(paths, &mut skipped);
        let stored = store
            .as_ref()
            .and_then(|s| Self::store(s, &records, &analysis, &mut skipped));

        // Stage 5: SQL analysis over what was just written
        let sql = match (&store, stored) {
            (Some(s), Some(_)) => Self::sql_analysis(s, &mut skipped),
            _ => {
                skipped.push("sql_analysis".to_string());
                None
            }
        };
        drop(store);

        // Stage 6: BI exports
        let exported = Self::export(paths, &records, &analysis, &mut skipped);

        // Stage 7: executive summary
        let summary = summarize(&records, &analysis.daily, &analysis.category_totals);
        summary.log();

        let report = PipelineReport {
            input: input.to_path_buf(),
            original_count: outcome.original_count,
            cleaned_count: outcome.cleaned_count,
            date_mode: outcome.date_mode,
            malformed_tone_vectors: outcome.malformed_tone_vectors,
            daily_rows: analysis.daily.len(),
            fingerprint: digest,
            category_totals: analysis.category_totals,
            stored,
            sql,
            exported,
            skipped_stages: skipped,
            summary,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "Pipeline complete: {} -> {} records, {} days, skipped={:?}, duration={}ms",
            report.original_count,
            report.cleaned_count,
            report.daily_rows,
            report.skipped_stages,
            report.duration_ms
        );
        Ok(report)
    }

    fn open_store(paths: &DataPaths, skipped: &mut Vec<String>) -> Option<SqliteStore> {
        match SqliteStore::open(&paths.database) {
            Ok(s) => Some(s),
            Err(e) => {
                error!("Failed to open database {}: {}", paths.database.display(), e);
                skipped.push("store".to_string());
                None
            }
        }
    }

    fn store(
        store: &SqliteStore,
        records: &[CleanedRecord],
        analysis: &Analysis,
        skipped: &mut Vec<String>,
    ) -> Option<WriteSummary> {
        match store.replace_all(records, &analysis.daily) {
            Ok(summary) => {
                match store.count_rows(esgsense_store::schema::RECORDS_TABLE) {
                    Ok(n) => info!("Database verification: {} records stored", n),
                    Err(e) => warn!("Database verification failed: {}", e),
                }
                Some(summary)
            }
            Err(e) => {
                error!("Failed to store data: {}", e);
                skipped.push("store".to_string());
                None
            }
        }
    }

    fn sql_analysis(store: &SqliteStore, skipped: &mut Vec<String>) -> Option<SqlAnalysis> {
        let run = || -> Result<SqlAnalysis> {
            Ok(SqlAnalysis {
                recent_daily: store.recent_daily(RECENT_DAYS_LIMIT)?,
                category_breakdown: store.category_breakdown()?,
                top_sources: store.top_sources(TOP_SOURCES_LIMIT)?,
                monthly_trends: store.monthly_trends(MONTHS_LIMIT)?,
            })
        };

        match run() {
            Ok(sql) => {
                log_sql_analysis(&sql);
                Some(sql)
            }
            Err(e) => {
                error!("SQL analysis failed: {}", e);
                skipped.push("sql_analysis".to_string());
                None
            }
        }
    }

    fn export(
        paths: &DataPaths,
        records: &[CleanedRecord],
        analysis: &Analysis,
        skipped: &mut Vec<String>,
    ) -> bool {
        let rows = build_bi_rows(records);
        let stats = summary_statistics(records, &analysis.daily);

        let result = write_bi_rows(&paths.bi_export, &rows)
            .and_then(|_| write_summary_stats(&paths.summary_stats, &stats));
        match result {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to export BI data: {}", e);
                skipped.push("export".to_string());
                false
            }
        }
    }
}

fn log_sql_analysis(sql: &SqlAnalysis) {
    info!("Daily average sentiment (last 30 days of data)");
    for d in &sql.recent_daily {
        info!(
            "  {}  avg={:.3}  n={}  min={:.3}  max={:.3}",
            d.date, d.avg_sentiment, d.article_count, d.min_sentiment, d.max_sentiment
        );
    }

    info!("Sentiment category breakdown");
    for c in &sql.category_breakdown {
        info!(
            "  {:<14} n={}  avg={:.3}  {:.2}%",
            c.sentiment_category.label(), c.article_count, c.avg_score, c.percentage
        );
    }

    info!("Top news sources");
    for s in &sql.top_sources {
        info!(
            "  {:<30} n={}  avg={:.3}  min={:.3}  max={:.3}",
            s.source, s.article_count, s.avg_sentiment, s.min_sentiment, s.max_sentiment
        );
    }

    info!("Monthly sentiment trends");
    for m in &sql.monthly_trends {
        info!(
            "  {}  n={}  avg={:.3}  negative={:.2}%",
            m.month, m.article_count, m.avg_sentiment, m.negative_percentage
        );
    }
}
