//! SQLite persistence for cleaned records and daily aggregates.
//!
//! Writes replace both tables inside one transaction, so a re-run never
//! appends. The analysis queries are relative to the latest stored date.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use esgsense_analyze::{DailyAggregate, MonthlyTrend, SourceBreakdown};
use esgsense_core::{CleanedRecord, Error, RawRecord, Result, SentimentCategory, ToneInput};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags};
use tracing::{debug, info};

use crate::schema::*;
use crate::types::*;

/// Days returned by [`SqliteStore::recent_daily`] in the pipeline report.
pub const RECENT_DAYS_LIMIT: usize = 10;
pub const TOP_SOURCES_LIMIT: usize = 10;
pub const MONTHS_LIMIT: usize = 12;

pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

fn db_err(e: rusqlite::Error) -> Error {
    Error::Database(e.to_string())
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| Error::Database(format!("bad stored date '{}': {}", raw, e)))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl SqliteStore {
    /// Open or create the database file at `db_path`.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::Storage(e.to_string()))?;
        }

        let conn = Self::create_connection(&db_path)?;
        debug!("Opened database {}", db_path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    /// Open an existing database without creating or modifying it.
    pub fn open_read_only(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if !db_path.exists() {
            return Err(Error::Storage(format!(
                "Database not found: {}",
                db_path.display()
            )));
        }
        let conn = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(db_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(db_err)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA cache_size = -16384;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(db_err)?;
        Ok(conn)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    // ---------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------

    /// Drop, recreate and fill both tables in a single transaction.
    pub fn replace_all(
        &self,
        records: &[CleanedRecord],
        daily: &[DailyAggregate],
    ) -> Result<WriteSummary> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db_err)?;

        tx.execute_batch(RECORDS_SCHEMA_SQL).map_err(db_err)?;
        tx.execute_batch(DAILY_SCHEMA_SQL).map_err(db_err)?;

        {
            let mut stmt = tx.prepare(INSERT_RECORD_SQL).map_err(db_err)?;
            for r in records {
                stmt.execute(params![
                    r.raw.sql_date,
                    r.raw.themes,
                    r.raw.organizations,
                    r.raw.tone.as_ref().map(|t| t.to_string()),
                    r.raw.source,
                    r.raw.document_id,
                    r.date.to_string(),
                    r.sentiment_score,
                    r.year,
                    r.month,
                    r.day_of_week,
                    r.sentiment_category.label(),
                ])
                .map_err(db_err)?;
            }

            let mut stmt = tx.prepare(INSERT_DAILY_SQL).map_err(db_err)?;
            for d in daily {
                stmt.execute(params![
                    d.date.to_string(),
                    d.avg_sentiment,
                    d.article_count as i64,
                    d.sentiment_stddev,
                ])
                .map_err(db_err)?;
            }
        }

        tx.commit().map_err(db_err)?;
        info!(
            "Stored {} records in {} and {} rows in {} ({})",
            records.len(),
            RECORDS_TABLE,
            daily.len(),
            DAILY_TABLE,
            self.db_path.display()
        );

        Ok(WriteSummary {
            records: records.len(),
            daily_rows: daily.len(),
        })
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// All stored records in insertion order. Derived fields are recomputed
    /// from the stored date and score.
    pub fn load_records(&self) -> Result<Vec<CleanedRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT SQLDATE, V2Themes, Organizations, V2Tone, SourceCollectionIdentifier,
                        DocumentIdentifier, date, sentiment_score
                 FROM tesla_esg ORDER BY rowid",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                let raw = RawRecord {
                    sql_date: row.get(0)?,
                    themes: row.get(1)?,
                    organizations: row.get(2)?,
                    tone: row
                        .get::<_, Option<String>>(3)?
                        .and_then(|t| ToneInput::from_cell(&t)),
                    source: row.get(4)?,
                    document_id: row.get(5)?,
                };
                Ok((raw, row.get::<_, String>(6)?, row.get::<_, f64>(7)?))
            })
            .map_err(db_err)?;

        let mut records = Vec::new();
        for row in rows {
            let (raw, date, score) = row.map_err(db_err)?;
            records.push(CleanedRecord::new(raw, parse_date(&date)?, score));
        }
        Ok(records)
    }

    pub fn load_daily(&self) -> Result<Vec<DailyAggregate>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT date, avg_sentiment, article_count, sentiment_stddev
                 FROM daily_sentiment ORDER BY date",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                ))
            })
            .map_err(db_err)?;

        let mut daily = Vec::new();
        for row in rows {
            let (date, avg, count, stddev) = row.map_err(db_err)?;
            daily.push(DailyAggregate {
                date: parse_date(&date)?,
                avg_sentiment: avg,
                article_count: count as usize,
                sentiment_stddev: stddev,
            });
        }
        Ok(daily)
    }

    // ---------------------------------------------------------------
    // Introspection
    // ---------------------------------------------------------------

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        Ok(count > 0)
    }

    pub fn column_names(&self, table: &str) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))
            .map_err(db_err)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .map_err(db_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_err)?;
        Ok(names)
    }

    pub fn count_rows(&self, table: &str) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
                [],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        Ok(count as usize)
    }

    /// Earliest and latest stored record dates.
    pub fn date_range(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
        let conn = self.conn.lock();
        let (lo, hi): (Option<String>, Option<String>) = conn
            .query_row(
                &format!("SELECT MIN(date), MAX(date) FROM {}", RECORDS_TABLE),
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(db_err)?;
        drop(conn);
        Ok((
            lo.as_deref().map(parse_date).transpose()?,
            hi.as_deref().map(parse_date).transpose()?,
        ))
    }

    pub fn distinct_dates(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row(
                &format!("SELECT COUNT(DISTINCT date) FROM {}", RECORDS_TABLE),
                [],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        Ok(count as usize)
    }

    pub fn get_stats(&self) -> Result<StoreStats> {
        let has_records = self.table_exists(RECORDS_TABLE)?;
        let total_records = if has_records { self.count_rows(RECORDS_TABLE)? } else { 0 };
        let daily_rows = if self.table_exists(DAILY_TABLE)? {
            self.count_rows(DAILY_TABLE)?
        } else {
            0
        };

        let (first_date, last_date) = if has_records {
            self.date_range()?
        } else {
            (None, None)
        };

        let db_size = std::fs::metadata(self.path()).map(|m| m.len()).unwrap_or(0);

        Ok(StoreStats {
            total_records,
            daily_rows,
            first_date,
            last_date,
            db_path: self.path().to_string_lossy().to_string(),
            db_size_mb: db_size as f64 / (1024.0 * 1024.0),
        })
    }

    // ---------------------------------------------------------------
    // SQL analysis
    // ---------------------------------------------------------------

    /// Daily rollup over the 30 days ending at the latest stored date, most
    /// recent first.
    pub fn recent_daily(&self, limit: usize) -> Result<Vec<RecentDay>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(RECENT_DAILY_SQL).map_err(db_err)?;
        let rows = stmt
            .query_map([limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, f64>(4)?,
                ))
            })
            .map_err(db_err)?;

        let mut days = Vec::new();
        for row in rows {
            let (date, avg, count, min, max) = row.map_err(db_err)?;
            days.push(RecentDay {
                date: parse_date(&date)?,
                avg_sentiment: avg,
                article_count: count as usize,
                min_sentiment: min,
                max_sentiment: max,
            });
        }
        Ok(days)
    }

    /// Article count, mean score and share per stored sentiment bucket,
    /// most negative bucket first.
    pub fn category_breakdown(&self) -> Result<Vec<CategoryBreakdown>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(CATEGORY_BREAKDOWN_SQL).map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, f64>(3)?,
                ))
            })
            .map_err(db_err)?;

        let mut breakdown = Vec::new();
        for row in rows {
            let (label, count, avg_score, percentage) = row.map_err(db_err)?;
            let sentiment_category = SentimentCategory::from_label(&label).ok_or_else(|| {
                Error::Database(format!("unknown stored sentiment category '{}'", label))
            })?;
            breakdown.push(CategoryBreakdown {
                sentiment_category,
                article_count: count as usize,
                avg_score,
                percentage,
            });
        }
        Ok(breakdown)
    }

    pub fn top_sources(&self, limit: usize) -> Result<Vec<SourceBreakdown>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(TOP_SOURCES_SQL).map_err(db_err)?;
        let rows = stmt
            .query_map([limit as i64], |row| {
                Ok(SourceBreakdown {
                    source: row.get(0)?,
                    article_count: row.get::<_, i64>(1)? as usize,
                    avg_sentiment: row.get(2)?,
                    min_sentiment: row.get(3)?,
                    max_sentiment: row.get(4)?,
                })
            })
            .map_err(db_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_err)?;
        Ok(rows)
    }

    /// The latest `limit` months, most recent first.
    pub fn monthly_trends(&self, limit: usize) -> Result<Vec<MonthlyTrend>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(MONTHLY_TRENDS_SQL).map_err(db_err)?;
        let rows = stmt
            .query_map([limit as i64], |row| {
                Ok(MonthlyTrend {
                    month: row.get(0)?,
                    article_count: row.get::<_, i64>(1)? as usize,
                    avg_sentiment: row.get(2)?,
                    negative_percentage: row.get(3)?,
                })
            })
            .map_err(db_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_err)?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esgsense_analyze::aggregate::daily_aggregates;
    use tempfile::TempDir;

    fn test_store() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path().join("tesla_esg.db")).unwrap();
        (store, dir)
    }

    fn record(date: &str, score: f64, source: &str) -> CleanedRecord {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let raw = RawRecord {
            sql_date: date.format("%Y%m%d").to_string(),
            themes: Some("LEGISLATION;ECON_STOCKMARKET".into()),
            organizations: None,
            tone: ToneInput::from_cell(&format!("{},1,2,3,4,5", score)),
            source: source.into(),
            document_id: format!("https://{}/{}", source, date),
        };
        CleanedRecord::new(raw, date, score)
    }

    fn sample() -> Vec<CleanedRecord> {
        vec![
            record("2024-05-10", -4.5, "old.com"),
            record("2024-06-28", -1.0, "a.com"),
            record("2024-07-01", 1.5, "b.com"),
            record("2024-07-01", 2.5, "a.com"),
            record("2024-07-02", -2.5, "b.com"),
        ]
    }

    #[test]
    fn test_replace_and_load_roundtrip() {
        let (store, _dir) = test_store();
        let records = sample();
        let daily = daily_aggregates(&records);

        let summary = store.replace_all(&records, &daily).unwrap();
        assert_eq!(summary, WriteSummary { records: 5, daily_rows: 4 });

        assert_eq!(store.load_records().unwrap(), records);
        assert_eq!(store.load_daily().unwrap(), daily);
    }

    #[test]
    fn test_rerun_replaces_instead_of_appending() {
        let (store, _dir) = test_store();
        let records = sample();
        let daily = daily_aggregates(&records);

        store.replace_all(&records, &daily).unwrap();
        store.replace_all(&records, &daily).unwrap();

        assert_eq!(store.count_rows(RECORDS_TABLE).unwrap(), 5);
        assert_eq!(store.count_rows(DAILY_TABLE).unwrap(), 4);

        store.replace_all(&records[..2], &daily[..1]).unwrap();
        assert_eq!(store.count_rows(RECORDS_TABLE).unwrap(), 2);
        assert_eq!(store.count_rows(DAILY_TABLE).unwrap(), 1);
    }

    #[test]
    fn test_introspection() {
        let (store, _dir) = test_store();
        assert!(!store.table_exists(RECORDS_TABLE).unwrap());
        assert!(store.count_rows(RECORDS_TABLE).is_err());

        store.replace_all(&[], &[]).unwrap();
        assert!(store.table_exists(RECORDS_TABLE).unwrap());
        assert_eq!(store.count_rows(DAILY_TABLE).unwrap(), 0);

        let columns = store.column_names(DAILY_TABLE).unwrap();
        assert_eq!(
            columns,
            vec!["date", "avg_sentiment", "article_count", "sentiment_stddev"]
        );
    }

    #[test]
    fn test_recent_daily_relative_to_latest_date() {
        let (store, _dir) = test_store();
        let records = sample();
        store.replace_all(&records, &daily_aggregates(&records)).unwrap();

        // Data is far in the past; the window still ends at 2024-07-02.
        let recent = store.recent_daily(RECENT_DAYS_LIMIT).unwrap();
        let dates: Vec<String> = recent.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-07-02", "2024-07-01", "2024-06-28"]);
        assert_eq!(recent[1].article_count, 2);
        assert_eq!(recent[1].avg_sentiment, 2.0);
        assert_eq!(recent[1].min_sentiment, 1.5);

        assert_eq!(store.recent_daily(1).unwrap().len(), 1);
    }

    #[test]
    fn test_category_breakdown() {
        let (store, _dir) = test_store();
        let records = sample();
        store.replace_all(&records, &daily_aggregates(&records)).unwrap();

        let breakdown = store.category_breakdown().unwrap();
        let labels: Vec<&str> = breakdown.iter().map(|b| b.sentiment_category.label()).collect();
        assert_eq!(labels, vec!["Very Negative", "Negative", "Positive", "Very Positive"]);
        assert_eq!(breakdown[0].article_count, 2);
        assert_eq!(breakdown[0].percentage, 40.0);
        assert_eq!(breakdown[0].avg_score, -3.5);
    }

    #[test]
    fn test_top_sources_and_monthly() {
        let (store, _dir) = test_store();
        let records = sample();
        store.replace_all(&records, &daily_aggregates(&records)).unwrap();

        let sources = store.top_sources(TOP_SOURCES_LIMIT).unwrap();
        assert_eq!(sources[0].source, "a.com");
        assert_eq!(sources[1].source, "b.com");
        assert_eq!(sources[2].source, "old.com");
        assert_eq!(sources[1].avg_sentiment, -0.5);

        let months = store.monthly_trends(MONTHS_LIMIT).unwrap();
        let keys: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(keys, vec!["2024-07", "2024-06", "2024-05"]);
        assert_eq!(months[0].article_count, 3);
        assert_eq!(months[0].negative_percentage, 33.33);
    }

    #[test]
    fn test_unknown_stored_label_is_rejected() {
        let (store, _dir) = test_store();
        let records = sample();
        store.replace_all(&records, &daily_aggregates(&records)).unwrap();
        store
            .conn
            .lock()
            .execute(
                "UPDATE tesla_esg SET sentiment_category = 'Neutral' WHERE rowid = 1",
                [],
            )
            .unwrap();

        let err = store.category_breakdown().unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn test_read_only_open() {
        let (store, dir) = test_store();
        let records = sample();
        store.replace_all(&records, &daily_aggregates(&records)).unwrap();
        drop(store);

        let path = dir.path().join("tesla_esg.db");
        let ro = SqliteStore::open_read_only(&path).unwrap();
        assert_eq!(ro.path(), path.as_path());
        assert_eq!(ro.count_rows(RECORDS_TABLE).unwrap(), 5);
        assert_eq!(ro.distinct_dates().unwrap(), 4);
        assert!(ro.replace_all(&records, &[]).is_err());

        let missing = SqliteStore::open_read_only(dir.path().join("nope.db"));
        assert!(matches!(missing, Err(Error::Storage(_))));
        assert!(!dir.path().join("nope.db").exists());
    }

    #[test]
    fn test_stats() {
        let (store, _dir) = test_store();
        let empty = store.get_stats().unwrap();
        assert_eq!(empty.total_records, 0);
        assert!(empty.first_date.is_none());

        let records = sample();
        store.replace_all(&records, &daily_aggregates(&records)).unwrap();
        let stats = store.get_stats().unwrap();
        assert_eq!(stats.total_records, 5);
        assert_eq!(stats.daily_rows, 4);
        assert_eq!(stats.first_date.unwrap().to_string(), "2024-05-10");
        assert_eq!(stats.last_date.unwrap().to_string(), "2024-07-02");
    }
}
