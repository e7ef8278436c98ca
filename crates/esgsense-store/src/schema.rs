//! Table layout. Both tables are dropped and recreated on every write.

pub const RECORDS_TABLE: &str = "tesla_esg";
pub const DAILY_TABLE: &str = "daily_sentiment";

/// Cleaned records, one row per article. Column names follow the feed header.
pub const RECORDS_SCHEMA_SQL: &str = r#"
DROP TABLE IF EXISTS tesla_esg;
CREATE TABLE tesla_esg (
    SQLDATE TEXT NOT NULL,
    V2Themes TEXT,
    Organizations TEXT,
    V2Tone TEXT,
    SourceCollectionIdentifier TEXT NOT NULL,
    DocumentIdentifier TEXT NOT NULL,
    date TEXT NOT NULL,
    sentiment_score REAL NOT NULL,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    day_of_week TEXT NOT NULL,
    sentiment_category TEXT NOT NULL
);

CREATE INDEX idx_tesla_esg_date ON tesla_esg(date);
"#;

/// Per-date rollup.
pub const DAILY_SCHEMA_SQL: &str = r#"
DROP TABLE IF EXISTS daily_sentiment;
CREATE TABLE daily_sentiment (
    date TEXT PRIMARY KEY,
    avg_sentiment REAL NOT NULL,
    article_count INTEGER NOT NULL,
    sentiment_stddev REAL
);
"#;

pub const INSERT_RECORD_SQL: &str = "INSERT INTO tesla_esg (
    SQLDATE, V2Themes, Organizations, V2Tone, SourceCollectionIdentifier,
    DocumentIdentifier, date, sentiment_score, year, month, day_of_week,
    sentiment_category
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

pub const INSERT_DAILY_SQL: &str = "INSERT INTO daily_sentiment (
    date, avg_sentiment, article_count, sentiment_stddev
) VALUES (?1, ?2, ?3, ?4)";

/// Daily rollup over the 30 days ending at the latest stored date.
pub const RECENT_DAILY_SQL: &str = "
SELECT
    date,
    ROUND(AVG(sentiment_score), 3) AS avg_sentiment,
    COUNT(*) AS article_count,
    ROUND(MIN(sentiment_score), 3) AS min_sentiment,
    ROUND(MAX(sentiment_score), 3) AS max_sentiment
FROM tesla_esg
WHERE date >= date((SELECT MAX(date) FROM tesla_esg), '-30 days')
GROUP BY date
ORDER BY date DESC
LIMIT ?1";

pub const CATEGORY_BREAKDOWN_SQL: &str = "
SELECT
    sentiment_category,
    COUNT(*) AS article_count,
    ROUND(AVG(sentiment_score), 3) AS avg_score,
    ROUND(COUNT(*) * 100.0 / (SELECT COUNT(*) FROM tesla_esg), 2) AS percentage
FROM tesla_esg
GROUP BY sentiment_category
ORDER BY avg_score";

pub const TOP_SOURCES_SQL: &str = "
SELECT
    SourceCollectionIdentifier AS source,
    COUNT(*) AS article_count,
    ROUND(AVG(sentiment_score), 3) AS avg_sentiment,
    ROUND(MIN(sentiment_score), 3) AS min_sentiment,
    ROUND(MAX(sentiment_score), 3) AS max_sentiment
FROM tesla_esg
GROUP BY SourceCollectionIdentifier
ORDER BY article_count DESC, source ASC
LIMIT ?1";

/// Most recent months first.
pub const MONTHLY_TRENDS_SQL: &str = "
SELECT
    strftime('%Y-%m', date) AS month,
    COUNT(*) AS article_count,
    ROUND(AVG(sentiment_score), 3) AS avg_sentiment,
    ROUND(SUM(CASE WHEN sentiment_score < 0 THEN 1 ELSE 0 END) * 100.0 / COUNT(*), 2)
        AS negative_percentage
FROM tesla_esg
GROUP BY strftime('%Y-%m', date)
ORDER BY month DESC
LIMIT ?1";
