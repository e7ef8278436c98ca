//! Database check: verifies both tables and their columns exist and reports
//! row counts.

use std::path::Path;

use esgsense_store::schema::{DAILY_TABLE, RECORDS_TABLE};
use esgsense_store::SqliteStore;

/// Required columns per table.
const REQUIRED: [(&str, &[&str]); 2] = [
    (
        RECORDS_TABLE,
        &[
            "SQLDATE",
            "V2Themes",
            "Organizations",
            "V2Tone",
            "SourceCollectionIdentifier",
            "DocumentIdentifier",
            "date",
            "sentiment_score",
            "year",
            "month",
            "day_of_week",
            "sentiment_category",
        ],
    ),
    (
        DAILY_TABLE,
        &["date", "avg_sentiment", "article_count", "sentiment_stddev"],
    ),
];

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub db_valid: bool,
    pub records: usize,
    pub daily_rows: usize,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Validate the database at `db_path` without modifying it.
pub fn validate(db_path: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !db_path.exists() {
        report
            .errors
            .push(format!("Database not found: {}", db_path.display()));
        return report;
    }

    let store = match SqliteStore::open_read_only(db_path) {
        Ok(s) => s,
        Err(e) => {
            report.errors.push(format!("Failed to open database: {}", e));
            return report;
        }
    };

    for (table, columns) in REQUIRED {
        match store.table_exists(table) {
            Ok(true) => {
                let present = store.column_names(table).unwrap_or_default();
                for col in columns.iter().copied() {
                    if !present.iter().any(|p| p == col) {
                        report
                            .errors
                            .push(format!("{} table missing column: {}", table, col));
                    }
                }
            }
            Ok(false) => report.errors.push(format!("Missing required table: {}", table)),
            Err(e) => report
                .errors
                .push(format!("Error checking table {}: {}", table, e)),
        }
    }

    if !report.errors.is_empty() {
        return report;
    }

    report.db_valid = true;
    report.records = store.count_rows(RECORDS_TABLE).unwrap_or(0);
    report.daily_rows = store.count_rows(DAILY_TABLE).unwrap_or(0);

    match store.date_range() {
        Ok((first, last)) => {
            report.first_date = first.map(|d| d.to_string());
            report.last_date = last.map(|d| d.to_string());
        }
        Err(e) => report.warnings.push(format!("Could not read date range: {}", e)),
    }

    if report.records == 0 {
        report
            .warnings
            .push(format!("{} table is empty", RECORDS_TABLE));
    }

    // Every stored date should have a rollup row and vice versa.
    if let Ok(distinct) = store.distinct_dates() {
        if distinct != report.daily_rows {
            report.warnings.push(format!(
                "{} has {} rows but {} spans {} dates",
                DAILY_TABLE, report.daily_rows, RECORDS_TABLE, distinct
            ));
        }
    }

    report
}

pub fn print_report(report: &ValidationReport) {
    println!("=== esgsense Database Report ===");
    println!();
    println!("Database valid:     {}", if report.db_valid { "YES" } else { "NO" });
    println!("Records:            {}", report.records);
    println!("Daily rows:         {}", report.daily_rows);
    println!(
        "Date range:         {} to {}",
        report.first_date.as_deref().unwrap_or("-"),
        report.last_date.as_deref().unwrap_or("-")
    );

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in &report.warnings {
            println!("  - {}", w);
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        for e in &report.errors {
            println!("  - {}", e);
        }
    }

    println!();
    if report.errors.is_empty() && report.db_valid {
        println!("Status: OK");
    } else {
        println!("Status: INVALID");
    }
}
