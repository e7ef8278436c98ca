//! Entity filter over raw GDELT GKG exports.
//!
//! The export is tab-delimited with no header and no quoting. Six columns are
//! kept and renamed; a row is kept when its themes or organizations mention
//! the entity (case-insensitive substring).

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use esgsense_core::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::source::FEED_COLUMNS;

/// Raw export column index for each entry of [`FEED_COLUMNS`].
pub const GKG_COLUMN_INDICES: [usize; 6] = [1, 3, 6, 7, 9, 10];

/// Positions within the kept columns that the entity match looks at.
const THEMES_POS: usize = 1;
const ORGANIZATIONS_POS: usize = 2;

/// Outcome of a filter run.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct FilterReport {
    pub rows_read: usize,
    pub rows_matched: usize,
    pub rows_malformed: usize,
}

/// Case-insensitive entity matcher.
pub struct EntityMatcher {
    pattern: Regex,
}

impl EntityMatcher {
    pub fn new(entity: &str) -> Result<Self> {
        let entity = entity.trim();
        if entity.is_empty() {
            return Err(Error::Config("entity name must not be empty".into()));
        }
        let pattern = RegexBuilder::new(&regex::escape(entity))
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::Config(format!("invalid entity pattern: {}", e)))?;
        Ok(Self { pattern })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Filter `input` to rows mentioning `entity` and write them to `output`.
pub fn filter_export(input: &Path, output: &Path, entity: &str) -> Result<FilterReport> {
    info!(
        "Filtering {} for entity '{}' -> {}",
        input.display(),
        entity,
        output.display()
    );
    let matcher = EntityMatcher::new(entity)?;
    let reader = File::open(input)?;
    let writer = File::create(output)?;
    let report = filter_rows(reader, writer, &matcher)?;
    info!(
        "{} articles found for '{}' ({} rows read, {} malformed)",
        report.rows_matched, entity, report.rows_read, report.rows_malformed
    );
    Ok(report)
}

/// Streaming core of [`filter_export`].
pub fn filter_rows<R: Read, W: Write>(
    reader: R,
    writer: W,
    matcher: &EntityMatcher,
) -> Result<FilterReport> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(reader);
    let mut writer = csv::Writer::from_writer(writer);

    writer
        .write_record(FEED_COLUMNS)
        .map_err(|e| Error::Csv(e.to_string()))?;

    let mut report = FilterReport::default();
    for row in reader.byte_records() {
        report.rows_read += 1;
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                debug!("Unreadable export row {}: {}", report.rows_read, e);
                report.rows_malformed += 1;
                continue;
            }
        };

        // Short rows keep empty cells, mirroring absent values.
        let kept: Vec<String> = GKG_COLUMN_INDICES
            .iter()
            .map(|&i| {
                row.get(i)
                    .map(|b| String::from_utf8_lossy(b).into_owned())
                    .unwrap_or_default()
            })
            .collect();

        if matcher.is_match(&kept[THEMES_POS]) || matcher.is_match(&kept[ORGANIZATIONS_POS]) {
            writer
                .write_record(&kept)
                .map_err(|e| Error::Csv(e.to_string()))?;
            report.rows_matched += 1;
        }
    }

    writer.flush()?;
    if report.rows_malformed > 0 {
        warn!("{} export rows could not be read", report.rows_malformed);
    }
    Ok(report)
}
