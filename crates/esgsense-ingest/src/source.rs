//! Loader for the entity-filtered feed (headed, comma-separated).

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use esgsense_core::{Error, RawRecord, Result, ToneInput};
use tracing::{info, warn};

pub const COL_SQLDATE: &str = "SQLDATE";
pub const COL_THEMES: &str = "V2Themes";
pub const COL_ORGANIZATIONS: &str = "Organizations";
pub const COL_TONE: &str = "V2Tone";
pub const COL_SOURCE: &str = "SourceCollectionIdentifier";
pub const COL_DOCUMENT: &str = "DocumentIdentifier";

/// Output column order of the filter and input column names of the loader.
pub const FEED_COLUMNS: [&str; 6] = [
    COL_SQLDATE,
    COL_THEMES,
    COL_ORGANIZATIONS,
    COL_TONE,
    COL_SOURCE,
    COL_DOCUMENT,
];

/// Columns without which the run cannot proceed.
const REQUIRED_COLUMNS: [&str; 2] = [COL_SQLDATE, COL_TONE];

/// Load every row of the filtered feed.
///
/// Fails only when the file can't be opened or lacks a required header.
/// Rows the CSV reader can't decode are skipped with a warning.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    info!("Loading feed from {}", path.display());
    let file = File::open(path)?;
    let records = read_records(file)?;
    info!("Feed loaded: {} rows", records.len());
    Ok(records)
}

/// Read rows from any reader. Split out so tests can feed in-memory data.
pub fn read_records<R: std::io::Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| Error::Csv(format!("Failed to read headers: {}", e)))?
        .clone();
    let columns = header_map(&headers);

    for required in REQUIRED_COLUMNS {
        if !columns.contains_key(required) {
            return Err(Error::Schema(format!("missing required column: {}", required)));
        }
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (idx, row) in reader.records().enumerate() {
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                // +2: 1-based lines plus the header line.
                warn!("Skipping unreadable row at line {}: {}", idx + 2, e);
                skipped += 1;
                continue;
            }
        };
        records.push(to_raw_record(&row, &columns));
    }

    if skipped > 0 {
        warn!("{} rows could not be decoded", skipped);
    }
    Ok(records)
}

fn header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .collect()
}

fn cell<'a>(row: &'a StringRecord, columns: &HashMap<String, usize>, name: &str) -> &'a str {
    columns
        .get(name)
        .and_then(|&i| row.get(i))
        .unwrap_or("")
}

fn optional_cell(row: &StringRecord, columns: &HashMap<String, usize>, name: &str) -> Option<String> {
    let value = cell(row, columns, name);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn to_raw_record(row: &StringRecord, columns: &HashMap<String, usize>) -> RawRecord {
    RawRecord {
        sql_date: cell(row, columns, COL_SQLDATE).trim().to_string(),
        themes: optional_cell(row, columns, COL_THEMES),
        organizations: optional_cell(row, columns, COL_ORGANIZATIONS),
        tone: ToneInput::from_cell(cell(row, columns, COL_TONE)),
        source: cell(row, columns, COL_SOURCE).to_string(),
        document_id: cell(row, columns, COL_DOCUMENT).to_string(),
    }
}
