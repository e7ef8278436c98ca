//! CSV exports for BI tools.

use std::path::Path;

use esgsense_analyze::{BiRow, SummaryStat};
use esgsense_core::{Error, Result};
use serde::Serialize;
use tracing::info;

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::Export(format!("{}: {}", path.display(), e)))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| Error::Export(format!("{}: {}", path.display(), e)))?;
    }
    writer
        .flush()
        .map_err(|e| Error::Export(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

/// Write the flat BI table. An empty slice produces an empty file.
pub fn write_bi_rows(path: &Path, rows: &[BiRow]) -> Result<()> {
    write_rows(path, rows)?;
    info!("Exported {} BI rows to {}", rows.len(), path.display());
    if let (Some(first), Some(last)) = (rows.first(), rows.last()) {
        info!("  Date range: {} to {}", first.date, last.date);
    }
    Ok(())
}

/// Write the `metric,value` summary table.
pub fn write_summary_stats(path: &Path, stats: &[SummaryStat]) -> Result<()> {
    write_rows(path, stats)?;
    info!("Exported {} summary statistics to {}", stats.len(), path.display());
    Ok(())
}
