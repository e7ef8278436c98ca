//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Entity the upstream filter selects when `ESGSENSE_ENTITY` is unset.
pub const DEFAULT_ENTITY: &str = "TESLA";

/// Default port for `esgsense serve`.
pub const DEFAULT_PORT: u16 = 3004;

/// Paths to all esgsense data files and directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Raw tab-delimited GKG export (`data/gkg.csv`).
    pub gkg_export: PathBuf,
    /// Entity-filtered input consumed by `run` (`data/tesla_esg.csv`).
    pub filtered_csv: PathBuf,
    /// SQLite database (`data/tesla_esg.db`).
    pub database: PathBuf,
    /// Export directory for BI files (`data/exports/`).
    pub exports: PathBuf,
    /// Row-level BI export (`data/exports/tesla_esg_cleaned_for_bi.csv`).
    pub bi_export: PathBuf,
    /// Summary statistics export (`data/exports/tesla_esg_summary_stats.csv`).
    pub summary_stats: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let exports = root.join("exports");
        let paths = Self {
            gkg_export: root.join("gkg.csv"),
            filtered_csv: root.join("tesla_esg.csv"),
            database: root.join("tesla_esg.db"),
            bi_export: exports.join("tesla_esg_cleaned_for_bi.csv"),
            summary_stats: exports.join("tesla_esg_summary_stats.csv"),
            exports,
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(&self.exports)?;
        Ok(())
    }
}

/// Top-level esgsense configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsgSenseConfig {
    /// HTTP port for the chart-feed API.
    pub port: u16,
    /// Entity name matched (case-insensitively) by the upstream filter.
    pub entity: String,
    /// Data directory paths.
    pub data_paths: DataPaths,
}

impl EsgSenseConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let entity = std::env::var("ESGSENSE_ENTITY")
            .ok()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_ENTITY.to_string());

        let mut data_paths = DataPaths::new(data_dir)?;
        if let Ok(gkg) = std::env::var("ESGSENSE_GKG_FILE") {
            data_paths.gkg_export = PathBuf::from(gkg);
        }

        Ok(Self {
            port,
            entity,
            data_paths,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_paths_layout() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path()).unwrap();
        assert!(paths.exports.is_dir());
        assert_eq!(paths.database, dir.path().join("tesla_esg.db"));
        assert_eq!(
            paths.bi_export,
            dir.path().join("exports/tesla_esg_cleaned_for_bi.csv")
        );
    }
}
